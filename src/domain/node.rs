use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::arena::{ArenaOptions, Block, SlabArena};
use crate::domain::error::DomainResult;

/// Handle of a node inside its [`NodeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// Decision tree node.
///
/// Leaves double as members of the leaf index through `index_left` and
/// `index_right`; those links are never followed by the decision tree.
#[derive(Debug, Clone)]
pub enum Node {
    Leaf {
        /// Subject name
        text: Block,
        /// Question node this leaf answers, None for a root leaf
        parent: Option<NodeId>,
        /// Leaf index: subjects ordered before this one
        index_left: Option<NodeId>,
        /// Leaf index: subjects ordered after this one
        index_right: Option<NodeId>,
    },
    Interior {
        /// Yes/no question
        text: Block,
        parent: Option<NodeId>,
        on_yes: NodeId,
        on_no: NodeId,
    },
}

impl Node {
    pub fn text_block(&self) -> Block {
        match self {
            Node::Leaf { text, .. } | Node::Interior { text, .. } => *text,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf { parent, .. } | Node::Interior { parent, .. } => *parent,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// `(on_yes, on_no)` of an interior node.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Node::Interior { on_yes, on_no, .. } => Some((*on_yes, *on_no)),
            Node::Leaf { .. } => None,
        }
    }

    pub(crate) fn set_parent(&mut self, new_parent: Option<NodeId>) {
        match self {
            Node::Leaf { parent, .. } | Node::Interior { parent, .. } => *parent = new_parent,
        }
    }
}

/// Owner of every node and every byte of text of one knowledge base.
///
/// Node records live in a handle table, their text in a [`SlabArena`].
/// Nodes are never removed individually: dropping the store (or calling
/// [`NodeStore::release_all`]) frees everything in one pass.
#[derive(Debug)]
pub struct NodeStore {
    nodes: Arena<Node>,
    text: SlabArena,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new(ArenaOptions::default())
    }
}

impl NodeStore {
    pub fn new(options: ArenaOptions) -> Self {
        Self {
            nodes: Arena::new(),
            text: SlabArena::new(options),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn allocate_leaf(&mut self, text: &str) -> DomainResult<NodeId> {
        let text = self.text.store(text)?;
        Ok(self.insert(Node::Leaf {
            text,
            parent: None,
            index_left: None,
            index_right: None,
        }))
    }

    /// Allocate a question node over two existing children.
    ///
    /// Parent links of the children are left to the caller.
    #[instrument(level = "trace", skip(self))]
    pub fn allocate_interior(
        &mut self,
        text: &str,
        on_yes: NodeId,
        on_no: NodeId,
    ) -> DomainResult<NodeId> {
        let text = self.text.store(text)?;
        Ok(self.insert(Node::Interior {
            text,
            parent: None,
            on_yes,
            on_no,
        }))
    }

    // The handle table grows on its own; only text is budgeted.
    fn insert(&mut self, node: Node) -> NodeId {
        NodeId(self.nodes.insert(node))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.text.text(self.node(id).text_block())
    }

    /// Number of nodes allocated from this store, reachable or not.
    pub fn allocated(&self) -> usize {
        self.nodes.len()
    }

    pub fn arena(&self) -> &SlabArena {
        &self.text
    }

    pub fn release_all(&mut self) {
        self.nodes.clear();
        self.text.release_all();
    }
}
