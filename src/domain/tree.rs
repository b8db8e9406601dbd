//! The knowledge base: a full binary yes/no tree plus its leaf index.

use tracing::{debug, instrument};

use crate::domain::arena::ArenaOptions;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::leaf_index::LeafIndex;
use crate::domain::node::{Node, NodeId, NodeStore};

/// Which answer an edge stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Yes,
    No,
}

impl From<bool> for Branch {
    fn from(answer_is_yes: bool) -> Self {
        if answer_is_yes {
            Branch::Yes
        } else {
            Branch::No
        }
    }
}

/// An edge of the decision tree: the root slot or one child slot of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Root,
    Child { parent: NodeId, branch: Branch },
}

/// Text of a node must be expressible in the document grammar.
pub(crate) fn validate_text(text: &str) -> DomainResult<()> {
    if text.contains('"') {
        return Err(DomainError::InvalidText {
            text: text.to_string(),
            reason: "double quotes cannot be stored".to_string(),
        });
    }
    Ok(())
}

/// Decision tree with its node store and leaf index.
///
/// Dropping the knowledge base releases every node and every byte of text
/// in one pass; nodes are never freed individually.
#[derive(Debug)]
pub struct KnowledgeBase {
    store: NodeStore,
    root: NodeId,
    size: usize,
    index: LeafIndex,
}

impl KnowledgeBase {
    /// Fresh knowledge base holding a single subject.
    pub fn new(root_name: &str) -> DomainResult<Self> {
        Self::with_options(root_name, ArenaOptions::default())
    }

    #[instrument(level = "debug")]
    pub fn with_options(root_name: &str, options: ArenaOptions) -> DomainResult<Self> {
        validate_text(root_name)?;
        let mut store = NodeStore::new(options);
        let root = store.allocate_leaf(root_name)?;
        let mut index = LeafIndex::new();
        index.insert(&mut store, root)?;

        Ok(Self {
            store,
            root,
            size: 1,
            index,
        })
    }

    pub(crate) fn from_parts(store: NodeStore, root: NodeId, size: usize, index: LeafIndex) -> Self {
        Self {
            store,
            root,
            size,
            index,
        }
    }

    /// Walker standing on the root slot.
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor {
            kb: self,
            slot: Slot::Root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the decision tree.
    pub fn tree_size(&self) -> usize {
        self.size
    }

    /// Number of subjects (leaves).
    pub fn leaf_count(&self) -> usize {
        self.index.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.store.node(id)
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.store.text(id)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.store.node(id).is_leaf()
    }

    /// `(on_yes, on_no)` of a question node, None for a subject.
    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        self.store.node(id).children()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.store.node(id).parent()
    }

    /// Node currently held by `slot`.
    pub fn resolve(&self, slot: Slot) -> NodeId {
        match slot {
            Slot::Root => self.root,
            Slot::Child { parent, branch } => match self.store.node(parent) {
                Node::Interior { on_yes, on_no, .. } => match branch {
                    Branch::Yes => *on_yes,
                    Branch::No => *on_no,
                },
                // a leaf has no child slots; the parent itself is the closest node
                Node::Leaf { .. } => parent,
            },
        }
    }

    pub fn find_leaf(&self, name: &str) -> Option<NodeId> {
        self.index.get(&self.store, name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_leaf(name).is_some()
    }

    /// Subject names in byte-wise sorted order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.iter(&self.store).map(|id| self.store.text(id))
    }

    /// Number of levels of the decision tree.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some((yes, no)) = self.children(id) {
                stack.push((yes, depth + 1));
                stack.push((no, depth + 1));
            }
        }
        max_depth
    }

    /// Number of levels of the leaf index.
    pub fn index_depth(&self) -> usize {
        self.index.depth(&self.store)
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Pre-order walk of the decision tree with node depth (root = 0).
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter {
            kb: self,
            stack: vec![(self.root, 0)],
        }
    }

    /// Write `node` into the edge named by `slot`.
    fn write_slot(&mut self, slot: Slot, node: NodeId) {
        match slot {
            Slot::Root => self.root = node,
            Slot::Child { parent, branch } => {
                if let Node::Interior { on_yes, on_no, .. } = self.store.node_mut(parent) {
                    match branch {
                        Branch::Yes => *on_yes = node,
                        Branch::No => *on_no = node,
                    }
                }
            }
        }
    }
}

pub struct PreOrderIter<'a> {
    kb: &'a KnowledgeBase,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        // push "no" first so the "yes" branch is visited first
        if let Some((yes, no)) = self.kb.children(id) {
            self.stack.push((no, depth + 1));
            self.stack.push((yes, depth + 1));
        }
        Some((id, depth))
    }
}

/// Walker over the decision tree.
///
/// The cursor stands on an edge rather than on a node, so `learn` can
/// replace the node it is looking at without searching the parent.
#[derive(Debug)]
pub struct Cursor<'kb> {
    kb: &'kb mut KnowledgeBase,
    slot: Slot,
}

impl<'kb> Cursor<'kb> {
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Node held by the current slot.
    pub fn current(&self) -> NodeId {
        self.kb.resolve(self.slot)
    }

    pub fn current_text(&self) -> &str {
        self.kb.text(self.current())
    }

    pub fn is_leaf(&self) -> bool {
        self.kb.is_leaf(self.current())
    }

    /// Follow the answer to the current question; no-op on a subject.
    pub fn advance(&mut self, answer_is_yes: bool) {
        let current = self.current();
        if !self.kb.is_leaf(current) {
            self.slot = Slot::Child {
                parent: current,
                branch: Branch::from(answer_is_yes),
            };
        }
    }

    /// Replace the subject under the cursor with `question`, whose "yes"
    /// answer is the new subject `new_leaf_name` and whose "no" answer is
    /// the old subject.
    ///
    /// All checks run before the tree is touched: on error the knowledge
    /// base is unchanged. On success the cursor stands on the new question.
    #[instrument(level = "debug", skip(self))]
    pub fn learn(&mut self, question: &str, new_leaf_name: &str) -> DomainResult<()> {
        let old_leaf = self.current();
        if !self.kb.is_leaf(old_leaf) {
            return Err(DomainError::NotALeaf);
        }
        validate_text(question)?;
        validate_text(new_leaf_name)?;
        if self.kb.contains(new_leaf_name) {
            return Err(DomainError::DuplicateLeaf(new_leaf_name.to_string()));
        }

        let store = &mut self.kb.store;
        let new_leaf = store.allocate_leaf(new_leaf_name)?;
        let question_node = store.allocate_interior(question, new_leaf, old_leaf)?;

        let former_parent = store.node(old_leaf).parent();
        store.node_mut(question_node).set_parent(former_parent);
        store.node_mut(old_leaf).set_parent(Some(question_node));
        store.node_mut(new_leaf).set_parent(Some(question_node));

        self.kb.write_slot(self.slot, question_node);
        self.kb.index.insert(&mut self.kb.store, new_leaf)?;
        self.kb.size += 2;

        debug!(
            tree_size = self.kb.size,
            leaves = self.kb.leaf_count(),
            "learned new subject"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_fresh_base_when_created_then_root_is_indexed_leaf() {
        let kb = KnowledgeBase::new("void").unwrap();
        assert_eq!(kb.tree_size(), 1);
        assert_eq!(kb.leaf_count(), 1);
        assert!(kb.is_leaf(kb.root()));
        assert_eq!(kb.find_leaf("void"), Some(kb.root()));
    }

    #[test]
    fn given_quote_in_root_name_when_creating_then_rejects() {
        let result = KnowledgeBase::new("say \"hi\"");
        assert!(matches!(result, Err(DomainError::InvalidText { .. })));
    }

    #[test]
    fn given_leaf_cursor_when_advancing_then_stays_put() {
        let mut kb = KnowledgeBase::new("void").unwrap();
        let mut cursor = kb.cursor();
        cursor.advance(true);
        assert_eq!(cursor.slot(), Slot::Root);
        assert_eq!(cursor.current_text(), "void");
    }

    #[test]
    fn given_learned_question_when_cursor_stays_then_points_at_question() {
        let mut kb = KnowledgeBase::new("void").unwrap();
        let mut cursor = kb.cursor();
        cursor.learn("alive", "cat").unwrap();

        assert!(!cursor.is_leaf());
        assert_eq!(cursor.current_text(), "alive");
        cursor.advance(false);
        assert_eq!(cursor.current_text(), "void");
    }

    #[test]
    fn given_question_cursor_when_learning_then_not_a_leaf() {
        let mut kb = KnowledgeBase::new("void").unwrap();
        kb.cursor().learn("alive", "cat").unwrap();

        let result = kb.cursor().learn("furry", "dog");
        assert_eq!(result, Err(DomainError::NotALeaf));
        assert_eq!(kb.tree_size(), 3);
    }

    #[test]
    fn given_tree_when_iterating_then_visits_pre_order_with_depth() {
        let mut kb = KnowledgeBase::new("void").unwrap();
        let mut cursor = kb.cursor();
        cursor.learn("alive", "cat").unwrap();
        cursor.advance(true);
        cursor.learn("barks", "dog").unwrap();

        let visited: Vec<(&str, usize)> = kb.iter().map(|(id, d)| (kb.text(id), d)).collect();
        assert_eq!(
            visited,
            vec![("alive", 0), ("barks", 1), ("dog", 2), ("cat", 2), ("void", 1)]
        );
        assert_eq!(kb.depth(), 3);
    }
}
