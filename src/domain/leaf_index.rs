//! Secondary search tree over leaf nodes, keyed by subject name.
//!
//! The index reuses the leaves themselves as its nodes (through their
//! `index_left`/`index_right` links). It is a plain binary search tree:
//! no rebalancing is done, so its depth depends only on insertion order and
//! degrades to linear for sorted insertions.

use std::cmp::Ordering;

use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{Node, NodeId, NodeStore};

/// An edge of the index tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSlot {
    Root,
    Left(NodeId),
    Right(NodeId),
}

/// Result of a descent: the slot holding `name`, or where it would go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLookup {
    pub slot: IndexSlot,
    pub occupant: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct LeafIndex {
    root: Option<NodeId>,
    len: usize,
}

fn index_links(node: &Node) -> (Option<NodeId>, Option<NodeId>) {
    match node {
        Node::Leaf {
            index_left,
            index_right,
            ..
        } => (*index_left, *index_right),
        Node::Interior { .. } => (None, None),
    }
}

impl LeafIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of indexed leaves.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[instrument(level = "trace", skip(self, store))]
    pub fn find_slot(&self, store: &NodeStore, name: &str) -> SlotLookup {
        let mut slot = IndexSlot::Root;
        let mut current = self.root;

        while let Some(id) = current {
            let (left, right) = index_links(store.node(id));
            match name.as_bytes().cmp(store.text(id).as_bytes()) {
                Ordering::Equal => break,
                Ordering::Less => {
                    slot = IndexSlot::Left(id);
                    current = left;
                }
                Ordering::Greater => {
                    slot = IndexSlot::Right(id);
                    current = right;
                }
            }
        }

        SlotLookup {
            slot,
            occupant: current,
        }
    }

    pub fn get(&self, store: &NodeStore, name: &str) -> Option<NodeId> {
        self.find_slot(store, name).occupant
    }

    /// Link `leaf` into the index; the name must not be indexed yet.
    #[instrument(level = "trace", skip(self, store))]
    pub fn insert(&mut self, store: &mut NodeStore, leaf: NodeId) -> DomainResult<()> {
        let lookup = self.find_slot(store, store.text(leaf));
        if lookup.occupant.is_some() {
            return Err(DomainError::DuplicateLeaf(store.text(leaf).to_string()));
        }

        match lookup.slot {
            IndexSlot::Root => self.root = Some(leaf),
            IndexSlot::Left(parent) => {
                if let Node::Leaf { index_left, .. } = store.node_mut(parent) {
                    *index_left = Some(leaf);
                }
            }
            IndexSlot::Right(parent) => {
                if let Node::Leaf { index_right, .. } = store.node_mut(parent) {
                    *index_right = Some(leaf);
                }
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Number of levels of the index tree.
    pub fn depth(&self, store: &NodeStore) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();

        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let (left, right) = index_links(store.node(id));
            stack.extend(left.map(|l| (l, depth + 1)));
            stack.extend(right.map(|r| (r, depth + 1)));
        }
        max_depth
    }

    /// In-order walk: leaves sorted by name.
    pub fn iter<'a>(&self, store: &'a NodeStore) -> InOrderIter<'a> {
        let mut iter = InOrderIter {
            store,
            stack: Vec::new(),
        };
        iter.push_left(self.root);
        iter
    }
}

pub struct InOrderIter<'a> {
    store: &'a NodeStore,
    stack: Vec<NodeId>,
}

impl<'a> InOrderIter<'a> {
    fn push_left(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            self.stack.push(id);
            current = index_links(self.store.node(id)).0;
        }
    }
}

impl<'a> Iterator for InOrderIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let right = index_links(self.store.node(id)).1;
        self.push_left(right);
        Some(id)
    }
}
