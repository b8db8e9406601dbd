//! "What is X?" queries: the chain of answered questions leading to a subject.

use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::NodeId;
use crate::domain::tree::KnowledgeBase;

/// One answered question of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<'kb> {
    pub question: &'kb str,
    pub answer: bool,
}

/// Walks from a subject up towards the root, one question at a time.
#[derive(Debug, Clone)]
pub struct DefinitionCursor<'kb> {
    kb: &'kb KnowledgeBase,
    current: NodeId,
    parent: NodeId,
}

impl KnowledgeBase {
    /// Start a definition walk at `subject`.
    ///
    /// Fails with `NoSuchSubject` for unknown names and with `NoDefinition`
    /// when the subject is the root (there is no question above it).
    #[instrument(level = "debug", skip(self))]
    pub fn define(&self, subject: &str) -> DomainResult<DefinitionCursor<'_>> {
        let leaf = self
            .find_leaf(subject)
            .ok_or_else(|| DomainError::NoSuchSubject(subject.to_string()))?;
        let parent = self
            .parent(leaf)
            .ok_or_else(|| DomainError::NoDefinition(subject.to_string()))?;

        Ok(DefinitionCursor {
            kb: self,
            current: leaf,
            parent,
        })
    }
}

impl<'kb> DefinitionCursor<'kb> {
    /// The question whose answer led to the current node.
    pub fn property(&self) -> &'kb str {
        self.kb.text(self.parent)
    }

    /// Whether the current node is the "yes" answer of that question.
    pub fn polarity(&self) -> bool {
        matches!(self.kb.children(self.parent), Some((yes, _)) if yes == self.current)
    }

    pub fn get(&self) -> Property<'kb> {
        Property {
            question: self.property(),
            answer: self.polarity(),
        }
    }

    /// Step up one question.
    ///
    /// Returns false once the question above is the root; the cursor then
    /// stays on the last pair.
    pub fn advance(&mut self) -> bool {
        match self.kb.parent(self.parent) {
            Some(grandparent) => {
                self.current = self.parent;
                self.parent = grandparent;
                true
            }
            None => false,
        }
    }

    /// Collect the whole definition, nearest question first.
    pub fn into_properties(mut self) -> Vec<Property<'kb>> {
        let mut properties = vec![self.get()];
        while self.advance() {
            properties.push(self.get());
        }
        properties
    }
}
