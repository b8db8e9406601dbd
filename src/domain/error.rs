//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent knowledge-tree rule violations.
/// These are independent of I/O and presentation concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("arena allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },

    #[error("subject already known: {0}")]
    DuplicateLeaf(String),

    #[error("malformed document at byte {offset}: {reason}")]
    MalformedDocument { offset: usize, reason: String },

    #[error("no such subject: {0}")]
    NoSuchSubject(String),

    #[error("subject has no definition (it is the only node): {0}")]
    NoDefinition(String),

    #[error("cursor does not point at a subject")]
    NotALeaf,

    #[error("invalid text {text:?}: {reason}")]
    InvalidText { text: String, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            offset,
            reason: reason.into(),
        }
    }
}
