//! Selector error types.

use corelib::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectorError>;

/// Errors surfaced by the selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The ring is empty: every backend is gone or drained.
    ///
    /// Kept apart from the other variants so callers can back off and retry
    /// instead of treating it as a hard failure.
    #[error("no backend available")]
    Unavailable,

    #[error("invalid weight {weight} for backend {node}: must be in 0..=100")]
    InvalidWeight { node: NodeId, weight: u32 },

    #[error("backend id must not be empty")]
    EmptyNodeId,

    #[error("backend {0} listed more than once")]
    DuplicateNode(NodeId),

    #[error("invalid selector config: {0}")]
    InvalidConfig(String),
}

impl SelectorError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SelectorError::Unavailable)
    }
}
