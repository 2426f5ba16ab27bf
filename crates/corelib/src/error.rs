//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// Ring operations themselves never fail: lookups on an empty ring return
/// `None` and mutations are infallible. Errors only arise at the edges, when
/// untrusted input is turned into ring types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid node identifier
    #[error("Invalid node: {0}")]
    InvalidNode(String),
    /// Unknown hash function name
    #[error("Unknown partitioner: {0}")]
    UnknownPartitioner(String),
}
