//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, RingError>;

/// Errors that can occur when querying a ring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// The ring has no placements, so no key can be routed.
    #[error("no node found in ring")]
    NotFound,
}
