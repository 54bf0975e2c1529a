//! Error types for upstream selection.

use corelib::RingError;
use thiserror::Error;

/// Reasons a request could not be routed.
///
/// All variants are per-request failures; none of them is fatal to the
/// selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The ring is empty.
    #[error("no node found in ring")]
    NotFound,

    /// The label part of the path does not alternate name/value.
    #[error("odd number of components in label string {0:?}")]
    MalformedPath(String),

    /// A label name is not a valid metric label name or is reserved.
    #[error("improper label name {0:?}")]
    InvalidLabelName(String),

    /// An `@base64` label value failed to decode.
    #[error("invalid base64 encoding for label {name}={value:?}: {source}")]
    InvalidEncoding {
        name: String,
        value: String,
        #[source]
        source: base64::DecodeError,
    },
}

impl From<RingError> for SelectError {
    fn from(err: RingError) -> Self {
        match err {
            RingError::NotFound => SelectError::NotFound,
        }
    }
}

/// Invalid selection settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected at most one argument (the path prefix), got {0}")]
    TooManyArguments(usize),

    #[error("replicas must be between 1 and {}", crate::config::MAX_REPLICAS)]
    InvalidReplicas,

    #[error("prefix must not be empty")]
    EmptyPrefix,

    #[error("invalid selection config: {0}")]
    Parse(#[from] serde_json::Error),
}
