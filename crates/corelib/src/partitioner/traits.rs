//! Core partitioner trait definitions.

use crate::token::Token;
use std::fmt::Debug;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// token generation without synchronization overhead.
///
/// Implementations must not use per-process random state: two processes
/// partitioning the same bytes must agree on the token.
pub trait Partitioner: Debug + Send + Sync + 'static {
    /// Converts a key into a token.
    fn partition(&self, key: &[u8]) -> Token;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
