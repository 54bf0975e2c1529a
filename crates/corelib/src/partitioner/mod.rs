//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners convert keys into tokens that can be placed on the hash
//! ring. Every partitioner here is deterministic across processes, which is
//! what keeps routing stable between proxy restarts.

pub mod sip;
pub mod traits;
pub mod xxh3;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use sip::SipPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;

/// Hash function selector, as it appears in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SipHash-1-3 with zero keys.
    #[default]
    Sip,
    /// XXH3 64-bit.
    Xxh3,
}

impl HashAlgorithm {
    /// Instantiate the partitioner for this algorithm.
    pub fn partitioner(self) -> Arc<dyn Partitioner> {
        match self {
            HashAlgorithm::Sip => Arc::new(SipPartitioner),
            HashAlgorithm::Xxh3 => Arc::new(Xxh3Partitioner),
        }
    }
}
