//! Consistent hash ring implementation.
//!
//! The ring manages virtual node placements and provides lookup of the node
//! responsible for a key.

mod builder;
#[allow(clippy::module_inception)]
mod ring;

pub use builder::RingBuilder;
pub use ring::HashRing;

/// Virtual nodes per real node when none is requested explicitly.
pub const DEFAULT_REPLICAS: usize = 100;

/// Weight that maps to exactly `replicas` placements.
pub const TOP_WEIGHT: u32 = 100;
