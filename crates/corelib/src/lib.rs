//! Core library for consistent hashing.
//!
//! This crate provides the ring primitives the routing layer is built on:
//! - Tokens (positions on the ring) and partitioners (hash functions)
//! - Node identifiers and virtual nodes
//! - Ring keys with a canonical byte form
//! - The hash ring itself and its builder

pub mod error;
pub mod key;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod vnode;

pub use error::{Result, RingError};
pub use key::RingKey;
pub use node::NodeId;
pub use partitioner::{HashAlgorithm, Partitioner};
pub use ring::{HashRing, RingBuilder, DEFAULT_REPLICAS};
pub use token::Token;
pub use vnode::VirtualNode;
