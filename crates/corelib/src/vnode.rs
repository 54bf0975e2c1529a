//! Virtual node abstractions.
//!
//! # Virtual Nodes
//!
//! Each real node is placed on the ring many times (its replicas). More
//! placements give a smoother key distribution and spread the keys of a
//! departing node over many successors instead of one.
//!
//! - **Memory**: O(r * n) placements for n nodes with r replicas each
//! - **Lookup**: O(log(r * n)) binary search
//! - **Rebalancing**: roughly 1/n of the keys move when a node joins or leaves

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::token::Token;

/// A single placement of a node on the hash ring.
///
/// # Invariants
///
/// - Every `VirtualNode` belongs to exactly one node
/// - Ordering is by token first and node id second, which is also the
///   tie-break when two placements hash to the same token
///
/// # Example
///
/// ```rust
/// use corelib::partitioner::SipPartitioner;
/// use corelib::{NodeId, VirtualNode};
///
/// let vnode = VirtualNode::from_index(&SipPartitioner, NodeId::from("10.0.0.1:9091"), 0);
/// assert_eq!(vnode.node_id().as_str(), "10.0.0.1:9091");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring.
    ///
    /// Derived from `"{node_id}:{index}"`, so the same node always lands on
    /// the same positions regardless of which other nodes are present.
    pub token: Token,

    /// The node that owns this placement.
    pub node_id: NodeId,
}

impl VirtualNode {
    #[inline]
    pub fn new(token: Token, node_id: NodeId) -> Self {
        Self { token, node_id }
    }

    /// Create the placement number `vnode_index` for `node_id`.
    ///
    /// The index is always the last `:`-separated segment and purely
    /// numeric, so the generated keys of different nodes cannot collide
    /// even when identifiers themselves contain colons.
    pub fn from_index(partitioner: &dyn Partitioner, node_id: NodeId, vnode_index: usize) -> Self {
        let vnode_key = format!("{}:{}", node_id, vnode_index);
        let token = partitioner.partition(vnode_key.as_bytes());
        Self::new(token, node_id)
    }

    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Clockwise distance to another placement.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> Token {
        self.token.distance_to(&other.token)
    }
}

impl std::fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VNode(token={}, node={})", self.token, self.node_id)
    }
}
