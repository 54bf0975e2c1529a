//! Hash ring data structure.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, RingError};
use crate::key::RingKey;
use crate::node::NodeId;
use crate::partitioner::{Partitioner, SipPartitioner};
use crate::ring::{DEFAULT_REPLICAS, TOP_WEIGHT};
use crate::token::Token;
use crate::vnode::VirtualNode;

/// Consistent hash ring over string node identifiers.
///
/// Placements are kept in a vector sorted by `(token, node_id)`. A key is
/// owned by the first placement whose token is at or after the key's token,
/// wrapping to the first placement when the key hashes past the last one.
///
/// Mutation takes `&mut self`; share a finished ring behind an `Arc`.
#[derive(Debug, Clone)]
pub struct HashRing {
    partitioner: Arc<dyn Partitioner>,
    replicas: usize,
    vnodes: Vec<VirtualNode>,
    /// Placement count per node.
    nodes: BTreeMap<NodeId, usize>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl HashRing {
    /// Empty ring with the default partitioner and replica count.
    pub fn new() -> Self {
        Self::with_partitioner(Arc::new(SipPartitioner), DEFAULT_REPLICAS)
    }

    /// Empty ring with an explicit partitioner and replica count.
    ///
    /// A replica count of zero is raised to [`DEFAULT_REPLICAS`].
    pub fn with_partitioner(partitioner: Arc<dyn Partitioner>, replicas: usize) -> Self {
        let replicas = if replicas == 0 { DEFAULT_REPLICAS } else { replicas };
        Self {
            partitioner,
            replicas,
            vnodes: Vec::new(),
            nodes: BTreeMap::new(),
        }
    }

    /// Build a ring containing `nodes` with the default settings.
    pub fn build<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        let mut ring = Self::new();
        for node in nodes {
            ring.add_node(node);
        }
        ring
    }

    /// Add a node with the ring's replica count.
    ///
    /// Adding a node that is already present replaces its placements.
    pub fn add_node(&mut self, node_id: impl Into<NodeId>) {
        let replicas = self.replicas;
        self.add_node_with_replicas(node_id, replicas);
    }

    /// Add a node with an explicit number of placements.
    pub fn add_node_with_replicas(&mut self, node_id: impl Into<NodeId>, replicas: usize) {
        let node_id = node_id.into();
        self.remove_node(node_id.as_str());
        if replicas == 0 {
            return;
        }

        let partitioner = Arc::clone(&self.partitioner);
        self.vnodes.extend(
            (0..replicas)
                .map(|i| VirtualNode::from_index(partitioner.as_ref(), node_id.clone(), i)),
        );
        self.vnodes.sort_unstable();
        self.nodes.insert(node_id, replicas);
    }

    /// Add a node with placements proportional to `weight` out of
    /// [`TOP_WEIGHT`]. Weights above the top are clamped; zero adds nothing.
    pub fn add_node_with_weight(&mut self, node_id: impl Into<NodeId>, weight: u32) {
        let weight = weight.min(TOP_WEIGHT) as usize;
        let replicas = self.replicas * weight / TOP_WEIGHT as usize;
        self.add_node_with_replicas(node_id, replicas);
    }

    /// Remove a node and all its placements.
    ///
    /// Returns `false` if the node was not on the ring.
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        if self.nodes.remove(node_id).is_none() {
            return false;
        }
        self.vnodes.retain(|v| v.node_id.as_str() != node_id);
        true
    }

    /// Find the node owning `key`. `None` only when the ring is empty.
    pub fn lookup<K: RingKey + ?Sized>(&self, key: &K) -> Option<&NodeId> {
        let token = self.partitioner.partition(&key.ring_bytes());
        self.lookup_token(token)
    }

    /// Like [`lookup`](Self::lookup), reporting an empty ring as an error.
    pub fn try_lookup<K: RingKey + ?Sized>(&self, key: &K) -> Result<&NodeId> {
        self.lookup(key).ok_or(RingError::NotFound)
    }

    /// Find the node owning an already computed token.
    pub fn lookup_token(&self, token: Token) -> Option<&NodeId> {
        let idx = self.vnodes.partition_point(|v| v.token < token);
        self.vnodes
            .get(idx)
            .or_else(|| self.vnodes.first())
            .map(|v| &v.node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Number of distinct nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of placements on the ring.
    pub fn token_count(&self) -> usize {
        self.vnodes.len()
    }

    /// Default replica count used by [`add_node`](Self::add_node).
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Node identifiers in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.keys()
    }

    /// All placements in ring order.
    pub fn vnodes(&self) -> &[VirtualNode] {
        &self.vnodes
    }

    /// `(token, node)` pairs in ring order.
    pub fn tokens(&self) -> Vec<(Token, NodeId)> {
        self.vnodes
            .iter()
            .map(|v| (v.token, v.node_id.clone()))
            .collect()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Fraction of the token space owned by each node.
    ///
    /// A placement owns the arc from its predecessor (exclusive) up to its
    /// own token (inclusive). The fractions sum to 1.0 on a non-empty ring.
    pub fn ownership(&self) -> BTreeMap<NodeId, f64> {
        const SPACE: f64 = 18_446_744_073_709_551_616.0; // 2^64

        let mut shares: BTreeMap<NodeId, f64> =
            self.nodes.keys().map(|id| (id.clone(), 0.0)).collect();
        let (Some(first), Some(last)) = (self.vnodes.first(), self.vnodes.last()) else {
            return shares;
        };

        if first.token == last.token {
            // Every placement sits on one token; the first one takes it all.
            shares.insert(first.node_id.clone(), 1.0);
            return shares;
        }

        let mut prev = last;
        for vnode in &self.vnodes {
            let arc = prev.distance_to(vnode).0 as f64;
            if let Some(share) = shares.get_mut(&vnode.node_id) {
                *share += arc / SPACE;
            }
            prev = vnode;
        }
        shares
    }
}
