//! Builder for [`HashRing`].

use std::sync::Arc;

use tracing::debug;

use crate::node::NodeId;
use crate::partitioner::{HashAlgorithm, Partitioner, SipPartitioner};
use crate::ring::{HashRing, DEFAULT_REPLICAS};

/// Collects nodes and settings, then builds a ring in one go.
///
/// ```rust
/// use corelib::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_replicas(16)
///     .add_node("10.0.0.1:9091")
///     .add_node("10.0.0.2:9091")
///     .build();
/// assert_eq!(ring.token_count(), 32);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder {
    replicas: usize,
    partitioner: Arc<dyn Partitioner>,
    nodes: Vec<(NodeId, Option<usize>)>,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RingBuilder {
    pub fn new() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            partitioner: Arc::new(SipPartitioner),
            nodes: Vec::new(),
        }
    }

    /// Placements per node for nodes added without an explicit count.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn with_partitioner(mut self, partitioner: Arc<dyn Partitioner>) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn with_algorithm(self, algorithm: HashAlgorithm) -> Self {
        self.with_partitioner(algorithm.partitioner())
    }

    pub fn add_node(mut self, node_id: impl Into<NodeId>) -> Self {
        self.nodes.push((node_id.into(), None));
        self
    }

    pub fn add_node_with_replicas(mut self, node_id: impl Into<NodeId>, replicas: usize) -> Self {
        self.nodes.push((node_id.into(), Some(replicas)));
        self
    }

    pub fn add_nodes<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        self.nodes.extend(nodes.into_iter().map(|n| (n.into(), None)));
        self
    }

    /// Build the ring. Nodes added twice keep their last registration.
    pub fn build(self) -> HashRing {
        let mut ring = HashRing::with_partitioner(self.partitioner, self.replicas);
        for (node_id, replicas) in self.nodes {
            match replicas {
                Some(replicas) => ring.add_node_with_replicas(node_id, replicas),
                None => ring.add_node(node_id),
            }
        }
        debug!(
            nodes = ring.node_count(),
            tokens = ring.token_count(),
            partitioner = ring.partitioner_name(),
            "built hash ring"
        );
        ring
    }
}
