//! Per-request upstream selection.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use corelib::{HashRing, NodeId, RingBuilder};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, error, info};

use crate::config::{RefreshPolicy, SelectionConfig};
use crate::error::SelectError;
use crate::labels::{split_labels, LabelSet};
use crate::upstream::Upstream;

/// Outcome of routing one request.
#[derive(Debug)]
pub struct Decision<'p, U> {
    pub labels: LabelSet,
    /// Ring owner of the label set.
    pub node: NodeId,
    /// Pool entry for `node`, if the pool still has one.
    pub upstream: Option<&'p U>,
}

/// Routes push requests to upstreams by their label set.
///
/// The ring is built from the pool seen on the first request and cached.
/// Concurrent first requests build it once: callers check under a shared
/// lock, then re-check under an upgradable lock before building.
#[derive(Debug)]
pub struct PushgatewaySelector {
    config: SelectionConfig,
    ring: RwLock<Option<Arc<HashRing>>>,
    generation: AtomicU64,
}

impl Default for PushgatewaySelector {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

impl PushgatewaySelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            ring: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Number of rings built so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The cached ring, if one was built.
    pub fn ring(&self) -> Option<Arc<HashRing>> {
        self.ring.read().clone()
    }

    /// Return the ring for `pool`, building it if needed.
    pub fn ring_for<U: Upstream>(&self, pool: &[U]) -> Arc<HashRing> {
        if let Some(ring) = self.ring.read().as_ref() {
            if self.is_current(ring, pool) {
                return Arc::clone(ring);
            }
        }

        let guard = self.ring.upgradable_read();
        if let Some(ring) = guard.as_ref() {
            if self.is_current(ring, pool) {
                return Arc::clone(ring);
            }
            info!(
                previous = ring.node_count(),
                current = pool.len(),
                "upstream pool changed, rebuilding ring"
            );
        }

        let ring = Arc::new(self.build_ring(pool));
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        *guard = Some(Arc::clone(&ring));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        info!(
            generation,
            upstreams = ring.node_count(),
            tokens = ring.token_count(),
            "built upstream ring"
        );
        ring
    }

    /// Route `path` without logging or writing anything.
    pub fn route<'p, U: Upstream>(
        &self,
        pool: &'p [U],
        path: &str,
    ) -> Result<Decision<'p, U>, SelectError> {
        let ring = self.ring_for(pool);
        let labels = split_labels(path, &self.config.prefix, self.config.prefix_trim)?;
        let node = ring.try_lookup(&labels)?.clone();
        let upstream = pool.iter().find(|u| u.dial() == node.as_str());
        Ok(Decision {
            labels,
            node,
            upstream,
        })
    }

    /// Select the upstream for a request path.
    ///
    /// Routing errors are logged, written to `sink` as plain text and turned
    /// into `None`. `None` without a body means the ring owner is no longer
    /// in the pool.
    pub fn select<'p, U, W>(&self, pool: &'p [U], path: &str, sink: &mut W) -> Option<&'p U>
    where
        U: Upstream,
        W: Write + ?Sized,
    {
        match self.route(pool, path) {
            Ok(decision) => {
                info!(upstream = %decision.node, labels = %decision.labels, "pushproxy");
                decision.upstream
            }
            Err(err) => {
                error!(error = %err, path, "pushproxy");
                if let Err(write_err) = sink.write_all(err.to_string().as_bytes()) {
                    debug!(error = %write_err, "failed to write routing error");
                }
                None
            }
        }
    }

    /// [`select`](Self::select) for an `http::Request`, routing on its path.
    pub fn select_request<'p, U, B, W>(
        &self,
        pool: &'p [U],
        request: &http::Request<B>,
        sink: &mut W,
    ) -> Option<&'p U>
    where
        U: Upstream,
        W: Write + ?Sized,
    {
        self.select(pool, request.uri().path(), sink)
    }

    fn is_current<U: Upstream>(&self, ring: &HashRing, pool: &[U]) -> bool {
        match self.config.refresh {
            RefreshPolicy::Never => true,
            RefreshPolicy::OnMembershipChange => same_membership(ring, pool),
        }
    }

    fn build_ring<U: Upstream>(&self, pool: &[U]) -> HashRing {
        RingBuilder::new()
            .with_replicas(self.config.replicas)
            .with_algorithm(self.config.hash)
            .add_nodes(pool.iter().map(|u| u.dial()))
            .build()
    }
}

fn same_membership<U: Upstream>(ring: &HashRing, pool: &[U]) -> bool {
    pool.iter().all(|u| ring.contains(u.dial()))
        && ring
            .nodes()
            .all(|id| pool.iter().any(|u| u.dial() == id.as_str()))
}
