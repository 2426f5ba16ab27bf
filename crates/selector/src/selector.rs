//! Consistent-hash connection selector.
//!
//! # Concurrency
//!
//! Each backend snapshot becomes an immutable ring wrapped in an `Arc`. A
//! topology change builds the next ring off to the side and swaps the `Arc`
//! under a write lock held only for the swap; `pick` clones the current `Arc`
//! and searches it without holding any lock. In-flight picks keep using the
//! ring they started with until they drop it.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use corelib::ring::{ConsistentHash, RingBuilder, TOP_WEIGHT};
use corelib::{NodeId, PartitionerKind};
use metrics::{counter, gauge};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::SelectorConfig;
use crate::error::{Result, SelectorError};
use crate::key::{random_key, KeyExtractor, MetadataKey};

/// One candidate backend: its id, its weight and the connection handle the
/// pool bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend<C> {
    pub id: NodeId,
    /// Share of traffic in `[0, 100]`; 0 drains the backend.
    pub weight: u32,
    pub conn: C,
}

impl<C> Backend<C> {
    /// Full-weight backend.
    pub fn new(id: impl Into<NodeId>, conn: C) -> Self {
        Self {
            id: id.into(),
            weight: TOP_WEIGHT,
            conn,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

/// Picks a connection for a request.
///
/// Implemented by [`ConsistentHashSelector`]; transports can hold a
/// `dyn Picker<C>` to stay independent of the balancing policy.
pub trait Picker<C>: Send + Sync {
    /// Connection for `key`, or for a random key when `key` is `None` or
    /// empty.
    fn pick(&self, key: Option<&str>) -> Result<C>;

    /// Get the picker name (for logging/debugging).
    fn name(&self) -> &'static str;
}

#[derive(Debug)]
struct Snapshot<C> {
    ring: ConsistentHash<PartitionerKind>,
    conns: HashMap<NodeId, C>,
}

/// Routes requests to connections through a weighted consistent hash ring.
#[derive(Debug)]
pub struct ConsistentHashSelector<C> {
    config: SelectorConfig,
    active: RwLock<Arc<Snapshot<C>>>,
}

impl<C: Clone> ConsistentHashSelector<C> {
    /// Selector with no backends; every pick is `Unavailable` until
    /// [`update`](Self::update) is called.
    pub fn new(config: SelectorConfig) -> Result<Self> {
        config.validate()?;
        let empty = Snapshot {
            ring: ConsistentHash::with_partitioner(config.replicas, config.partitioner),
            conns: HashMap::new(),
        };
        Ok(Self {
            config,
            active: RwLock::new(Arc::new(empty)),
        })
    }

    pub fn with_backends<I>(config: SelectorConfig, backends: I) -> Result<Self>
    where
        I: IntoIterator<Item = Backend<C>>,
    {
        let selector = Self::new(config)?;
        selector.update(backends)?;
        Ok(selector)
    }

    /// Replace the backend set, rebuilding the ring from scratch.
    ///
    /// Backends with weight 0 are left off the ring. On error the previous
    /// backend set stays active.
    pub fn update<I>(&self, backends: I) -> Result<()>
    where
        I: IntoIterator<Item = Backend<C>>,
    {
        let mut builder = RingBuilder::new()
            .with_replicas(self.config.replicas)
            .with_partitioner(self.config.partitioner);
        let mut conns = HashMap::new();
        let mut seen = HashSet::new();

        for backend in backends {
            if backend.id.as_str().trim().is_empty() {
                return Err(SelectorError::EmptyNodeId);
            }
            if backend.weight > TOP_WEIGHT {
                return Err(SelectorError::InvalidWeight {
                    node: backend.id,
                    weight: backend.weight,
                });
            }
            if !seen.insert(backend.id.clone()) {
                return Err(SelectorError::DuplicateNode(backend.id));
            }
            if backend.weight == 0 {
                debug!(node = %backend.id, "backend drained, leaving it off the ring");
                continue;
            }

            builder = builder.add_node_with_weight(backend.id.clone(), backend.weight);
            conns.insert(backend.id, backend.conn);
        }

        let ring = builder.build();
        debug!(
            backends = conns.len(),
            vnodes = ring.len(),
            partitioner = ring.partitioner_name(),
            "rebuilt selector ring"
        );
        gauge!("selector_backends").set(conns.len() as f64);

        *self.active.write() = Arc::new(Snapshot { ring, conns });
        Ok(())
    }

    /// Connection for `key`, or for a random key when `key` is `None` or
    /// empty.
    pub fn pick(&self, key: Option<&str>) -> Result<C> {
        counter!("selector_picks_total").increment(1);

        let key = match key {
            Some(key) if !key.is_empty() => Cow::Borrowed(key),
            _ => {
                counter!("selector_random_keys_total").increment(1);
                Cow::Owned(random_key(self.config.random_key_len))
            }
        };

        let snapshot = self.snapshot();
        let conn = snapshot
            .ring
            .get(key.as_bytes())
            .and_then(|node| snapshot.conns.get(node));

        match conn {
            Some(conn) => Ok(conn.clone()),
            None => {
                counter!("selector_unavailable_total").increment(1);
                trace!(key = %key, "no backend available");
                Err(SelectorError::Unavailable)
            }
        }
    }

    /// Extract the routing key from `request`, then [`pick`](Self::pick).
    pub fn pick_for<R, E>(&self, request: &R, extractor: &E) -> Result<C>
    where
        R: ?Sized,
        E: KeyExtractor<R> + ?Sized,
    {
        let key = extractor.extract(request);
        self.pick(key.as_deref())
    }

    /// Extractor reading the configured metadata entry.
    pub fn metadata_extractor(&self) -> MetadataKey {
        MetadataKey::new(self.config.metadata_key.as_str())
    }

    /// Backend that `key` routes to, without touching connections.
    pub fn route(&self, key: &str) -> Option<NodeId> {
        self.snapshot().ring.get(key).cloned()
    }

    /// Ids of the backends on the active ring, sorted.
    pub fn backends(&self) -> Vec<NodeId> {
        let snapshot = self.snapshot();
        let mut ids: Vec<NodeId> = snapshot.conns.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of backends on the active ring.
    pub fn len(&self) -> usize {
        self.snapshot().conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    fn snapshot(&self) -> Arc<Snapshot<C>> {
        Arc::clone(&self.active.read())
    }
}

impl<C: Clone + Send + Sync> Picker<C> for ConsistentHashSelector<C> {
    fn pick(&self, key: Option<&str>) -> Result<C> {
        ConsistentHashSelector::pick(self, key)
    }

    fn name(&self) -> &'static str {
        "ConsistentHashSelector"
    }
}
