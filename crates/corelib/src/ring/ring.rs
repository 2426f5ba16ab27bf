//! Hash ring data structure.
//!
//! # Layout
//!
//! ```text
//!   keys:  [ 0x07.., 0x1f.., 0x5a.., 0x9c.., 0xe2.. ]   sorted, unique
//!   ring:  { 0x07.. -> b, 0x1f.. -> a, 0x5a.. -> b, ... }
//! ```
//!
//! `keys` always holds exactly the key set of `ring`, sorted ascending. A
//! lookup hashes the key, binary-searches `keys` for the first position at or
//! after the hash (wrapping to index 0 past the end) and returns its owner.
//!
//! # Collisions
//!
//! Two virtual nodes hashing to the same position are not chained: the later
//! insertion silently takes the position over. With 64-bit positions and a
//! few thousand vnodes this is vanishingly rare and accepted.
//!
//! Node membership is tracked apart from positions: a node whose every
//! position was taken over still counts in `node_count` and `contains` until
//! it is removed.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::node::NodeId;
use crate::partitioner::{Murmur3Partitioner, Partitioner};
use crate::vnode::{vnode_hash, VirtualNode};

/// Default (and minimum) number of virtual nodes for a full-weight node.
pub const DEFAULT_REPLICAS: usize = 100;

/// Weight that maps to the full replica count.
pub const TOP_WEIGHT: u32 = 100;

/// Weighted consistent hash ring.
///
/// Mutations take `&mut self`; wrap the ring in a
/// [`SharedRing`](super::SharedRing) to mutate it while other threads read,
/// or treat it as immutable once built and swap whole rings.
///
/// # Example
///
/// ```rust
/// use corelib::ring::ConsistentHash;
///
/// let mut ring = ConsistentHash::new();
/// ring.add("10.0.0.1:80");
/// ring.add_with_weight("10.0.0.2:80", 50);
///
/// let owner = ring.get("user-42").unwrap();
/// assert!(owner == "10.0.0.1:80" || owner == "10.0.0.2:80");
/// ```
#[derive(Debug, Clone)]
pub struct ConsistentHash<P = Murmur3Partitioner> {
    partitioner: P,
    replicas: usize,
    keys: Vec<u64>,
    ring: HashMap<u64, NodeId>,
    nodes: HashSet<NodeId>,
}

impl ConsistentHash {
    /// Empty ring with [`DEFAULT_REPLICAS`] and the Murmur3 partitioner.
    pub fn new() -> Self {
        Self::with_replicas(DEFAULT_REPLICAS)
    }

    /// Empty ring with the Murmur3 partitioner.
    ///
    /// `replicas` below [`DEFAULT_REPLICAS`] is raised to it.
    pub fn with_replicas(replicas: usize) -> Self {
        Self::with_partitioner(replicas, Murmur3Partitioner)
    }
}

impl Default for ConsistentHash {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> ConsistentHash<P> {
    /// Empty ring hashing with `partitioner`.
    ///
    /// `replicas` below [`DEFAULT_REPLICAS`] is raised to it: a full-weight
    /// node never gets fewer vnodes than the default.
    pub fn with_partitioner(replicas: usize, partitioner: P) -> Self {
        Self {
            partitioner,
            replicas: replicas.max(DEFAULT_REPLICAS),
            keys: Vec::new(),
            ring: HashMap::new(),
            nodes: HashSet::new(),
        }
    }

    /// Add `node` at full weight.
    pub fn add(&mut self, node: impl Into<NodeId>) {
        let replicas = self.replicas;
        self.add_with_replicas(node, replicas);
    }

    /// Add `node` with a weight in `[1, 100]`.
    ///
    /// The node gets `replicas * weight / 100` vnodes, clamped to
    /// `[1, replicas]`. Weights are not validated: 0 still yields one vnode
    /// and anything above 100 is full weight. Callers that use weight 0 to
    /// drain a node must leave it off the ring instead of calling this.
    pub fn add_with_weight(&mut self, node: impl Into<NodeId>, weight: u32) {
        let replicas = self.replicas.saturating_mul(weight as usize) / TOP_WEIGHT as usize;
        self.add_with_replicas(node, replicas);
    }

    /// Add `node` with an explicit vnode count, clamped to `[1, replicas]`.
    ///
    /// Never removes positions. Re-adding a node with a smaller count keeps
    /// its existing vnodes; a larger count only adds the missing indexes. Use
    /// [`remove`](Self::remove) first to lower a node's weight.
    pub fn add_with_replicas(&mut self, node: impl Into<NodeId>, replicas: usize) {
        let node = node.into();
        let replicas = replicas.clamp(1, self.replicas);
        for i in 0..replicas {
            let hash = vnode_hash(&self.partitioner, &node, i);
            if !self.ring.contains_key(&hash) {
                self.keys.push(hash);
            }
            // Last writer wins on collision.
            self.ring.insert(hash, node.clone());
        }
        self.keys.sort_unstable();

        debug!(%node, replicas, vnodes = self.keys.len(), "added node to ring");
        self.nodes.insert(node);
    }

    /// Node owning `key`: the first vnode clockwise from `hash(key)`.
    ///
    /// Returns `None` only when the ring is empty.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&NodeId> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = self.partitioner.hash(key.as_ref());
        let index = self.keys.partition_point(|&k| k < hash) % self.keys.len();
        self.ring.get(&self.keys[index])
    }

    /// Remove every vnode of the given nodes.
    ///
    /// Positions are recomputed from each name for up to `replicas` indexes,
    /// so the node's actual weight does not need to be known. Returns the
    /// number of vnodes removed.
    pub fn remove<I>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        let mut removed = Vec::new();
        for node in nodes {
            let node = node.into();
            for i in 0..self.replicas {
                let hash = vnode_hash(&self.partitioner, &node, i);
                if self.ring.remove(&hash).is_some() {
                    removed.push(hash);
                }
            }
            if self.nodes.remove(&node) {
                debug!(%node, "removed node from ring");
            }
        }

        // Splice out of the sorted sequence; order is preserved so no re-sort.
        for hash in &removed {
            if let Ok(index) = self.keys.binary_search(hash) {
                self.keys.remove(index);
            }
        }

        removed.len()
    }

    /// Maximum vnodes per node (the full-weight replica count).
    #[inline]
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of vnodes on the ring.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct nodes added and not removed.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// Nodes on the ring, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.iter()
    }

    /// Sorted vnode positions.
    #[inline]
    pub fn positions(&self) -> &[u64] {
        &self.keys
    }

    /// Vnodes in ring order.
    pub fn vnodes(&self) -> impl Iterator<Item = VirtualNode> + '_ {
        self.keys
            .iter()
            .filter_map(|hash| self.ring.get(hash).map(|node| VirtualNode::new(*hash, node.clone())))
    }

    /// Fraction of the hash space each node owns.
    ///
    /// A vnode owns the arc from its predecessor (exclusive) to itself
    /// (inclusive). Shares sum to 1.0 on a non-empty ring.
    pub fn ownership(&self) -> HashMap<NodeId, f64> {
        let mut shares: HashMap<NodeId, f64> = HashMap::new();
        let vnodes: Vec<VirtualNode> = self.vnodes().collect();
        let Some(last) = vnodes.last() else {
            return shares;
        };
        if vnodes.len() == 1 {
            shares.insert(last.node.clone(), 1.0);
            return shares;
        }

        let space = u64::MAX as f64 + 1.0;
        let mut prev = last;
        for vnode in &vnodes {
            let arc = prev.distance_to(vnode) as f64 / space;
            *shares.entry(vnode.node.clone()).or_default() += arc;
            prev = vnode;
        }
        shares
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }
}
