//! A ring that can be mutated while other threads look keys up.

use parking_lot::RwLock;

use crate::node::NodeId;
use crate::partitioner::{Murmur3Partitioner, Partitioner};
use crate::ring::ConsistentHash;

/// [`ConsistentHash`] behind a single reader/writer lock.
///
/// Lookups take the read lock; `add*` and `remove` take the write lock. Lock
/// hold times are bounded by a sort (writes) or a binary search (reads) over
/// the vnode count. Every method takes `&self`, so the ring can be shared
/// through an `Arc`.
///
/// When the whole node set is replaced at once, building a fresh
/// `ConsistentHash` and swapping it in with [`SharedRing::replace`] keeps the
/// write lock held only for the pointer-sized swap.
#[derive(Debug)]
pub struct SharedRing<P = Murmur3Partitioner> {
    inner: RwLock<ConsistentHash<P>>,
}

impl<P: Partitioner> SharedRing<P> {
    pub fn new(ring: ConsistentHash<P>) -> Self {
        Self {
            inner: RwLock::new(ring),
        }
    }

    pub fn add(&self, node: impl Into<NodeId>) {
        self.inner.write().add(node);
    }

    pub fn add_with_weight(&self, node: impl Into<NodeId>, weight: u32) {
        self.inner.write().add_with_weight(node, weight);
    }

    pub fn add_with_replicas(&self, node: impl Into<NodeId>, replicas: usize) {
        self.inner.write().add_with_replicas(node, replicas);
    }

    /// Owner of `key`, or `None` if the ring is empty.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<NodeId> {
        self.inner.read().get(key).cloned()
    }

    pub fn remove<I>(&self, nodes: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        self.inner.write().remove(nodes)
    }

    /// Swap in a new ring, returning the old one.
    pub fn replace(&self, ring: ConsistentHash<P>) -> ConsistentHash<P> {
        std::mem::replace(&mut *self.inner.write(), ring)
    }

    /// Run `f` against the ring under the read lock.
    pub fn with<R>(&self, f: impl FnOnce(&ConsistentHash<P>) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.inner.read().contains(node)
    }

    pub fn into_inner(self) -> ConsistentHash<P> {
        self.inner.into_inner()
    }
}

impl Default for SharedRing {
    fn default() -> Self {
        Self::new(ConsistentHash::new())
    }
}

impl<P: Partitioner> From<ConsistentHash<P>> for SharedRing<P> {
    fn from(ring: ConsistentHash<P>) -> Self {
        Self::new(ring)
    }
}

impl<P: Partitioner + Clone> SharedRing<P> {
    /// Copy of the current ring.
    pub fn snapshot(&self) -> ConsistentHash<P> {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_shared_ring_basic_ops() {
        let ring = SharedRing::new(ConsistentHash::new());
        assert_eq!(ring.get("key"), None);

        ring.add("a");
        ring.add_with_weight("b", 10);
        assert_eq!(ring.node_count(), 2);
        assert_eq!(ring.len(), 110);

        assert_eq!(ring.remove(["a"]), 100);
        assert_eq!(ring.get("key").unwrap(), "b");
    }

    #[test]
    fn test_replace_returns_old_ring() {
        let ring = SharedRing::new(ConsistentHash::new());
        ring.add("old");

        let mut fresh = ConsistentHash::new();
        fresh.add("new");
        let old = ring.replace(fresh);

        assert!(old.contains("old"));
        assert!(ring.contains("new"));
        assert!(!ring.contains("old"));
    }

    #[test]
    fn test_shared_across_threads() {
        let ring = Arc::new(SharedRing::new(ConsistentHash::new()));
        ring.add("a");

        let reader = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || ring.get("key").is_some())
        };
        assert!(reader.join().unwrap());
    }
}
