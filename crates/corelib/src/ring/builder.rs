//! Builder for one-shot rings.

use crate::node::NodeId;
use crate::partitioner::{Murmur3Partitioner, Partitioner};
use crate::ring::{ConsistentHash, DEFAULT_REPLICAS};

#[derive(Debug, Clone)]
enum Share {
    Full,
    Weight(u32),
    Replicas(usize),
}

/// Collects a node set and builds a [`ConsistentHash`] from it in one go.
///
/// Nodes are inserted in the order they were given. Since placement depends
/// only on node names, the order only matters when two vnodes collide.
///
/// ```rust
/// use corelib::ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_replicas(200)
///     .add_node("a")
///     .add_node_with_weight("b", 50)
///     .build();
///
/// assert_eq!(ring.len(), 300);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder<P = Murmur3Partitioner> {
    replicas: usize,
    partitioner: P,
    nodes: Vec<(NodeId, Share)>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            partitioner: Murmur3Partitioner,
            nodes: Vec::new(),
        }
    }
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> RingBuilder<P> {
    /// Full-weight replica count; raised to [`DEFAULT_REPLICAS`] if lower.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Hash with `partitioner` instead of Murmur3.
    pub fn with_partitioner<Q: Partitioner>(self, partitioner: Q) -> RingBuilder<Q> {
        RingBuilder {
            replicas: self.replicas,
            partitioner,
            nodes: self.nodes,
        }
    }

    pub fn add_node(mut self, node: impl Into<NodeId>) -> Self {
        self.nodes.push((node.into(), Share::Full));
        self
    }

    pub fn add_node_with_weight(mut self, node: impl Into<NodeId>, weight: u32) -> Self {
        self.nodes.push((node.into(), Share::Weight(weight)));
        self
    }

    pub fn add_node_with_replicas(mut self, node: impl Into<NodeId>, replicas: usize) -> Self {
        self.nodes.push((node.into(), Share::Replicas(replicas)));
        self
    }

    /// Number of nodes queued so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn build(self) -> ConsistentHash<P> {
        let mut ring = ConsistentHash::with_partitioner(self.replicas, self.partitioner);
        for (node, share) in self.nodes {
            match share {
                Share::Full => ring.add(node),
                Share::Weight(weight) => ring.add_with_weight(node, weight),
                Share::Replicas(replicas) => ring.add_with_replicas(node, replicas),
            }
        }
        ring
    }
}

impl<P: Partitioner, N: Into<NodeId>> Extend<N> for RingBuilder<P> {
    fn extend<T: IntoIterator<Item = N>>(&mut self, iter: T) {
        self.nodes
            .extend(iter.into_iter().map(|node| (node.into(), Share::Full)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioner::Xxh3Partitioner;

    #[test]
    fn test_builder_with_partitioner() {
        let ring = RingBuilder::new()
            .with_partitioner(Xxh3Partitioner)
            .add_node("a")
            .build();
        assert_eq!(ring.partitioner_name(), "Xxh3Partitioner");
        assert_eq!(ring.len(), DEFAULT_REPLICAS);
    }

    #[test]
    fn test_builder_extend() {
        let mut builder = RingBuilder::new();
        builder.extend(["a", "b", "c"]);
        assert_eq!(builder.node_count(), 3);
        assert_eq!(builder.build().node_count(), 3);
    }
}
