//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Instead of each backend having a single position on the ring, each backend
//! owns several positions (virtual nodes). This provides:
//!
//! 1. **Better Load Distribution**: more positions, smoother key spread
//! 2. **Weighting**: a backend's share of keys follows its vnode count
//! 3. **Gradual Rebalancing**: when nodes join/leave only their arcs move
//!
//! # Placement
//!
//! The position of vnode `i` of node `n` is `hash(n + i)`: the node name
//! concatenated with the decimal replica index, no separator. Placement is
//! therefore a pure function of the node name, so two processes that build a
//! ring from the same node list get identical rings.
//!
//! Names ending in a digit can alias each other (`"a1" + 1` and `"a" + 11`
//! both hash `"a11"`); such pairs collide like any other hash collision.

use crate::node::NodeId;
use crate::partitioner::Partitioner;

/// A virtual node on the hash ring.
///
/// Represents a single position owned by a backend node. Ordered by hash
/// first, so a sorted `Vec<VirtualNode>` is in ring order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Position on the ring.
    pub hash: u64,

    /// The node that owns this position.
    pub node: NodeId,
}

impl VirtualNode {
    /// Create a new virtual node.
    #[inline]
    pub fn new(hash: u64, node: NodeId) -> Self {
        Self { hash, node }
    }

    /// Create the `index`-th virtual node of `node`.
    pub fn from_index<P: Partitioner + ?Sized>(partitioner: &P, node: &NodeId, index: usize) -> Self {
        Self::new(vnode_hash(partitioner, node, index), node.clone())
    }

    /// Clockwise distance from this vnode to `other`, wrapping at `u64::MAX`.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        other.hash.wrapping_sub(self.hash)
    }
}

impl std::fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VNode(hash={:016x}, node={})", self.hash, self.node)
    }
}

/// The string hashed to place vnode `index` of `node`.
#[inline]
pub fn vnode_key(node: &NodeId, index: usize) -> String {
    format!("{}{}", node, index)
}

/// Ring position of vnode `index` of `node`.
#[inline]
pub fn vnode_hash<P: Partitioner + ?Sized>(partitioner: &P, node: &NodeId, index: usize) -> u64 {
    partitioner.hash(vnode_key(node, index).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioner::Murmur3Partitioner;

    #[test]
    fn test_vnode_key_is_plain_concatenation() {
        assert_eq!(vnode_key(&NodeId::new("10.0.0.1:80"), 7), "10.0.0.1:807");
        assert_eq!(vnode_key(&NodeId::new("a"), 12), "a12");
    }

    #[test]
    fn test_vnode_from_index() {
        let node = NodeId::new("node1");
        let vnode0 = VirtualNode::from_index(&Murmur3Partitioner, &node, 0);
        let vnode1 = VirtualNode::from_index(&Murmur3Partitioner, &node, 1);

        assert_ne!(vnode0.hash, vnode1.hash);
        assert_eq!(vnode0.node, vnode1.node);
        assert_eq!(vnode0.hash, Murmur3Partitioner.hash(b"node10"));
    }

    #[test]
    fn test_vnode_distance_wraps() {
        let a = VirtualNode::new(100, NodeId::new("a"));
        let b = VirtualNode::new(200, NodeId::new("b"));

        assert_eq!(a.distance_to(&b), 100);
        assert_eq!(b.distance_to(&a), u64::MAX - 99);
    }

    #[test]
    fn test_vnode_ordering() {
        let a = VirtualNode::new(100, NodeId::new("z"));
        let b = VirtualNode::new(200, NodeId::new("a"));
        assert!(a < b);
    }
}
