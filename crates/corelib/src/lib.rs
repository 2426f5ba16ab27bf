//! Core library for weighted consistent hashing.
//!
//! This crate provides the fundamental abstractions for consistent hashing:
//! - Partitioners (hash functions) turning keys into ring positions
//! - Node and virtual node abstractions
//! - The hash ring itself, its builder and a lock-protected shared ring
//!
//! ```rust
//! use corelib::RingBuilder;
//!
//! let ring = RingBuilder::new()
//!     .add_node("10.0.0.1:80")
//!     .add_node_with_weight("10.0.0.2:80", 50)
//!     .build();
//!
//! // Same key, same node, for as long as the node set does not change.
//! assert_eq!(ring.get("session-17"), ring.get("session-17"));
//! ```

pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod vnode;

pub use error::{Error, Result};
pub use node::NodeId;
pub use partitioner::{Partitioner, PartitionerKind};
pub use ring::{ConsistentHash, Ring, RingBuilder, SharedRing};
pub use vnode::VirtualNode;
