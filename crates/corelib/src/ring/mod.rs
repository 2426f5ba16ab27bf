//! Consistent hash ring implementation.
//!
//! The ring manages vnode positions and provides efficient lookup
//! operations for finding the node responsible for a key.

pub mod builder;
pub mod ring;
pub mod shared;

pub use builder::RingBuilder;
pub use ring::{ConsistentHash, DEFAULT_REPLICAS, TOP_WEIGHT};
pub use shared::SharedRing;

/// Alias for the main ring type (used by lib.rs).
pub type Ring = ConsistentHash;
