//! Connection selection over a weighted consistent hash ring.
//!
//! This crate is the thin layer between a connection pool and the ring:
//! - Rebuilds a ring whenever the backend set changes
//! - Turns a per-request routing key (or a random one) into a connection
//! - Reports "no backend available" as its own error variant
//!
//! ```rust
//! use selector::{Backend, ConsistentHashSelector, SelectorConfig};
//!
//! let selector = ConsistentHashSelector::new(SelectorConfig::default()).unwrap();
//! selector
//!     .update([
//!         Backend::new("10.0.0.1:80", "conn-1"),
//!         Backend::new("10.0.0.2:80", "conn-2").with_weight(50),
//!     ])
//!     .unwrap();
//!
//! let conn = selector.pick(Some("user-42")).unwrap();
//! assert_eq!(selector.pick(Some("user-42")).unwrap(), conn);
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod selector;

pub use config::SelectorConfig;
pub use error::{Result, SelectorError};
pub use key::{random_key, KeyExtractor, Metadata, MetadataKey};
pub use selector::{Backend, ConsistentHashSelector, Picker};
