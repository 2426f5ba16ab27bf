//! Node abstractions for the consistent hash ring.
//!
//! A node is an opaque backend identifier, usually an address such as
//! `10.0.0.7:8080`. It carries no identity beyond its string value, so two
//! `NodeId`s with the same text are the same node.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier for a backend node.
///
/// Backed by an `Arc<str>` so the hundreds of virtual nodes that point at the
/// same backend share one allocation and clones stay cheap.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create a node id from any string-like value.
    ///
    /// No validation happens here; use [`NodeId::from_str`] (or `parse`) for
    /// untrusted input.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", &*self.0)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidNode("node id must not be empty".into()));
        }
        Ok(Self::new(trimmed))
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&String> for NodeId {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_equality_is_by_value() {
        let a = NodeId::new("10.0.0.1:80");
        let b = NodeId::from(String::from("10.0.0.1:80"));
        assert_eq!(a, b);
        assert_eq!(a, "10.0.0.1:80");
    }

    #[test]
    fn test_node_id_parse_rejects_blank() {
        assert!("".parse::<NodeId>().is_err());
        assert!("   ".parse::<NodeId>().is_err());
        assert_eq!("  node-a ".parse::<NodeId>().unwrap(), "node-a");
    }

    #[test]
    fn test_node_id_serde_is_plain_string() {
        let id = NodeId::new("node-a");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"node-a\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
