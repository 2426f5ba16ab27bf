//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys (and virtual-node names)
//! into 64-bit positions on the hash ring.

pub mod murmur3;
pub mod sip;
pub mod traits;
pub mod xxh3;

pub use murmur3::Murmur3Partitioner;
pub use sip::SipPartitioner;
pub use traits::{HashFn, Partitioner};
pub use xxh3::Xxh3Partitioner;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Names the built-in partitioners, for configuration and command lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Murmur3,
    Xxh3,
    Sip,
}

impl PartitionerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionerKind::Murmur3 => "murmur3",
            PartitionerKind::Xxh3 => "xxh3",
            PartitionerKind::Sip => "sip",
        }
    }
}

impl Partitioner for PartitionerKind {
    fn hash(&self, key: &[u8]) -> u64 {
        match self {
            PartitionerKind::Murmur3 => Murmur3Partitioner.hash(key),
            PartitionerKind::Xxh3 => Xxh3Partitioner.hash(key),
            PartitionerKind::Sip => SipPartitioner.hash(key),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PartitionerKind::Murmur3 => Murmur3Partitioner.name(),
            PartitionerKind::Xxh3 => Xxh3Partitioner.name(),
            PartitionerKind::Sip => SipPartitioner.name(),
        }
    }
}

impl FromStr for PartitionerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "murmur3" | "murmur" => Ok(PartitionerKind::Murmur3),
            "xxh3" | "xxhash" => Ok(PartitionerKind::Xxh3),
            "sip" | "siphash" => Ok(PartitionerKind::Sip),
            other => Err(Error::UnknownPartitioner(other.to_string())),
        }
    }
}

impl std::fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_aliases() {
        assert_eq!("Murmur3".parse::<PartitionerKind>().unwrap(), PartitionerKind::Murmur3);
        assert_eq!("xxhash".parse::<PartitionerKind>().unwrap(), PartitionerKind::Xxh3);
        assert_eq!("siphash".parse::<PartitionerKind>().unwrap(), PartitionerKind::Sip);
        assert!(matches!(
            "md5".parse::<PartitionerKind>(),
            Err(Error::UnknownPartitioner(name)) if name == "md5"
        ));
    }

    #[test]
    fn test_kind_delegates_to_partitioner() {
        let key = b"user-42";
        assert_eq!(PartitionerKind::Murmur3.hash(key), Murmur3Partitioner.hash(key));
        assert_eq!(PartitionerKind::Xxh3.hash(key), Xxh3Partitioner.hash(key));
        assert_eq!(PartitionerKind::Sip.hash(key), SipPartitioner.hash(key));
        assert_eq!(PartitionerKind::Xxh3.name(), "Xxh3Partitioner");
    }

    #[test]
    fn test_partitioners_disagree() {
        let key = b"user-42";
        assert_ne!(Murmur3Partitioner.hash(key), Xxh3Partitioner.hash(key));
        assert_ne!(Murmur3Partitioner.hash(key), SipPartitioner.hash(key));
    }
}
