//! Selector configuration.

use corelib::ring::DEFAULT_REPLICAS;
use corelib::PartitionerKind;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectorError};

/// Length of the random key used when a request carries none.
pub const DEFAULT_RANDOM_KEY_LEN: usize = 16;

/// Metadata entry read by [`MetadataKey`](crate::MetadataKey) by default.
pub const DEFAULT_METADATA_KEY: &str = "x-hash-key";

const MAX_RANDOM_KEY_LEN: usize = 256;
const MAX_REPLICAS: usize = 100_000;

/// Tunables for [`ConsistentHashSelector`](crate::ConsistentHashSelector).
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```rust
/// use selector::SelectorConfig;
///
/// let config: SelectorConfig = serde_json::from_str(r#"{"replicas": 200}"#).unwrap();
/// assert_eq!(config.replicas, 200);
/// assert_eq!(config.random_key_len, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    /// Vnodes for a full-weight backend. Values below 100 are raised to 100
    /// by the ring.
    pub replicas: usize,
    /// Length of the random fallback key.
    pub random_key_len: usize,
    /// Request metadata entry holding the routing key.
    pub metadata_key: String,
    /// Hash function placing vnodes and keys.
    pub partitioner: PartitionerKind,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            random_key_len: DEFAULT_RANDOM_KEY_LEN,
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            partitioner: PartitionerKind::default(),
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.replicas == 0 || self.replicas > MAX_REPLICAS {
            return Err(SelectorError::InvalidConfig(format!(
                "replicas must be in 1..={MAX_REPLICAS}, got {}",
                self.replicas
            )));
        }
        if self.random_key_len == 0 || self.random_key_len > MAX_RANDOM_KEY_LEN {
            return Err(SelectorError::InvalidConfig(format!(
                "random_key_len must be in 1..={MAX_RANDOM_KEY_LEN}, got {}",
                self.random_key_len
            )));
        }
        if self.metadata_key.trim().is_empty() {
            return Err(SelectorError::InvalidConfig("metadata_key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SelectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_key_len() {
        let config = SelectorConfig {
            random_key_len: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SelectorError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_blank_metadata_key() {
        let config = SelectorConfig {
            metadata_key: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partitioner_and_defaults() {
        let config: SelectorConfig =
            serde_json::from_str(r#"{"partitioner": "xxh3", "metadata_key": "tenant"}"#).unwrap();
        assert_eq!(config.partitioner, PartitionerKind::Xxh3);
        assert_eq!(config.metadata_key, "tenant");
        assert_eq!(config.replicas, DEFAULT_REPLICAS);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_json::from_str::<SelectorConfig>(r#"{"replica": 5}"#).is_err());
    }
}
