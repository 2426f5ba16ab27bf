//! Node sets given on the command line or in a JSON file.
//!
//! ```json
//! {
//!   "replicas": 100,
//!   "partitioner": "murmur3",
//!   "nodes": [
//!     { "id": "10.0.0.1:80" },
//!     { "id": "10.0.0.2:80", "weight": 50 }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use corelib::ring::{ConsistentHash, RingBuilder, DEFAULT_REPLICAS, TOP_WEIGHT};
use corelib::{NodeId, PartitionerKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid node spec {0:?}: expected `id` or `id=weight`")]
    InvalidSpec(String),
    #[error("weight {weight} for node {node} is outside 0..=100")]
    InvalidWeight { node: NodeId, weight: u32 },
    #[error("node {0} listed more than once")]
    DuplicateNode(NodeId),
    #[error("failed to read topology file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse topology file: {0}")]
    Json(#[from] serde_json::Error),
}

fn full_weight() -> u32 {
    TOP_WEIGHT
}

/// One node and its weight. Parses from `id` or `id=weight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(default = "full_weight")]
    pub weight: u32,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, weight: u32) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

impl FromStr for NodeSpec {
    type Err = TopologyError;

    // Split on the last '=' so ids may contain ':' (host:port).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TopologyError::InvalidSpec(s.to_string());
        let (id, weight) = match s.rsplit_once('=') {
            Some((id, weight)) => (id, weight.trim().parse().map_err(|_| invalid())?),
            None => (s, TOP_WEIGHT),
        };
        let id: NodeId = id.parse().map_err(|_| invalid())?;
        Ok(Self { id, weight })
    }
}

impl fmt::Display for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id, self.weight)
    }
}

/// A node set plus ring parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Topology {
    #[serde(default)]
    pub replicas: Option<usize>,
    #[serde(default)]
    pub partitioner: Option<PartitionerKind>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl Topology {
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TopologyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let topology = Self::from_json(&json)?;
        debug!(path = %path.display(), nodes = topology.nodes.len(), "loaded topology");
        Ok(topology)
    }

    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.nodes {
            if spec.weight > TOP_WEIGHT {
                return Err(TopologyError::InvalidWeight {
                    node: spec.id.clone(),
                    weight: spec.weight,
                });
            }
            if !seen.insert(&spec.id) {
                return Err(TopologyError::DuplicateNode(spec.id.clone()));
            }
        }
        Ok(())
    }

    pub fn replicas(&self) -> usize {
        self.replicas.unwrap_or(DEFAULT_REPLICAS)
    }

    pub fn partitioner(&self) -> PartitionerKind {
        self.partitioner.unwrap_or_default()
    }

    /// Copy with `spec` added, replacing any node with the same id.
    pub fn with_node(&self, spec: NodeSpec) -> Self {
        let mut next = self.without_node(&spec.id);
        next.nodes.push(spec);
        next
    }

    pub fn without_node(&self, id: &NodeId) -> Self {
        let mut next = self.clone();
        next.nodes.retain(|spec| &spec.id != id);
        next
    }

    /// Build the ring. Weight-0 nodes are left off.
    pub fn build_ring(&self) -> ConsistentHash<PartitionerKind> {
        let mut builder = RingBuilder::new()
            .with_replicas(self.replicas())
            .with_partitioner(self.partitioner());
        for spec in self.nodes.iter().filter(|spec| spec.weight > 0) {
            builder = builder.add_node_with_weight(spec.id.clone(), spec.weight);
        }
        builder.build()
    }
}
