//! ringctl subcommands.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::bail;
use clap::Subcommand;
use corelib::{ConsistentHash, NodeId, PartitionerKind, VirtualNode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::topology::{NodeSpec, Topology};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the node owning each key
    Lookup {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Share of sampled keys and of the hash space per node
    Distribution {
        #[arg(short, long, default_value_t = 100_000)]
        samples: usize,
        /// Seed for the sampled keys
        #[arg(long)]
        seed: Option<u64>,
    },
    /// How many sampled keys change owner when one node joins or leaves
    Remap {
        /// Node joining, as `id` or `id=weight`
        #[arg(long, conflicts_with = "remove")]
        add: Option<NodeSpec>,
        /// Node leaving
        #[arg(long)]
        remove: Option<NodeId>,
        #[arg(short, long, default_value_t = 100_000)]
        samples: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List vnode positions in ring order
    Vnodes {
        /// Only this node's vnodes
        #[arg(long)]
        node: Option<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRow {
    pub node: NodeId,
    pub weight: u32,
    pub vnodes: usize,
    /// Fraction of sampled keys.
    pub keys: f64,
    /// Fraction of the hash space.
    pub ownership: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemapReport {
    pub changed: NodeId,
    pub joined: bool,
    pub samples: usize,
    pub moved: usize,
    /// Every moved key moved to (join) or from (leave) the changed node.
    pub bounded: bool,
}

/// Outcome of a command, printed by the binary.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Lookup(Vec<(String, Option<NodeId>)>),
    Distribution {
        samples: usize,
        rows: Vec<DistributionRow>,
    },
    Remap(RemapReport),
    Vnodes(Vec<VirtualNode>),
}

impl Command {
    pub fn execute(&self, topology: &Topology) -> anyhow::Result<CommandResult> {
        let ring = topology.build_ring();
        info!(
            nodes = ring.node_count(),
            vnodes = ring.len(),
            partitioner = ring.partitioner_name(),
            "built ring"
        );

        match self {
            Command::Lookup { keys } => Ok(CommandResult::Lookup(
                keys.iter()
                    .map(|key| (key.clone(), ring.get(key).cloned()))
                    .collect(),
            )),
            Command::Distribution { samples, seed } => {
                if ring.is_empty() {
                    bail!("no nodes given; use --node or --topology");
                }
                Ok(distribution(topology, &ring, *samples, *seed))
            }
            Command::Remap {
                add,
                remove,
                samples,
                seed,
            } => {
                let (changed, joined, after) = match (add, remove) {
                    (Some(spec), None) => (spec.id.clone(), true, topology.with_node(spec.clone())),
                    (None, Some(id)) => {
                        if !topology.nodes.iter().any(|spec| &spec.id == id) {
                            bail!("node {id} is not in the topology");
                        }
                        (id.clone(), false, topology.without_node(id))
                    }
                    _ => bail!("remap needs exactly one of --add or --remove"),
                };
                after.validate()?;
                let report = remap(&ring, &after.build_ring(), changed, joined, *samples, *seed);
                Ok(CommandResult::Remap(report))
            }
            Command::Vnodes { node } => Ok(CommandResult::Vnodes(
                ring.vnodes()
                    .filter(|vnode| node.as_ref().map_or(true, |n| &vnode.node == n))
                    .collect(),
            )),
        }
    }
}

fn sample_keys(samples: usize, seed: Option<u64>) -> impl Iterator<Item = String> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    (0..samples).map(move |_| format!("{:016x}", rng.random::<u64>()))
}

fn distribution(
    topology: &Topology,
    ring: &ConsistentHash<PartitionerKind>,
    samples: usize,
    seed: Option<u64>,
) -> CommandResult {
    let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
    for key in sample_keys(samples, seed) {
        if let Some(node) = ring.get(&key) {
            *counts.entry(node.clone()).or_default() += 1;
        }
    }

    let ownership = ring.ownership();
    let vnodes = ring.vnodes().fold(BTreeMap::<NodeId, usize>::new(), |mut acc, v| {
        *acc.entry(v.node).or_default() += 1;
        acc
    });

    let rows = topology
        .nodes
        .iter()
        .filter(|spec| ring.contains(spec.id.as_str()))
        .map(|spec| DistributionRow {
            node: spec.id.clone(),
            weight: spec.weight,
            vnodes: vnodes.get(&spec.id).copied().unwrap_or_default(),
            keys: counts.get(&spec.id).copied().unwrap_or_default() as f64 / samples.max(1) as f64,
            ownership: ownership.get(&spec.id).copied().unwrap_or_default(),
        })
        .collect();

    CommandResult::Distribution { samples, rows }
}

fn remap(
    before: &ConsistentHash<PartitionerKind>,
    after: &ConsistentHash<PartitionerKind>,
    changed: NodeId,
    joined: bool,
    samples: usize,
    seed: Option<u64>,
) -> RemapReport {
    let mut moved = 0;
    let mut bounded = true;
    for key in sample_keys(samples, seed) {
        let old = before.get(&key);
        let new = after.get(&key);
        if old != new {
            moved += 1;
            let touches_changed = if joined {
                new == Some(&changed)
            } else {
                old == Some(&changed)
            };
            bounded &= touches_changed;
        }
    }

    RemapReport {
        changed,
        joined,
        samples,
        moved,
        bounded,
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Lookup(rows) => {
                for (key, node) in rows {
                    match node {
                        Some(node) => writeln!(f, "{key}\t{node}")?,
                        None => writeln!(f, "{key}\t<no backend available>")?,
                    }
                }
                Ok(())
            }
            CommandResult::Distribution { samples, rows } => {
                writeln!(f, "node\tweight\tvnodes\tkeys\tspace\t({samples} samples)")?;
                for row in rows {
                    writeln!(
                        f,
                        "{}\t{}\t{}\t{:.2}%\t{:.2}%",
                        row.node,
                        row.weight,
                        row.vnodes,
                        row.keys * 100.0,
                        row.ownership * 100.0
                    )?;
                }
                Ok(())
            }
            CommandResult::Remap(report) => {
                let verb = if report.joined { "joining" } else { "leaving" };
                let fraction = report.moved as f64 / report.samples.max(1) as f64;
                writeln!(
                    f,
                    "{} {verb}: {}/{} keys moved ({:.2}%)",
                    report.changed,
                    report.moved,
                    report.samples,
                    fraction * 100.0
                )?;
                if report.bounded {
                    writeln!(f, "all moved keys involve {}", report.changed)
                } else {
                    writeln!(f, "WARNING: keys moved between unchanged nodes")
                }
            }
            CommandResult::Vnodes(vnodes) => {
                for vnode in vnodes {
                    writeln!(f, "{:016x}\t{}", vnode.hash, vnode.node)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(nodes: &[(&str, u32)]) -> Topology {
        Topology {
            nodes: nodes.iter().map(|(id, w)| NodeSpec::new(*id, *w)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_on_empty_topology() {
        let result = Command::Lookup {
            keys: vec!["k".into()],
        }
        .execute(&Topology::default())
        .unwrap();
        assert_eq!(result, CommandResult::Lookup(vec![("k".into(), None)]));
        assert_eq!(result.to_string(), "k\t<no backend available>\n");
    }

    #[test]
    fn test_distribution_follows_weights() {
        let result = Command::Distribution {
            samples: 20_000,
            seed: Some(3),
        }
        .execute(&topology(&[("a", 100), ("b", 10)]))
        .unwrap();

        let CommandResult::Distribution { rows, .. } = result else {
            panic!("expected distribution");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].vnodes, 100);
        assert_eq!(rows[1].vnodes, 10);
        assert!(rows[0].keys > rows[1].keys);
        let total: f64 = rows.iter().map(|r| r.keys).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_remap_join_is_bounded() {
        let result = Command::Remap {
            add: Some(NodeSpec::new("c", 100)),
            remove: None,
            samples: 10_000,
            seed: Some(1),
        }
        .execute(&topology(&[("a", 100), ("b", 100)]))
        .unwrap();

        let CommandResult::Remap(report) = result else {
            panic!("expected remap report");
        };
        assert!(report.joined);
        assert!(report.bounded);
        assert!(report.moved > 0 && report.moved < 10_000);
    }

    #[test]
    fn test_remap_leave_is_bounded() {
        let result = Command::Remap {
            add: None,
            remove: Some(NodeId::new("b")),
            samples: 5_000,
            seed: Some(2),
        }
        .execute(&topology(&[("a", 100), ("b", 100), ("c", 50)]))
        .unwrap();

        let CommandResult::Remap(report) = result else {
            panic!("expected remap report");
        };
        assert!(!report.joined);
        assert!(report.bounded);
    }

    #[test]
    fn test_remap_unknown_node_fails() {
        let err = Command::Remap {
            add: None,
            remove: Some(NodeId::new("zzz")),
            samples: 10,
            seed: None,
        }
        .execute(&topology(&[("a", 100)]))
        .unwrap_err();
        assert!(err.to_string().contains("zzz"));
    }

    #[test]
    fn test_vnodes_filter() {
        let result = Command::Vnodes {
            node: Some(NodeId::new("b")),
        }
        .execute(&topology(&[("a", 100), ("b", 20)]))
        .unwrap();

        let CommandResult::Vnodes(vnodes) = result else {
            panic!("expected vnodes");
        };
        assert_eq!(vnodes.len(), 20);
        assert!(vnodes.windows(2).all(|w| w[0].hash < w[1].hash));
    }
}
