//! Command-line configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use corelib::PartitionerKind;
use tracing::Level;

use crate::commands::Command;
use crate::topology::{NodeSpec, Topology};

/// Inspect weighted consistent hash rings.
#[derive(Debug, Parser)]
#[command(name = "ringctl", version)]
pub struct CliConfig {
    /// Node as `id` or `id=weight` (weight 0..=100); repeatable
    #[arg(short, long = "node", global = true)]
    pub nodes: Vec<NodeSpec>,

    /// JSON topology file; `--node` entries are added to it
    #[arg(short, long, global = true)]
    pub topology: Option<PathBuf>,

    /// Vnodes for a full-weight node (at least 100)
    #[arg(long, global = true)]
    pub replicas: Option<usize>,

    /// Hash function: murmur3, xxh3 or sip
    #[arg(long, global = true)]
    pub partitioner: Option<PartitionerKind>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        let topology = self.load_topology()?;
        let result = self.command.execute(&topology)?;
        print!("{result}");
        Ok(())
    }

    /// Merge the topology file (if any) with command-line overrides.
    pub fn load_topology(&self) -> anyhow::Result<Topology> {
        let mut topology = match &self.topology {
            Some(path) => Topology::from_file(path)
                .with_context(|| format!("loading topology from {}", path.display()))?,
            None => Topology::default(),
        };

        for spec in &self.nodes {
            topology = topology.with_node(spec.clone());
        }
        if let Some(replicas) = self.replicas {
            topology.replicas = Some(replicas);
        }
        if let Some(partitioner) = self.partitioner {
            topology.partitioner = Some(partitioner);
        }

        topology.validate()?;
        Ok(topology)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_nodes_after_subcommand() {
        let config = CliConfig::try_parse_from([
            "ringctl",
            "lookup",
            "user-1",
            "--node",
            "a",
            "-n",
            "b=50",
            "--partitioner",
            "xxh3",
        ])
        .unwrap();

        let topology = config.load_topology().unwrap();
        assert_eq!(topology.nodes, vec![NodeSpec::new("a", 100), NodeSpec::new("b", 50)]);
        assert_eq!(topology.partitioner(), PartitionerKind::Xxh3);
    }

    #[test]
    fn test_remap_add_takes_id_equals_weight() {
        let config =
            CliConfig::try_parse_from(["ringctl", "-n", "a", "remap", "--add", "c=30"]).unwrap();
        match config.command {
            Command::Remap { add, .. } => assert_eq!(add, Some(NodeSpec::new("c", 30))),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(CliConfig::try_parse_from(["ringctl", "remap", "--add", "c:30x"]).is_ok());
        assert!(CliConfig::try_parse_from(["ringctl", "remap", "--add", "c=heavy"]).is_err());
    }

    #[test]
    fn test_rejects_bad_weight() {
        let config =
            CliConfig::try_parse_from(["ringctl", "-n", "a=500", "lookup", "k"]).unwrap();
        assert!(config.load_topology().is_err());
    }

    #[test]
    fn test_rejects_unknown_partitioner() {
        assert!(CliConfig::try_parse_from(["ringctl", "--partitioner", "md5", "lookup", "k"]).is_err());
    }
}
