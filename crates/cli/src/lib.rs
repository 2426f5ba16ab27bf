//! CLI tool for inspecting weighted consistent hash rings.
//!
//! Provides commands for:
//! - Looking up which node owns a key
//! - Measuring key distribution across weighted nodes
//! - Measuring how many keys move when a node joins or leaves
//! - Listing vnode positions

pub mod commands;
pub mod config;
pub mod topology;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
pub use topology::{NodeSpec, Topology, TopologyError};
