//! CLI tool for label-based upstream routing.
//!
//! Provides commands for:
//! - Dry-running routing decisions for push paths
//! - Inspecting how a pool splits the ring

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
