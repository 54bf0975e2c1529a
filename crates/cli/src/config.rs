//! Global CLI flags, settings loading and logging setup.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pushproxy::SelectionConfig;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

#[derive(Debug, Parser)]
#[command(name = "pushproxyctl")]
#[command(version)]
#[command(about = "Consistent-hash routing for Pushgateway label paths")]
#[command(long_about = "
Routes Pushgateway-style write paths (/metrics/job/<job>/<label>/<value>...)
to one upstream of a pool, so every push of a label set lands on the same
upstream.

Example usage:
  pushproxyctl route -u 10.0.0.1:9091 -u 10.0.0.2:9091 /metrics/job/api
  pushproxyctl --config selection.json ring -u 10.0.0.1:9091 -u 10.0.0.2:9091
")]
pub struct CliConfig {
    /// JSON file with selection settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "pushproxy=debug" (defaults to RUST_LOG, then "warn")
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.log_level.as_deref())?;

        let settings = self.load_settings()?;
        let result = self.command.execute(&settings)?;
        for line in &result.lines {
            println!("{line}");
        }
        if result.failures > 0 {
            anyhow::bail!("{} path(s) could not be routed", result.failures);
        }
        Ok(())
    }

    fn load_settings(&self) -> anyhow::Result<SelectionConfig> {
        let Some(path) = &self.config else {
            return Ok(SelectionConfig::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        SelectionConfig::from_json(&raw)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }
}

fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).context("invalid log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
