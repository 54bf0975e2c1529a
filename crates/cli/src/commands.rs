//! Subcommands.

use anyhow::Context;
use clap::Subcommand;
use corelib::RingBuilder;
use pushproxy::{PrefixTrim, PushgatewaySelector, SelectionConfig};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show which upstream each push path is routed to
    Route {
        /// Upstream dial address (repeat for each pool member, in pool order)
        #[arg(short, long = "upstream", required = true)]
        upstreams: Vec<String>,

        /// Override the label path prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Strip the prefix literally instead of as a character set
        #[arg(long)]
        literal_prefix: bool,

        /// Request paths to route
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show how the token space is split among upstreams
    Ring {
        /// Upstream dial address (repeat for each pool member)
        #[arg(short, long = "upstream", required = true)]
        upstreams: Vec<String>,

        /// Override virtual nodes per upstream
        #[arg(long)]
        replicas: Option<usize>,
    },
}

/// Output of a command.
#[derive(Debug, Default)]
pub struct CommandResult {
    pub lines: Vec<String>,
    /// Paths that produced no selection.
    pub failures: usize,
}

impl Command {
    pub fn execute(&self, settings: &SelectionConfig) -> anyhow::Result<CommandResult> {
        match self {
            Command::Route {
                upstreams,
                prefix,
                literal_prefix,
                paths,
            } => {
                let mut settings = settings.clone();
                if let Some(prefix) = prefix {
                    settings.prefix = prefix.clone();
                }
                if *literal_prefix {
                    settings.prefix_trim = PrefixTrim::Literal;
                }
                settings.validate().context("invalid route settings")?;
                Ok(route(&settings, upstreams, paths))
            }
            Command::Ring {
                upstreams,
                replicas,
            } => {
                let mut settings = settings.clone();
                if let Some(replicas) = replicas {
                    settings.replicas = *replicas;
                }
                settings.validate().context("invalid ring settings")?;
                Ok(ring(&settings, upstreams))
            }
        }
    }
}

fn route(settings: &SelectionConfig, upstreams: &[String], paths: &[String]) -> CommandResult {
    let selector = PushgatewaySelector::new(settings.clone());
    let mut result = CommandResult::default();

    for path in paths {
        let mut body = Vec::new();
        let line = match selector.select(upstreams, path, &mut body) {
            Some(upstream) => format!("{path}\t{upstream}"),
            None if body.is_empty() => {
                result.failures += 1;
                format!("{path}\t(no selection)")
            }
            None => {
                result.failures += 1;
                format!("{path}\terror: {}", String::from_utf8_lossy(&body))
            }
        };
        result.lines.push(line);
    }
    result
}

fn ring(settings: &SelectionConfig, upstreams: &[String]) -> CommandResult {
    let ring = RingBuilder::new()
        .with_replicas(settings.replicas)
        .with_algorithm(settings.hash)
        .add_nodes(upstreams)
        .build();

    let mut lines = vec![format!(
        "{} upstreams, {} tokens, {}",
        ring.node_count(),
        ring.token_count(),
        ring.partitioner_name()
    )];
    for (node, share) in ring.ownership() {
        let tokens = ring.vnodes().iter().filter(|v| v.node_id() == &node).count();
        lines.push(format!("{node}\t{tokens}\t{:.2}%", share * 100.0));
    }
    CommandResult { lines, failures: 0 }
}
