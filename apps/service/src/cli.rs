use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "autoconf", version, about = "Discover check templates from a coordination store")]
pub struct Cli {
    /// Path to the config file (defaults to $XDG_CONFIG_HOME/autoconf/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the store location (provider.template_url)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Override the crawl root (provider.template_dir)
    #[arg(long, global = true)]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one crawl and print the discovered check configurations
    Collect {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Crawl periodically and log changes
    Watch {
        /// Seconds between crawls (service.interval_seconds)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Query the local kubelet
    Kubelet {
        #[command(subcommand)]
        query: KubeletQuery,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Debug, Subcommand)]
pub enum KubeletQuery {
    /// List pods on this node
    Pods,
    /// Print the node's host IP and name
    Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collect_with_overrides() {
        let cli = Cli::try_parse_from([
            "autoconf", "collect", "--format", "text", "--store", "/srv/t", "--root", "/checks",
        ])
        .unwrap();

        assert_eq!(cli.store.as_deref(), Some("/srv/t"));
        assert_eq!(cli.root.as_deref(), Some("/checks"));
        assert!(matches!(cli.command, Command::Collect { format: OutputFormat::Text }));
    }

    #[test]
    fn test_parse_watch_and_kubelet() {
        let cli = Cli::try_parse_from(["autoconf", "watch", "-i", "5"]).unwrap();
        assert!(matches!(cli.command, Command::Watch { interval: Some(5) }));

        let cli = Cli::try_parse_from(["autoconf", "kubelet", "node"]).unwrap();
        assert!(matches!(cli.command, Command::Kubelet { query: KubeletQuery::Node }));
    }
}
