#![warn(clippy::all)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use autoconf::kubelet::KubeUtil;
use autoconf::{ConfigProvider, ProviderRegistry};
use clap::Parser;
use tracing::info;

mod cli;
mod config;
mod runner;

use cli::{Cli, Command, KubeletQuery};
use config::Config;
use runner::Watcher;

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_config(cli.config.as_ref()).context("failed to load config")?;
    if let Some(store) = cli.store {
        config.provider = config.provider.with_template_url(store);
    }
    if let Some(root) = cli.root {
        config.provider = config.provider.with_template_dir(root);
    }

    match cli.command {
        Command::Collect { format } => {
            let provider = build_provider(&config)?;
            let configs = runner::collect_once(provider.as_ref()).await?;
            print!("{}", runner::render(&configs, format)?);
        }
        Command::Watch { interval } => {
            let provider = build_provider(&config)?;
            let seconds = interval.unwrap_or(config.service.interval_seconds).max(1);
            let period = Duration::from_secs(seconds);
            info!(provider = %provider, ?period, "watching for check templates");

            let mut watcher = Watcher::new(provider);
            tokio::select! {
                _ = watcher.run(period) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
            info!(configs = watcher.current().len(), "shutting down");
        }
        Command::Kubelet { query } => {
            let kube = KubeUtil::new(config.kubelet.clone());
            match query {
                KubeletQuery::Pods => {
                    let pods = kube.get_local_pod_list().await?;
                    println!("{}", serde_json::to_string_pretty(&pods)?);
                }
                KubeletQuery::Node => {
                    let (ip, name) = kube.get_node_info().await?;
                    println!("{name} {ip}");
                }
            }
        }
        Command::Config => print!("{config}"),
    }

    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn ConfigProvider>> {
    let registry = ProviderRegistry::with_defaults();
    registry
        .build(&config.provider)
        .with_context(|| format!("couldn't create '{}' provider", config.provider.backend))
}
