//! Collection runs driven by the service.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use autoconf::{CheckConfig, ConfigProvider};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::cli::OutputFormat;

/// Run a single crawl.
pub async fn collect_once(provider: &dyn ConfigProvider) -> Result<Vec<CheckConfig>> {
    provider.collect().await.with_context(|| format!("{provider} failed to collect"))
}

/// Render a result set for stdout.
pub fn render(configs: &[CheckConfig], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(configs).context("failed to serialize configurations")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for config in configs {
                writeln!(out, "{config}")?;
            }
            if configs.is_empty() {
                out.push_str("no check configurations found\n");
            }
            Ok(out)
        }
    }
}

/// Periodic collector holding the last good result set.
pub struct Watcher {
    provider: Arc<dyn ConfigProvider>,
    current: Vec<CheckConfig>,
}

impl Watcher {
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        Self {
            provider,
            current: Vec::new(),
        }
    }

    pub fn current(&self) -> &[CheckConfig] {
        &self.current
    }

    /// Collect once. A failed crawl keeps the previous result set. Returns
    /// true when the set changed.
    pub async fn tick(&mut self) -> bool {
        match self.provider.collect().await {
            Ok(configs) if configs != self.current => {
                info!(
                    provider = %self.provider,
                    before = self.current.len(),
                    after = configs.len(),
                    "check configurations changed"
                );
                self.current = configs;
                true
            }
            Ok(_) => false,
            Err(e) => {
                error!(provider = %self.provider, error = %e, "keeping previous configurations");
                false
            }
        }
    }

    /// Collect every `period`, forever.
    pub async fn run(&mut self, period: Duration) {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.tick().await;
        }
    }
}
