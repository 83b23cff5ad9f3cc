//! Zipping parsed leaves into check configurations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::check::{CheckConfig, ConfigData};
use crate::path::NamespacePath;

/// What to use when a check has no init config or instance at its index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Use an empty document `{}`
    #[default]
    Empty,
    /// Reuse the last document of the list, or `{}` if the list is empty
    RepeatLast,
}

impl FillPolicy {
    fn pick(self, list: &[ConfigData], index: usize) -> ConfigData {
        if let Some(document) = list.get(index) {
            return document.clone();
        }
        match self {
            FillPolicy::Empty => ConfigData::new(),
            FillPolicy::RepeatLast => list.last().cloned().unwrap_or_default(),
        }
    }
}

/// Correlate the three parallel lists of one template root by position.
///
/// Produces one configuration per check name. Init configs and instances
/// past the number of check names are ignored.
pub fn build_configs(
    source: &NamespacePath,
    check_names: &[String],
    init_configs: &[ConfigData],
    instances: &[ConfigData],
    fill: FillPolicy,
) -> Vec<CheckConfig> {
    if init_configs.len() > check_names.len() || instances.len() > check_names.len() {
        debug!(
            path = %source,
            checks = check_names.len(),
            init_configs = init_configs.len(),
            instances = instances.len(),
            "ignoring documents without a matching check name"
        );
    }

    check_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            CheckConfig::new(
                source.clone(),
                name.clone(),
                fill.pick(init_configs, i),
                fill.pick(instances, i),
            )
        })
        .collect()
}
