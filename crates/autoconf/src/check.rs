//! Materialized check configurations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::NamespacePath;

/// One structured document taken from an `init_configs` or `instances` leaf.
pub type ConfigData = Map<String, Value>;

/// A ready-to-schedule unit of monitoring configuration.
///
/// Built only by [`crate::template::build_configs`] and never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Template root the configuration was discovered under
    pub source: NamespacePath,

    /// Name of the check to instantiate
    pub name: String,

    /// Shared settings for every instance of the check
    pub init_config: ConfigData,

    /// Settings for this one instance
    pub instance: ConfigData,
}

impl CheckConfig {
    pub fn new(
        source: NamespacePath,
        name: impl Into<String>,
        init_config: ConfigData,
        instance: ConfigData,
    ) -> Self {
        Self {
            source,
            name: name.into(),
            init_config,
            instance,
        }
    }
}

impl fmt::Display for CheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} (init_config: {}, instance: {})",
            self.name,
            self.source,
            Value::Object(self.init_config.clone()),
            Value::Object(self.instance.clone())
        )
    }
}
