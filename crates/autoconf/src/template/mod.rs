//! Check template discovery.
//!
//! A template root is a directory holding three leaves: the check names,
//! their init configs, and their instances. Discovery happens in stages:
//!
//! 1. [`crawler`] lists the crawl root and keeps children that pass
//!    [`validator`].
//! 2. [`materializer`] fetches and parses the three leaves of one root.
//! 3. [`builder`] zips the parsed lists into [`crate::CheckConfig`]s.

pub mod builder;
pub mod crawler;
pub mod materializer;
pub mod validator;

use serde::{Deserialize, Serialize};

pub use builder::{FillPolicy, build_configs};
pub use crawler::discover_template_roots;
pub use materializer::{
    Materialized, ParseOptions, materialize, parse_check_names, parse_config_data,
};
pub use validator::is_valid_template;

/// Default leaf holding the instance documents.
pub const INSTANCES_LEAF: &str = "instances";
/// Default leaf holding the check names.
pub const CHECK_NAMES_LEAF: &str = "check_names";
/// Default leaf holding the init config documents.
pub const INIT_CONFIGS_LEAF: &str = "init_configs";

/// Names of the three leaves every template root must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub check_names: String,
    pub init_configs: String,
    pub instances: String,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            check_names: CHECK_NAMES_LEAF.to_string(),
            init_configs: INIT_CONFIGS_LEAF.to_string(),
            instances: INSTANCES_LEAF.to_string(),
        }
    }
}

impl TemplateLayout {
    /// The required leaf names, in a fixed order.
    pub fn required(&self) -> [&str; 3] {
        [&self.instances, &self.check_names, &self.init_configs]
    }
}
