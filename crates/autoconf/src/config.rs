//! Configuration types for discovery providers.

use serde::{Deserialize, Serialize};

use crate::path::NamespacePath;
use crate::template::{FillPolicy, ParseOptions, TemplateLayout};

/// Default directory crawled for templates.
pub const DEFAULT_TEMPLATE_DIR: &str = "/datadog/check_configs";

/// Default registry key.
pub const DEFAULT_BACKEND: &str = "filesystem";

/// Settings for one template configuration provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Registry key of the store backend
    pub backend: String,

    /// Backend location. Several locations may be given separated by commas.
    pub template_url: String,

    /// Directory crawled for template roots
    pub template_dir: String,

    /// Leaf names every template must contain
    pub layout: TemplateLayout,

    /// Leaf payload conventions
    pub parsing: ParseOptions,

    /// Default for init configs and instances missing at a check's index
    pub fill: FillPolicy,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            template_url: ".".to_string(),
            template_dir: DEFAULT_TEMPLATE_DIR.to_string(),
            layout: TemplateLayout::default(),
            parsing: ParseOptions::default(),
            fill: FillPolicy::default(),
        }
    }
}

impl ProviderConfig {
    /// Start from the defaults for the given backend.
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            ..Default::default()
        }
    }

    pub fn with_template_url(mut self, url: impl Into<String>) -> Self {
        self.template_url = url.into();
        self
    }

    pub fn with_template_dir(mut self, dir: impl Into<String>) -> Self {
        self.template_dir = dir.into();
        self
    }

    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_parsing(mut self, parsing: ParseOptions) -> Self {
        self.parsing = parsing;
        self
    }

    pub fn with_fill(mut self, fill: FillPolicy) -> Self {
        self.fill = fill;
        self
    }

    /// Crawl root as a namespace path.
    pub fn root(&self) -> NamespacePath {
        NamespacePath::parse(&self.template_dir)
    }

    /// Backend locations, trimmed, in configured order.
    pub fn urls(&self) -> Vec<&str> {
        self.template_url
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .collect()
    }
}
