//! Template provider backed by a [`TemplateStore`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::ConfigProvider;
use crate::check::CheckConfig;
use crate::config::ProviderConfig;
use crate::error::DiscoveryError;
use crate::path::NamespacePath;
use crate::store::TemplateStore;
use crate::template::{
    FillPolicy, ParseOptions, TemplateLayout, build_configs, discover_template_roots, materialize,
};

/// Freshness of the provider's view of the store.
#[derive(Debug, Clone, Copy)]
struct Freshness {
    stale: bool,
    last_collected: Option<DateTime<Utc>>,
}

impl Default for Freshness {
    /// Nothing has been crawled yet.
    fn default() -> Self {
        Self {
            stale: true,
            last_collected: None,
        }
    }
}

/// Crawls a store for template roots and turns them into check configs.
pub struct TemplateProvider {
    backend: String,
    store: Arc<dyn TemplateStore>,
    root: NamespacePath,
    layout: TemplateLayout,
    parsing: ParseOptions,
    fill: FillPolicy,
    freshness: RwLock<Freshness>,
}

impl TemplateProvider {
    /// Create a stale provider crawling `root` with default conventions.
    pub fn new(
        backend: impl Into<String>,
        store: Arc<dyn TemplateStore>,
        root: impl Into<NamespacePath>,
    ) -> Self {
        Self {
            backend: backend.into(),
            store,
            root: root.into(),
            layout: TemplateLayout::default(),
            parsing: ParseOptions::default(),
            fill: FillPolicy::default(),
            freshness: RwLock::new(Freshness::default()),
        }
    }

    /// Create a provider from configuration over an already built store.
    pub fn from_config(config: &ProviderConfig, store: Arc<dyn TemplateStore>) -> Self {
        Self::new(config.backend.clone(), store, config.root())
            .with_layout(config.layout.clone())
            .with_parsing(config.parsing.clone())
            .with_fill(config.fill)
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

    pub fn root(&self) -> &NamespacePath {
        &self.root
    }

    /// When the last successful crawl finished.
    pub async fn last_collected(&self) -> Option<DateTime<Utc>> {
        self.freshness.read().await.last_collected
    }

    /// Configurations for one template root, or none if any step fails.
    async fn configs_for(&self, template_root: &NamespacePath) -> Vec<CheckConfig> {
        match materialize(self.store.as_ref(), template_root, &self.layout, &self.parsing).await {
            Ok(materialized) => build_configs(
                template_root,
                &materialized.check_names,
                &materialized.init_configs,
                &materialized.instances,
                self.fill,
            ),
            Err(error) => {
                warn!(path = %template_root, %error, "skipping template");
                Vec::new()
            }
        }
    }
}

impl fmt::Display for TemplateProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} configuration provider", self.backend)
    }
}

#[async_trait]
impl ConfigProvider for TemplateProvider {
    async fn collect(&self) -> Result<Vec<CheckConfig>, DiscoveryError> {
        let identifiers =
            discover_template_roots(self.store.as_ref(), &self.root, &self.layout)
                .await
                .inspect_err(|e| error!(provider = %self, error = %e, "crawl failed"))?;
        debug!(root = %self.root, identifiers = ?identifiers, "discovered template roots");

        let mut configs = Vec::new();
        for identifier in &identifiers {
            configs.extend(self.configs_for(identifier).await);
        }

        let mut freshness = self.freshness.write().await;
        freshness.stale = false;
        freshness.last_collected = Some(Utc::now());
        drop(freshness);

        info!(
            provider = %self,
            templates = identifiers.len(),
            configs = configs.len(),
            "collected check configurations"
        );
        Ok(configs)
    }

    async fn is_stale(&self) -> bool {
        self.freshness.read().await.stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn provider(store: Arc<MemoryStore>) -> TemplateProvider {
        TemplateProvider::new("memory", store, "/templates")
    }

    #[test]
    fn test_freshness_starts_stale() {
        let freshness = Freshness::default();
        assert!(freshness.stale);
        assert!(freshness.last_collected.is_none());
    }

    #[tokio::test]
    async fn test_identity_is_stable() {
        let provider = provider(Arc::new(MemoryStore::new()));
        assert_eq!(provider.to_string(), "memory configuration provider");
    }

    #[tokio::test]
    async fn test_empty_crawl_still_clears_staleness() {
        let store = Arc::new(MemoryStore::new());
        store.mkdir("/templates").await;
        let provider = provider(store);

        assert!(provider.is_stale().await);
        assert!(provider.last_collected().await.is_none());

        let configs = provider.collect().await.unwrap();
        assert!(configs.is_empty());
        assert!(!provider.is_stale().await);
        assert!(provider.last_collected().await.is_some());
    }

    #[tokio::test]
    async fn test_fatal_crawl_keeps_stale() {
        let store = Arc::new(MemoryStore::new());
        let provider = provider(store);

        assert!(provider.collect().await.is_err());
        assert!(provider.is_stale().await);
    }

    #[tokio::test]
    async fn test_fill_policy_applies() {
        let store = Arc::new(MemoryStore::from_leaves([
            ("/templates/web/check_names", "nginx,http_check"),
            ("/templates/web/init_configs", r#"[{"shared": true}]"#),
            ("/templates/web/instances", "[{}, {}]"),
        ]));
        let provider = provider(store).with_fill(FillPolicy::RepeatLast);

        let configs = provider.collect().await.unwrap();
        assert_eq!(configs.len(), 2);
        assert!(configs.iter().all(|c| c.init_config.contains_key("shared")));
    }
}
