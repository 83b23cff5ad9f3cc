//! Provider registry.
//!
//! Backends register a factory under a name; the service picks one by the
//! `backend` key of its configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::{ConfigProvider, TemplateProvider};
use crate::config::ProviderConfig;
use crate::error::RegistryError;
use crate::store::FsStore;

/// Builds a provider from its configuration.
pub type ProviderFactory = fn(&ProviderConfig) -> Result<Arc<dyn ConfigProvider>, RegistryError>;

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("filesystem", filesystem_provider);
        registry
    }

    /// Register `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: ProviderFactory) {
        let name = name.into();
        debug!(backend = %name, "registering configuration provider");
        self.factories.insert(name, factory);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build the provider selected by `config.backend`.
    pub fn build(&self, config: &ProviderConfig) -> Result<Arc<dyn ConfigProvider>, RegistryError> {
        let factory = self
            .factories
            .get(&config.backend)
            .ok_or_else(|| RegistryError::UnknownProvider {
                name: config.backend.clone(),
            })?;
        factory(config)
    }
}

/// Directory-backed provider. The first configured location that is an
/// existing directory is used.
fn filesystem_provider(config: &ProviderConfig) -> Result<Arc<dyn ConfigProvider>, RegistryError> {
    let urls = config.urls();
    let base = urls
        .iter()
        .find(|url| Path::new(url).is_dir())
        .ok_or_else(|| RegistryError::Build {
            name: config.backend.clone(),
            reason: format!("none of {urls:?} is a readable directory"),
        })?;

    let store = Arc::new(FsStore::new(*base));
    Ok(Arc::new(TemplateProvider::from_config(config, store)))
}
