//! Configuration providers.
//!
//! A provider is polled by the agent's scheduler. Each `collect` runs one
//! full crawl and returns every check configuration it found; `is_stale`
//! tells the scheduler whether a crawl has completed yet.

pub mod registry;
pub mod template;

use std::fmt;

use async_trait::async_trait;

use crate::check::CheckConfig;
use crate::error::DiscoveryError;

pub use registry::{ProviderFactory, ProviderRegistry};
pub use template::TemplateProvider;

/// Source of check configurations. `Display` gives a stable identity for
/// logs and registration.
#[async_trait]
pub trait ConfigProvider: fmt::Display + Send + Sync {
    /// Run one crawl. Fails only when the discovery root is unavailable.
    async fn collect(&self) -> Result<Vec<CheckConfig>, DiscoveryError>;

    /// True until a crawl has completed.
    async fn is_stale(&self) -> bool;
}
