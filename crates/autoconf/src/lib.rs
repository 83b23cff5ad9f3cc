//! Autoconf - check template discovery for monitoring agents
//!
//! This library crawls a hierarchical coordination store for check
//! templates and materializes them into typed check configurations.
//!
//! A template is a directory directly under the crawl root holding three
//! leaves: `check_names`, `init_configs` and `instances`. Each check name
//! becomes one [`CheckConfig`], correlated by position with the init
//! config and instance documents of the same template.

pub mod check;
pub mod config;
pub mod error;
pub mod kubelet;
pub mod path;
pub mod provider;
pub mod store;
pub mod template;

// Re-export main types
pub use check::{CheckConfig, ConfigData};
pub use config::ProviderConfig;
pub use error::{DiscoveryError, KubeletError, MaterializeError, RegistryError, StoreError};
pub use path::NamespacePath;
pub use provider::{ConfigProvider, ProviderRegistry, TemplateProvider};
pub use store::{FsStore, Leaf, MemoryStore, NodeStat, TemplateStore};
pub use template::{FillPolicy, ParseOptions, TemplateLayout};
