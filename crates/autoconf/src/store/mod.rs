//! Store accessors.
//!
//! The crawl only ever needs two primitives from a coordination store:
//! fetch the payload of a node and list the names of its children.
//! [`TemplateStore`] captures that pair so the discovery algorithm runs the
//! same against a live store client, a directory on disk, or an in-memory
//! tree in tests.

pub mod fs;
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::path::NamespacePath;

pub use fs::FsStore;
pub use memory::MemoryStore;

/// Store-internal version metadata. Passed through, never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStat {
    pub version: i64,
}

/// Raw payload of one node together with its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaf {
    pub payload: Vec<u8>,
    pub stat: NodeStat,
}

impl Leaf {
    pub fn new(payload: impl Into<Vec<u8>>, stat: NodeStat) -> Self {
        Self {
            payload: payload.into(),
            stat,
        }
    }
}

/// Read access to a hierarchical namespace.
///
/// Implementations must be safe for concurrent use: several crawls may run
/// against the same store at once.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetch the payload stored at `path`.
    async fn get(&self, path: &NamespacePath) -> Result<Leaf, StoreError>;

    /// List child names of `path` in store-defined order.
    async fn list_children(&self, path: &NamespacePath) -> Result<Vec<String>, StoreError>;
}

