//! Directory-backed store.
//!
//! Maps the namespace onto a local directory: directories are interior
//! nodes and regular files are leaves. Useful for running discovery against
//! templates checked out from version control or mounted from a config map.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use tokio::fs;

use super::{Leaf, NodeStat, TemplateStore};
use crate::error::StoreError;
use crate::path::NamespacePath;

#[derive(Debug, Clone)]
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, path: &NamespacePath) -> PathBuf {
        path.segments()
            .iter()
            .fold(self.base.clone(), |acc, segment| acc.join(segment))
    }

    fn map_io(path: &NamespacePath, source: std::io::Error) -> StoreError {
        match source.kind() {
            ErrorKind::NotFound => StoreError::NotFound { path: path.clone() },
            _ => StoreError::Io {
                path: path.clone(),
                source,
            },
        }
    }
}

/// Modification time in seconds, standing in for a store version.
fn version_of(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}

#[async_trait]
impl TemplateStore for FsStore {
    async fn get(&self, path: &NamespacePath) -> Result<Leaf, StoreError> {
        let target = self.resolve(path);
        let metadata = fs::metadata(&target).await.map_err(|e| Self::map_io(path, e))?;
        let stat = NodeStat {
            version: version_of(&metadata),
        };

        // Interior nodes carry no data.
        if metadata.is_dir() {
            return Ok(Leaf::new(Vec::new(), stat));
        }

        let payload = fs::read(&target).await.map_err(|e| Self::map_io(path, e))?;
        Ok(Leaf::new(payload, stat))
    }

    async fn list_children(&self, path: &NamespacePath) -> Result<Vec<String>, StoreError> {
        let target = self.resolve(path);
        let metadata = fs::metadata(&target).await.map_err(|e| Self::map_io(path, e))?;
        if !metadata.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&target).await.map_err(|e| Self::map_io(path, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::map_io(path, e))? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::debug!(path = %path, name = ?raw, "skipping non UTF-8 entry");
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
