//! In-memory store backend.
//!
//! Holds a tree of nodes keyed by rendered path. Children keep insertion
//! order, which makes it possible to exercise crawls whose order is not
//! lexical. Failures can be injected per path for partial-failure tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Leaf, NodeStat, TemplateStore};
use crate::error::StoreError;
use crate::path::NamespacePath;

#[derive(Debug, Clone, Default)]
struct Node {
    payload: Vec<u8>,
    version: i64,
    children: Vec<String>,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: HashMap<NamespacePath, Node>,
    failing_gets: HashSet<NamespacePath>,
    failing_lists: HashSet<NamespacePath>,
}

impl Tree {
    fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(NamespacePath::root(), Node::default());
        Self {
            nodes,
            ..Default::default()
        }
    }

    /// Create `path` and any missing ancestors, returning the node.
    fn ensure(&mut self, path: &NamespacePath) -> &mut Node {
        let mut current = NamespacePath::root();
        for segment in path.segments() {
            let child = current.join(segment);
            if !self.nodes.contains_key(&child) {
                self.nodes.insert(child.clone(), Node::default());
                if let Some(parent) = self.nodes.get_mut(&current) {
                    parent.children.push(segment.clone());
                }
            }
            current = child;
        }
        self.nodes.entry(current).or_default()
    }

    fn set(&mut self, path: &NamespacePath, payload: Vec<u8>) {
        let node = self.ensure(path);
        node.payload = payload;
        node.version += 1;
    }

    fn remove(&mut self, path: &NamespacePath) -> bool {
        if path.is_root() || !self.nodes.contains_key(path) {
            return false;
        }
        let prefix = path.clone();
        self.nodes.retain(|key, _| !key.segments().starts_with(prefix.segments()));
        if let (Some(parent), Some(name)) = (path.parent(), path.name()) {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.retain(|child| child != name);
            }
        }
        true
    }
}

/// Thread-safe in-memory tree implementing [`TemplateStore`].
#[derive(Debug)]
pub struct MemoryStore {
    tree: RwLock<Tree>,
    get_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tree: RwLock::new(Tree::new()),
            get_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Build a store from `(path, payload)` pairs, in order.
    pub fn from_leaves<I, P, B>(leaves: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<NamespacePath>,
        B: Into<Vec<u8>>,
    {
        let mut tree = Tree::new();
        for (path, payload) in leaves {
            tree.set(&path.into(), payload.into());
        }
        Self {
            tree: RwLock::new(tree),
            ..Self::new()
        }
    }

    /// Set the payload of `path`, creating it and its ancestors as needed.
    pub async fn insert(&self, path: impl Into<NamespacePath>, payload: impl Into<Vec<u8>>) {
        self.tree.write().await.set(&path.into(), payload.into());
    }

    /// Create an interior node with no payload.
    pub async fn mkdir(&self, path: impl Into<NamespacePath>) {
        self.tree.write().await.ensure(&path.into());
    }

    /// Remove `path` and its whole sub-tree. Returns false if it was absent.
    pub async fn remove(&self, path: impl Into<NamespacePath>) -> bool {
        self.tree.write().await.remove(&path.into())
    }

    /// Make every subsequent `get` of `path` fail as unavailable.
    pub async fn fail_get(&self, path: impl Into<NamespacePath>) {
        self.tree.write().await.failing_gets.insert(path.into());
    }

    /// Make every subsequent `list_children` of `path` fail as unavailable.
    pub async fn fail_list(&self, path: impl Into<NamespacePath>) {
        self.tree.write().await.failing_lists.insert(path.into());
    }

    /// Clear all injected failures.
    pub async fn heal(&self) {
        let mut tree = self.tree.write().await;
        tree.failing_gets.clear();
        tree.failing_lists.clear();
    }

    /// Number of `get` round-trips served so far.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::Relaxed)
    }

    /// Number of `list_children` round-trips served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn get(&self, path: &NamespacePath) -> Result<Leaf, StoreError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        let tree = self.tree.read().await;
        if tree.failing_gets.contains(path) {
            return Err(StoreError::Unavailable {
                path: path.clone(),
                reason: "injected get failure".to_string(),
            });
        }
        let node = tree
            .nodes
            .get(path)
            .ok_or_else(|| StoreError::NotFound { path: path.clone() })?;
        let stat = NodeStat {
            version: node.version,
        };
        Ok(Leaf::new(node.payload.clone(), stat))
    }

    async fn list_children(&self, path: &NamespacePath) -> Result<Vec<String>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let tree = self.tree.read().await;
        if tree.failing_lists.contains(path) {
            return Err(StoreError::Unavailable {
                path: path.clone(),
                reason: "injected list failure".to_string(),
            });
        }
        tree.nodes
            .get(path)
            .map(|node| node.children.clone())
            .ok_or_else(|| StoreError::NotFound { path: path.clone() })
    }
}
