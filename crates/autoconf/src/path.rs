//! Namespace paths for hierarchical stores.
//!
//! A [`NamespacePath`] is an ordered list of segments addressing one node
//! in the remote tree. Rendering always produces an absolute, `/`-separated
//! string so it can be handed to any store client unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a node in the store, e.g. `/datadog/check_configs/redis`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct NamespacePath {
    segments: Vec<String>,
}

impl NamespacePath {
    /// The root of the namespace (`/`).
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a slash-separated path. Empty and `.` segments are dropped and
    /// `..` pops the previous segment, so `a//b/./c/../d` becomes `/a/b/d`.
    pub fn parse(raw: &str) -> Self {
        let mut segments: Vec<String> = Vec::new();
        for part in raw.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other.to_string()),
            }
        }
        Self { segments }
    }

    /// Append one child name. A name containing `/` is treated as a relative
    /// path and each of its segments is appended.
    pub fn join(&self, child: &str) -> Self {
        let mut joined = self.clone();
        for part in child.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    joined.segments.pop();
                }
                other => joined.segments.push(other.to_string()),
            }
        }
        joined
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl Default for NamespacePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for NamespacePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for NamespacePath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<NamespacePath> for String {
    fn from(path: NamespacePath) -> Self {
        path.to_string()
    }
}
