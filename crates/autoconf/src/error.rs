//! Error types for template discovery.

use std::io::Error as IoError;

use thiserror::Error;

use crate::path::NamespacePath;

/// Failure of a single store round-trip.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node '{path}' does not exist")]
    NotFound { path: NamespacePath },
    #[error("store unavailable while accessing '{path}': {reason}")]
    Unavailable { path: NamespacePath, reason: String },
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: NamespacePath,
        #[source]
        source: IoError,
    },
    #[error("node '{path}' holds an unusable payload: {reason}")]
    InvalidPayload { path: NamespacePath, reason: String },
}

/// Fatal-to-crawl failure: the discovery root itself could not be listed.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to list '{root}' to get template identifiers: {source}")]
    RootListing {
        root: NamespacePath,
        #[source]
        source: StoreError,
    },
}

/// Failure while turning one template root into typed values. Only the
/// template at `path` is skipped.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("couldn't get {leaf} from '{path}': {source}")]
    Fetch {
        leaf: &'static str,
        path: NamespacePath,
        #[source]
        source: StoreError,
    },
    #[error("failed to parse check names at '{path}': {reason}")]
    CheckNames { path: NamespacePath, reason: String },
    #[error("failed to parse {leaf} at '{path}': {source}")]
    ConfigData {
        leaf: &'static str,
        path: NamespacePath,
        #[source]
        source: serde_json::Error,
    },
    #[error("{leaf} at '{path}': entry {index} is {found}, expected an object")]
    NotADocument {
        leaf: &'static str,
        path: NamespacePath,
        index: usize,
        found: &'static str,
    },
    #[error("{leaf} at '{path}': top-level value is {found}, expected an array of objects")]
    UnexpectedShape {
        leaf: &'static str,
        path: NamespacePath,
        found: &'static str,
    },
}

/// Errors raised while building a provider from configuration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no configuration provider registered under '{name}'")]
    UnknownProvider { name: String },
    #[error("couldn't build '{name}' provider: {reason}")]
    Build { name: String, reason: String },
}

/// Errors from locating or querying the kubelet.
#[derive(Debug, Error)]
pub enum KubeletError {
    #[error("unable to determine the kubelet host, please set kubelet.host")]
    NoHost,
    #[error("invalid kubelet URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("could not find a method to connect to kubelet at {host}")]
    Unreachable { host: String },
    #[error("error executing request to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("error unmarshalling response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name}: retry later, next attempt in {remaining_secs}s")]
    RetryLater { name: String, remaining_secs: u64 },
    #[error("{name}: permanent failure after {attempts} attempts: {last_error}")]
    PermanentFail {
        name: String,
        attempts: u32,
        last_error: String,
    },
    #[error("container id is empty")]
    EmptyContainerId,
    #[error("container {0} not found in podlist")]
    ContainerNotFound(String),
    #[error("failed to get node info: no pod outside the host network")]
    NoNodeInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_leaf_and_path() {
        let path = NamespacePath::parse("/templates/redis/instances");
        let err = MaterializeError::Fetch {
            leaf: "instances",
            path: path.clone(),
            source: StoreError::NotFound { path },
        };
        let message = err.to_string();
        assert!(message.contains("instances"));
        assert!(message.contains("/templates/redis/instances"));
    }

    #[test]
    fn test_root_listing_error_mentions_root() {
        let root = NamespacePath::parse("/templates");
        let err = DiscoveryError::RootListing {
            root: root.clone(),
            source: StoreError::Unavailable {
                path: root,
                reason: "connection refused".into(),
            },
        };
        assert!(err.to_string().contains("/templates"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
