//! Kubelet discovery and queries.
//!
//! [`KubeUtil`] locates the node's kubelet lazily through a [`Retrier`],
//! then answers pod and node questions from the kubelet's `/pods` endpoint.

pub mod locate;
pub mod retry;
pub mod types;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::KubeletError;

pub use locate::{Located, locate_kubelet, perform_kubelet_query};
pub use retry::{Retrier, RetryStatus};
pub use types::{ContainerStatus, Pod, PodList, PodMetadata, PodSpec, PodStatus};

/// Where and how to reach the kubelet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeletConfig {
    /// Kubelet host; `$HOSTNAME` is used when unset
    pub host: Option<String>,
    pub http_port: u16,
    pub https_port: u16,
    pub ca_cert_path: String,
    pub token_path: String,
    /// Failed locate attempts before giving up for good
    pub retry_count: u32,
    pub retry_delay_secs: u64,
    pub timeout_secs: u64,
}

impl Default for KubeletConfig {
    fn default() -> Self {
        Self {
            host: None,
            http_port: 10255,
            https_port: 10250,
            ca_cert_path: "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt".to_string(),
            token_path: "/var/run/secrets/kubernetes.io/serviceaccount/token".to_string(),
            retry_count: 10,
            retry_delay_secs: 30,
            timeout_secs: 5,
        }
    }
}

impl KubeletConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_ports(mut self, http_port: u16, https_port: u16) -> Self {
        self.http_port = http_port;
        self.https_port = https_port;
        self
    }

    pub fn with_retry(mut self, retry_count: u32, retry_delay: Duration) -> Self {
        self.retry_count = retry_count;
        self.retry_delay_secs = retry_delay.as_secs();
        self
    }

    pub(crate) fn resolve_host(&self) -> Result<String, KubeletError> {
        self.host
            .clone()
            .filter(|host| !host.trim().is_empty())
            .or_else(|| {
                std::env::var("HOSTNAME")
                    .ok()
                    .filter(|host| !host.is_empty())
            })
            .ok_or(KubeletError::NoHost)
    }
}

/// Handle on the local kubelet.
#[derive(Debug)]
pub struct KubeUtil {
    config: KubeletConfig,
    retrier: Retrier,
    located: Mutex<Option<Located>>,
}

impl KubeUtil {
    pub fn new(config: KubeletConfig) -> Self {
        let retrier = Retrier::new(
            "kubeutil",
            config.retry_count,
            Duration::from_secs(config.retry_delay_secs),
        );
        Self {
            config,
            retrier,
            located: Mutex::new(None),
        }
    }

    /// The located endpoint, locating it first if needed.
    pub async fn kubelet(&self) -> Result<Located, KubeletError> {
        let mut located = self.located.lock().await;
        if let Some(found) = located.as_ref() {
            return Ok(found.clone());
        }

        let found = self
            .retrier
            .trigger(|| locate_kubelet(&self.config))
            .await
            .inspect_err(|error| debug!(%error, "kubelet init error"))?;
        debug!(url = %found.base_url, "located kubelet");
        *located = Some(found.clone());
        Ok(found)
    }

    /// Pods running on this node.
    pub async fn get_local_pod_list(&self) -> Result<Vec<Pod>, KubeletError> {
        let kubelet = self.kubelet().await?;
        let url = kubelet.url("pods")?;
        let body =
            perform_kubelet_query(&url, &kubelet.client, kubelet.token.as_deref()).await?;
        let list: PodList = serde_json::from_slice(&body)
            .map_err(|source| KubeletError::Decode {
                url: url.to_string(),
                source,
            })?;
        Ok(list.items)
    }

    /// Host IP and node name, taken from the first pod not on the host
    /// network.
    pub async fn get_node_info(&self) -> Result<(String, String), KubeletError> {
        let pods = self.get_local_pod_list().await?;
        pods.iter()
            .find(|pod| !pod.spec.host_network)
            .map(|pod| (pod.status.host_ip.clone(), pod.spec.node_name.clone()))
            .ok_or(KubeletError::NoNodeInfo)
    }

    /// The pod running the container with `container_id`.
    pub async fn get_pod_for_container_id(&self, container_id: &str) -> Result<Pod, KubeletError> {
        let pods = self.get_local_pod_list().await?;
        search_pod_for_container_id(&pods, container_id).cloned()
    }
}

/// Find the pod owning `container_id` in `pods`.
pub fn search_pod_for_container_id<'a>(
    pods: &'a [Pod],
    container_id: &str,
) -> Result<&'a Pod, KubeletError> {
    if container_id.is_empty() {
        return Err(KubeletError::EmptyContainerId);
    }
    pods.iter()
        .find(|pod| pod.status.container_statuses.iter().any(|c| c.id == container_id))
        .ok_or_else(|| KubeletError::ContainerNotFound(container_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(name: &str, containers: &[&str]) -> Pod {
        Pod {
            metadata: PodMetadata {
                name: name.to_string(),
                ..Default::default()
            },
            status: PodStatus {
                container_statuses: containers
                    .iter()
                    .map(|id| ContainerStatus {
                        id: id.to_string(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_search_pod_for_container_id() {
        let pods = vec![pod("a", &["docker://1"]), pod("b", &["docker://2", "docker://3"])];

        let found = search_pod_for_container_id(&pods, "docker://3").unwrap();
        assert_eq!(found.metadata.name, "b");

        assert!(matches!(
            search_pod_for_container_id(&pods, "docker://9"),
            Err(KubeletError::ContainerNotFound(_))
        ));
        assert!(matches!(
            search_pod_for_container_id(&pods, ""),
            Err(KubeletError::EmptyContainerId)
        ));
    }

    #[test]
    fn test_explicit_host_wins() {
        let config = KubeletConfig::default().with_host("node-a");
        assert_eq!(config.resolve_host().unwrap(), "node-a");
    }

    #[test]
    fn test_default_ports() {
        let config = KubeletConfig::default();
        assert_eq!(config.http_port, 10255);
        assert_eq!(config.https_port, 10250);
        assert_eq!(config.retry_count, 10);
    }
}
