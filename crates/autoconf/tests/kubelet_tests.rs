//! Kubelet locator tests against a local HTTP responder

use std::time::Duration;

use autoconf::KubeletError;
use autoconf::kubelet::{KubeUtil, KubeletConfig, locate_kubelet};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const PODS: &str = r#"{
    "items": [
        {
            "metadata": {"name": "agent", "namespace": "default"},
            "spec": {"hostNetwork": true, "nodeName": "node-a"},
            "status": {"hostIP": "10.0.0.1", "containerStatuses": [{"containerID": "docker://agent"}]}
        },
        {
            "metadata": {"name": "redis-0", "namespace": "default"},
            "spec": {"hostNetwork": false, "nodeName": "node-a"},
            "status": {"hostIP": "10.0.0.1", "containerStatuses": [{"containerID": "docker://redis"}]}
        }
    ]
}"#;

/// Serve `/healthz` and `/pods` over plain HTTP; returns the bound port.
async fn spawn_kubelet() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                loop {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => read += n,
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&buf[..read]);
                let (status, body) = if request.starts_with("GET /healthz") {
                    ("200 OK", "ok")
                } else if request.starts_with("GET /pods") {
                    ("200 OK", PODS)
                } else {
                    ("404 Not Found", "")
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    port
}

/// A port nothing is listening on.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

fn config(http_port: u16, https_port: u16) -> KubeletConfig {
    KubeletConfig {
        timeout_secs: 2,
        ca_cert_path: "/nonexistent/ca.crt".to_string(),
        token_path: "/nonexistent/token".to_string(),
        ..KubeletConfig::default()
    }
    .with_host("127.0.0.1")
    .with_ports(http_port, https_port)
}

#[tokio::test]
async fn test_locates_plain_http_kubelet() {
    let port = spawn_kubelet().await;
    let https_port = closed_port().await;

    let located = locate_kubelet(&config(port, https_port)).await.unwrap();
    assert_eq!(located.base_url.scheme(), "http");
    assert_eq!(located.base_url.port(), Some(port));
    assert!(located.token.is_none());
}

#[tokio::test]
async fn test_unreachable_kubelet() {
    let http_port = closed_port().await;
    let https_port = closed_port().await;

    let err = locate_kubelet(&config(http_port, https_port)).await.unwrap_err();
    assert!(matches!(err, KubeletError::Unreachable { .. }));
}

#[tokio::test]
async fn test_pod_queries() {
    let port = spawn_kubelet().await;
    let https_port = closed_port().await;
    let kube = KubeUtil::new(config(port, https_port));

    let pods = kube.get_local_pod_list().await.unwrap();
    assert_eq!(pods.len(), 2);

    let (ip, name) = kube.get_node_info().await.unwrap();
    assert_eq!(ip, "10.0.0.1");
    assert_eq!(name, "node-a");

    let pod = kube.get_pod_for_container_id("docker://redis").await.unwrap();
    assert_eq!(pod.metadata.name, "redis-0");
    assert!(matches!(
        kube.get_pod_for_container_id("docker://missing").await,
        Err(KubeletError::ContainerNotFound(_))
    ));
}

#[tokio::test]
async fn test_kubeutil_gives_up_after_retry_budget() {
    let http_port = closed_port().await;
    let https_port = closed_port().await;
    let kube = KubeUtil::new(config(http_port, https_port).with_retry(1, Duration::ZERO));

    assert!(matches!(kube.kubelet().await, Err(KubeletError::Unreachable { .. })));
    assert!(matches!(kube.kubelet().await, Err(KubeletError::PermanentFail { .. })));
}
