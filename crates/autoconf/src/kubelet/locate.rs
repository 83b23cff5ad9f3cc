//! Finding a kubelet endpoint that answers.
//!
//! The read-only HTTP port is tried first. If it does not answer the
//! health probe, the authenticated HTTPS port is tried with the service
//! account CA bundle and bearer token.

use std::time::Duration;

use reqwest::{Certificate, Client, RequestBuilder};
use tracing::debug;
use url::Url;

use super::KubeletConfig;
use crate::error::KubeletError;

/// Path probed to decide whether an endpoint is usable.
pub const KUBELET_HEALTH_PATH: &str = "healthz";

/// A kubelet endpoint that answered its health probe.
#[derive(Debug, Clone)]
pub struct Located {
    pub base_url: Url,
    pub client: Client,
    pub token: Option<String>,
}

impl Located {
    /// Absolute URL for `endpoint` on this kubelet.
    pub fn url(&self, endpoint: &str) -> Result<Url, KubeletError> {
        self.base_url
            .join(endpoint)
            .map_err(|source| KubeletError::Url {
                url: endpoint.to_string(),
                source,
            })
    }
}

/// Try HTTP, then HTTPS with token authentication.
pub async fn locate_kubelet(config: &KubeletConfig) -> Result<Located, KubeletError> {
    let host = config.resolve_host()?;

    let url = base_url("http", &host, config.http_port)?;
    let client = build_client(config, false).await;
    if check_kubelet_health(&url, &client, None).await {
        return Ok(Located {
            base_url: url,
            client,
            token: None,
        });
    }
    debug!(%host, "couldn't query kubelet over HTTP, assuming it's not in no_auth mode");

    let url = base_url("https", &host, config.https_port)?;
    let client = build_client(config, true).await;
    let token = read_token(config).await;
    if check_kubelet_health(&url, &client, token.as_deref()).await {
        return Ok(Located {
            base_url: url,
            client,
            token,
        });
    }

    Err(KubeletError::Unreachable { host })
}

fn base_url(scheme: &str, host: &str, port: u16) -> Result<Url, KubeletError> {
    let raw = format!("{scheme}://{host}:{port}/");
    Url::parse(&raw).map_err(|source| KubeletError::Url { url: raw, source })
}

async fn check_kubelet_health(base: &Url, client: &Client, token: Option<&str>) -> bool {
    let Ok(url) = base.join(KUBELET_HEALTH_PATH) else {
        return false;
    };
    match perform_kubelet_query(&url, client, token).await {
        Ok(_) => true,
        Err(error) => {
            debug!(%url, %error, "kubelet health probe failed");
            false
        }
    }
}

/// Build a client. With `verify_tls` the configured CA bundle is trusted;
/// if it cannot be loaded the platform roots are used instead.
async fn build_client(config: &KubeletConfig, verify_tls: bool) -> Client {
    // The kubelet is node-local; never route it through a proxy.
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .no_proxy();

    if verify_tls {
        match tokio::fs::read(&config.ca_cert_path).await {
            Ok(pem) => match Certificate::from_pem(&pem) {
                Ok(cert) => builder = builder.add_root_certificate(cert),
                Err(error) => debug!(path = %config.ca_cert_path, %error, "invalid CA cert"),
            },
            Err(error) => {
                debug!(path = %config.ca_cert_path, %error, "couldn't load CA cert");
            }
        }
    }

    builder.build().unwrap_or_else(|error| {
        debug!(%error, "falling back to default HTTP client");
        Client::new()
    })
}

async fn read_token(config: &KubeletConfig) -> Option<String> {
    match tokio::fs::read_to_string(&config.token_path).await {
        Ok(token) => {
            let token = token.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
        Err(error) => {
            debug!(path = %config.token_path, %error, "couldn't read auth token");
            None
        }
    }
}

/// GET request for `url`. Only HTTPS requests carry the bearer token.
pub(crate) fn kubelet_request(
    client: &Client,
    url: &Url,
    token: Option<&str>,
) -> RequestBuilder {
    let request = client.get(url.clone());
    match token {
        Some(token) if url.scheme() == "https" => request.bearer_auth(token),
        _ => request,
    }
}

/// GET `url` and return the response body.
pub async fn perform_kubelet_query(
    url: &Url,
    client: &Client,
    token: Option<&str>,
) -> Result<Vec<u8>, KubeletError> {
    let response = kubelet_request(client, url, token)
        .send()
        .await
        .map_err(|source| KubeletError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(KubeletError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| KubeletError::Request {
            url: url.to_string(),
            source,
        })?;
    Ok(body.to_vec())
}
