//! Toxiproxy HTTP control-plane client.
//!
//! # Responsibilities
//! - Provision the cache proxy at startup (`POST /proxies`)
//! - Attach and detach latency toxics (`POST`/`DELETE /proxies/{name}/toxics`)
//!
//! # Design Decisions
//! - The HTTP client is async; the synchronous [`ToxicControl`] impl drives it
//!   with the runtime handle captured at construction
//! - Attaching over an existing toxic (409) updates its latency in place
//! - Detaching a toxic that is already gone (404) succeeds
//! - Any other non-2xx status is a failure; no retries

use reqwest::{Response, StatusCode};
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, info};
use url::Url;

use crate::control::ToxicControl;
use crate::fault::{FaultError, FaultResult};

#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    name: &'a str,
    listen: &'a str,
    upstream: &'a str,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct ToxicRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    stream: &'a str,
    attributes: LatencyAttributes,
}

#[derive(Debug, Serialize)]
struct LatencyAttributes {
    latency: u64,
}

#[derive(Debug, Serialize)]
struct ToxicUpdate {
    attributes: LatencyAttributes,
}

/// Client for the Toxiproxy API.
#[derive(Debug, Clone)]
pub struct ToxiproxyClient {
    http: reqwest::Client,
    base_url: Url,
    runtime: Handle,
}

impl ToxiproxyClient {
    /// Create a client for the API at `base_url`.
    ///
    /// `runtime` drives the blocking [`ToxicControl`] calls, which must be
    /// made from outside async context (e.g. `spawn_blocking`).
    pub fn new(base_url: &str, runtime: Handle) -> Result<Self, url::ParseError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            runtime,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> FaultResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FaultError::ExternalService(format!("Invalid control plane URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Create the named proxy. Fails if it already exists.
    pub async fn create_proxy(&self, name: &str, listen: &str, upstream: &str) -> FaultResult<()> {
        let url = self.endpoint(&["proxies"])?;
        let body = ProxyRequest {
            name,
            listen,
            upstream,
            enabled: true,
        };
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FaultError::ExternalService(format!("create proxy {}: {}", name, e)))?;
        check(response, "create proxy").await?;
        info!(proxy = name, listen, upstream, "Toxiproxy proxy created");
        Ok(())
    }

    /// Attach a latency toxic to every stream of `proxy`.
    ///
    /// A toxic left behind under the same name gets the new latency instead.
    pub async fn attach_latency(&self, proxy: &str, toxic: &str, latency_ms: u64) -> FaultResult<()> {
        let url = self.endpoint(&["proxies", proxy, "toxics"])?;
        let body = ToxicRequest {
            name: toxic,
            kind: "latency",
            stream: "all",
            attributes: LatencyAttributes {
                latency: latency_ms,
            },
        };
        debug!(%url, toxic, latency_ms, "Attaching latency toxic");
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FaultError::ExternalService(format!("attach toxic {}: {}", toxic, e)))?;
        if response.status() == StatusCode::CONFLICT {
            debug!(proxy, toxic, "Toxic already attached; updating latency");
            return self.update_latency(proxy, toxic, latency_ms).await;
        }
        check(response, "attach toxic").await
    }

    /// Set the latency of an attached toxic.
    pub async fn update_latency(&self, proxy: &str, toxic: &str, latency_ms: u64) -> FaultResult<()> {
        let url = self.endpoint(&["proxies", proxy, "toxics", toxic])?;
        let body = ToxicUpdate {
            attributes: LatencyAttributes {
                latency: latency_ms,
            },
        };
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FaultError::ExternalService(format!("update toxic {}: {}", toxic, e)))?;
        check(response, "update toxic").await
    }

    /// Detach `toxic` from `proxy`. A toxic that is not there counts as detached.
    pub async fn detach_toxic(&self, proxy: &str, toxic: &str) -> FaultResult<()> {
        let url = self.endpoint(&["proxies", proxy, "toxics", toxic])?;
        debug!(%url, toxic, "Detaching toxic");
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| FaultError::ExternalService(format!("detach toxic {}: {}", toxic, e)))?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(proxy, toxic, "Toxic already detached");
            return Ok(());
        }
        check(response, "detach toxic").await
    }
}

impl ToxicControl for ToxiproxyClient {
    fn add_latency_toxic(&self, proxy: &str, toxic: &str, latency_ms: u64) -> FaultResult<()> {
        self.runtime.block_on(self.attach_latency(proxy, toxic, latency_ms))
    }

    fn remove_toxic(&self, proxy: &str, toxic: &str) -> FaultResult<()> {
        self.runtime.block_on(self.detach_toxic(proxy, toxic))
    }
}

async fn check(response: Response, operation: &str) -> FaultResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(FaultError::ExternalService(format!(
        "{} returned {}: {}",
        operation,
        status,
        body.trim()
    )))
}

/// Whether a create-proxy failure only means the proxy is already there.
pub fn is_conflict(err: &FaultError) -> bool {
    matches!(err, FaultError::ExternalService(msg) if msg.contains(StatusCode::CONFLICT.as_str()))
}
