//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the control-plane clients from configuration
//! - Provision the cache proxy when asked to
//! - Register the faults in a fixed order
//!
//! # Design Decisions
//! - Fail fast on configuration errors; proxy provisioning failures are only logged
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::SandboxConfig;
use crate::control::toxiproxy::is_conflict;
use crate::control::{Tc, ToxicControl, ToxiproxyClient, TrafficControl};
use crate::fault::{CacheLatencyFault, CpuBurnFault, FaultManager, NetworkLatencyFault};

/// Build the Toxiproxy client for the configured API.
pub fn toxiproxy_client(config: &SandboxConfig, runtime: Handle) -> Result<ToxiproxyClient, url::ParseError> {
    ToxiproxyClient::new(&config.toxiproxy.api_url, runtime)
}

/// Register cpu, latency and redis_latency against the given control planes.
pub fn build_fault_manager(
    config: &SandboxConfig,
    tc: Arc<dyn TrafficControl>,
    toxics: Arc<dyn ToxicControl>,
) -> FaultManager {
    FaultManager::builder()
        .register(Arc::new(CpuBurnFault::new(&config.faults.cpu)))
        .register(Arc::new(NetworkLatencyFault::new(&config.faults.latency, tc)))
        .register(Arc::new(CacheLatencyFault::new(&config.faults.redis_latency, toxics)))
        .build()
}

/// Build the fault manager against the real `tc` binary and Toxiproxy API.
pub fn build_default_fault_manager(config: &SandboxConfig, client: ToxiproxyClient) -> FaultManager {
    let tc = Tc::new(config.faults.latency.tc_binary.clone());
    build_fault_manager(config, Arc::new(tc), Arc::new(client))
}

/// Create the cache proxy if provisioning is enabled. Never fails startup.
pub async fn provision_proxy(config: &SandboxConfig, client: &ToxiproxyClient) {
    if !config.toxiproxy.provision {
        return;
    }

    let proxy = &config.faults.redis_latency.proxy_name;
    match client
        .create_proxy(proxy, &config.toxiproxy.listen, &config.toxiproxy.upstream)
        .await
    {
        Ok(()) => tracing::info!(
            proxy = %proxy,
            listen = %config.toxiproxy.listen,
            upstream = %config.toxiproxy.upstream,
            "Provisioned cache proxy"
        ),
        Err(e) if is_conflict(&e) => tracing::info!(proxy = %proxy, "Cache proxy already exists"),
        Err(e) => tracing::warn!(proxy = %proxy, error = %e, "Failed to provision cache proxy"),
    }
}
