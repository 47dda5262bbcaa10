//! Cache-path latency fault.
//!
//! Attaches a latency toxic to the proxy that sits in front of the cache.
//! The proxy itself is provisioned at startup; this fault only adds and
//! removes its toxic.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::CacheLatencyFaultConfig;
use crate::control::ToxicControl;
use crate::fault::state::StateCell;
use crate::fault::{Fault, FaultName, FaultParams, FaultResult};

/// Adds latency to every call routed through the cache proxy.
pub struct CacheLatencyFault {
    state: StateCell<u64>,
    control: Arc<dyn ToxicControl>,
    proxy: String,
    toxic: String,
    default_delay_ms: u64,
    max_delay_ms: u64,
}

impl CacheLatencyFault {
    pub fn new(config: &CacheLatencyFaultConfig, control: Arc<dyn ToxicControl>) -> Self {
        Self {
            state: StateCell::new(),
            control,
            proxy: config.proxy_name.clone(),
            toxic: config.toxic_name.clone(),
            default_delay_ms: config.default_delay_ms,
            max_delay_ms: config.max_delay_ms.max(1),
        }
    }

    /// Latency currently injected, while active.
    pub fn current_delay_ms(&self) -> Option<u64> {
        self.state.active_value()
    }
}

impl Fault for CacheLatencyFault {
    fn name(&self) -> FaultName {
        FaultName::RedisLatency
    }

    fn start(&self, params: FaultParams) -> FaultResult<()> {
        if !self.state.begin_start() {
            info!(proxy = %self.proxy, "Cache latency fault already active");
            return Ok(());
        }

        let latency_ms = params.duration_or(self.default_delay_ms).min(self.max_delay_ms);
        match self.control.add_latency_toxic(&self.proxy, &self.toxic, latency_ms) {
            Ok(()) => {
                self.state.commit_start(latency_ms);
                info!(proxy = %self.proxy, toxic = %self.toxic, latency_ms, "Cache latency fault started");
                Ok(())
            }
            Err(e) => {
                self.state.abort_start();
                Err(e)
            }
        }
    }

    fn stop(&self) -> FaultResult<()> {
        if self.state.begin_stop().is_none() {
            return Ok(());
        }

        if let Err(e) = self.control.remove_toxic(&self.proxy, &self.toxic) {
            warn!(proxy = %self.proxy, toxic = %self.toxic, error = %e, "Failed to remove toxic; marking cache latency fault inactive anyway");
        }
        self.state.finish_stop();
        info!(proxy = %self.proxy, "Cache latency fault stopped");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
