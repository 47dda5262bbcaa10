//! Interface-wide network latency fault.
//!
//! # Responsibilities
//! - Reset any existing root qdisc, then attach a netem delay rule
//! - Remove the rule on stop, resetting state even if removal fails
//!
//! # Design Decisions
//! - Affects all traffic on the interface, not a single connection
//! - Requires CAP_NET_ADMIN; missing privilege surfaces as a command error

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::LatencyFaultConfig;
use crate::control::TrafficControl;
use crate::fault::state::StateCell;
use crate::fault::{Fault, FaultName, FaultParams, FaultResult};

/// Delay applied when a non-positive value is requested.
pub const FLOOR_DELAY_MS: u64 = 100;

/// Adds a netem delay to a network interface.
pub struct NetworkLatencyFault {
    state: StateCell<u64>,
    tc: Arc<dyn TrafficControl>,
    interface: String,
    default_delay_ms: u64,
    max_delay_ms: u64,
}

impl NetworkLatencyFault {
    pub fn new(config: &LatencyFaultConfig, tc: Arc<dyn TrafficControl>) -> Self {
        Self {
            state: StateCell::new(),
            tc,
            interface: config.interface.clone(),
            default_delay_ms: config.default_delay_ms,
            max_delay_ms: config.max_delay_ms.max(1),
        }
    }

    /// Delay currently applied, while active.
    pub fn current_delay_ms(&self) -> Option<u64> {
        self.state.active_value()
    }

    fn resolve_delay(&self, params: &FaultParams) -> u64 {
        let requested = params.duration_ms.unwrap_or(self.default_delay_ms as i64);
        let delay = if requested < 1 {
            FLOOR_DELAY_MS
        } else {
            requested as u64
        };
        delay.min(self.max_delay_ms)
    }

    fn apply(&self, delay_ms: u64) -> FaultResult<()> {
        self.tc.clear(&self.interface)?;
        self.tc.add_delay(&self.interface, delay_ms)
    }
}

impl Fault for NetworkLatencyFault {
    fn name(&self) -> FaultName {
        FaultName::Latency
    }

    fn start(&self, params: FaultParams) -> FaultResult<()> {
        if !self.state.begin_start() {
            info!(interface = %self.interface, "Latency fault already active");
            return Ok(());
        }

        let delay_ms = self.resolve_delay(&params);
        match self.apply(delay_ms) {
            Ok(()) => {
                self.state.commit_start(delay_ms);
                info!(interface = %self.interface, delay_ms, "Latency fault started");
                Ok(())
            }
            Err(e) => {
                self.state.abort_start();
                Err(e)
            }
        }
    }

    fn stop(&self) -> FaultResult<()> {
        let Some(delay_ms) = self.state.begin_stop() else {
            return Ok(());
        };

        if let Err(e) = self.tc.clear(&self.interface) {
            warn!(interface = %self.interface, error = %e, "Failed to clear tc rule; marking latency fault inactive anyway");
        }
        self.state.finish_stop();
        info!(interface = %self.interface, delay_ms, "Latency fault stopped");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
