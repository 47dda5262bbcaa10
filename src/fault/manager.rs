//! Fault registry and dispatch.
//!
//! # Responsibilities
//! - Hold the registered faults in registration order
//! - Dispatch start/stop/status requests by name
//! - Log and discard every fault error (fire-and-forget)
//!
//! # Design Decisions
//! - The registry is fixed once built; there is no register-after-start
//! - Unknown names are a silent no-op
//! - The registry lock covers lookups and status snapshots; start and stop run
//!   after it is released
//! - Lock order is registry then fault state; faults never reach back into the registry

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::fault::{Fault, FaultError, FaultName, FaultParams, FaultResult, FaultStatus};
use crate::observability::metrics;

/// Collects faults before the registry is frozen.
#[derive(Default)]
pub struct FaultManagerBuilder {
    faults: Vec<Arc<dyn Fault>>,
}

impl FaultManagerBuilder {
    /// Add a fault. A second fault with the same name replaces the first in place.
    pub fn register(mut self, fault: Arc<dyn Fault>) -> Self {
        let name = fault.name();
        if let Some(slot) = self.faults.iter_mut().find(|f| f.name() == name) {
            warn!(fault = %name, "Fault registered twice; replacing earlier registration");
            *slot = fault;
        } else {
            self.faults.push(fault);
        }
        self
    }

    pub fn build(self) -> FaultManager {
        for fault in &self.faults {
            metrics::record_fault_state(fault.name(), fault.is_active());
        }
        FaultManager {
            faults: Mutex::new(self.faults),
        }
    }
}

/// Registry of faults keyed by name.
pub struct FaultManager {
    faults: Mutex<Vec<Arc<dyn Fault>>>,
}

impl FaultManager {
    pub fn builder() -> FaultManagerBuilder {
        FaultManagerBuilder::default()
    }

    fn registry(&self) -> MutexGuard<'_, Vec<Arc<dyn Fault>>> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find a registered fault by name.
    pub fn lookup(&self, name: &str) -> FaultResult<Arc<dyn Fault>> {
        let wanted: FaultName = name.parse()?;
        self.registry()
            .iter()
            .find(|f| f.name() == wanted)
            .cloned()
            .ok_or_else(|| FaultError::UnknownFault(name.to_string()))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<FaultName> {
        self.registry().iter().map(|f| f.name()).collect()
    }

    /// Start the named fault. Unknown names and failures are not reported.
    pub fn start_fault(&self, name: &str, params: FaultParams) {
        let fault = match self.lookup(name) {
            Ok(fault) => fault,
            Err(_) => {
                debug!(fault = name, "Ignoring start for unknown fault");
                return;
            }
        };

        metrics::record_fault_transition(fault.name(), "start");
        if let Err(e) = fault.start(params) {
            error!(fault = %fault.name(), kind = e.kind(), error = %e, "Failed to start fault");
            metrics::record_fault_error(fault.name(), e.kind());
        }
        metrics::record_fault_state(fault.name(), fault.is_active());
    }

    /// Stop the named fault. Unknown names and failures are not reported.
    pub fn stop_fault(&self, name: &str) {
        match self.lookup(name) {
            Ok(fault) => Self::stop(&fault),
            Err(_) => debug!(fault = name, "Ignoring stop for unknown fault"),
        }
    }

    fn stop(fault: &Arc<dyn Fault>) {
        metrics::record_fault_transition(fault.name(), "stop");
        if let Err(e) = fault.stop() {
            error!(fault = %fault.name(), kind = e.kind(), error = %e, "Failed to stop fault");
            metrics::record_fault_error(fault.name(), e.kind());
        }
        metrics::record_fault_state(fault.name(), fault.is_active());
    }

    /// Stop every fault that is active at the time of the call.
    ///
    /// Faults activated concurrently after the snapshot are not stopped.
    pub fn stop_all_faults(&self) {
        let active: Vec<Arc<dyn Fault>> = self
            .registry()
            .iter()
            .filter(|f| f.is_active())
            .cloned()
            .collect();

        for fault in &active {
            Self::stop(fault);
        }
        if !active.is_empty() {
            debug!(stopped = active.len(), "Stopped all active faults");
        }
    }

    /// One entry per registered fault.
    pub fn status(&self) -> BTreeMap<FaultName, FaultStatus> {
        self.registry()
            .iter()
            .map(|f| {
                let name = f.name();
                (
                    name,
                    FaultStatus {
                        active: f.is_active(),
                        name,
                    },
                )
            })
            .collect()
    }

    /// Names of the active faults, in registration order.
    pub fn list_active(&self) -> Vec<FaultName> {
        self.registry()
            .iter()
            .filter(|f| f.is_active())
            .map(|f| f.name())
            .collect()
    }
}
