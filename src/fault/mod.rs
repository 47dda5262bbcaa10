//! Fault-injection controller.
//!
//! # Data Flow
//! ```text
//! HTTP layer
//!     → manager.rs (lookup by name, log + swallow errors)
//!     → Fault::start / Fault::stop
//!         → cpu.rs           (burns the calling thread)
//!         → latency.rs       → control::tc        → `tc qdisc ...`
//!         → cache_latency.rs → control::toxiproxy → POST/DELETE toxics
//! ```
//!
//! # Design Decisions
//! - Faults are synchronous; async callers hop onto the blocking pool
//! - Each fault guards its own state; the registry never mutates after build
//! - Faults return typed errors, the manager is the only place they are dropped

pub mod cache_latency;
pub mod cpu;
pub mod error;
pub mod latency;
pub mod manager;
mod state;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use cache_latency::CacheLatencyFault;
pub use cpu::CpuBurnFault;
pub use error::{FaultError, FaultResult};
pub use latency::NetworkLatencyFault;
pub use manager::{FaultManager, FaultManagerBuilder};

/// Identifier of a registered fault kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultName {
    Cpu,
    Latency,
    RedisLatency,
}

impl FaultName {
    /// All known fault kinds, in registration order.
    pub const ALL: [FaultName; 3] = [FaultName::Cpu, FaultName::Latency, FaultName::RedisLatency];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultName::Cpu => "cpu",
            FaultName::Latency => "latency",
            FaultName::RedisLatency => "redis_latency",
        }
    }
}

impl fmt::Display for FaultName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultName {
    type Err = FaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaultName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| FaultError::UnknownFault(s.to_string()))
    }
}

/// Parameters for a fault activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FaultParams {
    /// Duration (CPU burn) or delay (latency faults) in milliseconds.
    /// `None` selects the configured default.
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

impl FaultParams {
    pub fn with_duration(duration_ms: i64) -> Self {
        Self {
            duration_ms: Some(duration_ms),
        }
    }

    /// Requested value if positive, otherwise `fallback`.
    pub(crate) fn duration_or(&self, fallback: u64) -> u64 {
        match self.duration_ms {
            Some(ms) if ms > 0 => ms as u64,
            _ => fallback,
        }
    }
}

/// Snapshot entry returned by [`FaultManager::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultStatus {
    pub active: bool,
    pub name: FaultName,
}

/// A named failure mode that can be switched on and off.
///
/// `start` while active and `stop` while idle are successful no-ops with no
/// external side effect.
pub trait Fault: Send + Sync {
    /// Stable identifier, used as the registry key.
    fn name(&self) -> FaultName;

    /// Apply the fault.
    fn start(&self, params: FaultParams) -> FaultResult<()>;

    /// Remove the fault.
    fn stop(&self) -> FaultResult<()>;

    /// Current state. Never performs external I/O.
    fn is_active(&self) -> bool;
}
