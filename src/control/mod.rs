//! External control planes driven by the faults.
//!
//! # Responsibilities
//! - `tc.rs`: host traffic control (netem delay rules per interface)
//! - `toxiproxy.rs`: HTTP control plane of the latency proxy in front of the cache
//!
//! # Design Decisions
//! - Both are traits so faults can run against counting mocks in tests
//! - Calls are synchronous; no retries and no timeouts beyond client defaults

pub mod tc;
pub mod toxiproxy;

pub use tc::Tc;
pub use toxiproxy::ToxiproxyClient;

use crate::fault::FaultResult;

/// Interface-level delay rules.
pub trait TrafficControl: Send + Sync {
    /// Attach a netem delay of `delay_ms` to the root qdisc of `interface`.
    fn add_delay(&self, interface: &str, delay_ms: u64) -> FaultResult<()>;

    /// Remove the root qdisc of `interface`. A missing rule is not an error.
    fn clear(&self, interface: &str) -> FaultResult<()>;
}

/// Toxic management on an existing proxy.
pub trait ToxicControl: Send + Sync {
    /// Attach a latency toxic named `toxic` to `proxy`.
    fn add_latency_toxic(&self, proxy: &str, toxic: &str, latency_ms: u64) -> FaultResult<()>;

    /// Detach the toxic named `toxic` from `proxy`.
    fn remove_toxic(&self, proxy: &str, toxic: &str) -> FaultResult<()>;
}
