//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sandbox_requests_total` (counter): requests by method, status
//! - `sandbox_request_duration_seconds` (histogram): latency by method
//! - `sandbox_fault_active` (gauge): 1=active, 0=idle, per fault
//! - `sandbox_fault_transitions_total` (counter): start/stop requests per fault
//! - `sandbox_fault_errors_total` (counter): swallowed fault errors by kind
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::fault::FaultName;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "sandbox_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("sandbox_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_fault_state(fault: FaultName, active: bool) {
    metrics::gauge!("sandbox_fault_active", "fault" => fault.as_str())
        .set(if active { 1.0 } else { 0.0 });
}

pub fn record_fault_transition(fault: FaultName, action: &'static str) {
    metrics::counter!(
        "sandbox_fault_transitions_total",
        "fault" => fault.as_str(),
        "action" => action
    )
    .increment(1);
}

pub fn record_fault_error(fault: FaultName, kind: &'static str) {
    metrics::counter!(
        "sandbox_fault_errors_total",
        "fault" => fault.as_str(),
        "kind" => kind
    )
    .increment(1);
}
