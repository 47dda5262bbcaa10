//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (defaults > 0, maxima >= 1)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SandboxConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::SandboxConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &SandboxConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }

    let faults = &config.faults;
    if faults.cpu.default_duration_ms == 0 {
        errors.push(ValidationError::new("faults.cpu.default_duration_ms", "must be > 0"));
    }
    if faults.latency.default_delay_ms == 0 {
        errors.push(ValidationError::new("faults.latency.default_delay_ms", "must be > 0"));
    }
    if faults.latency.max_delay_ms == 0 {
        errors.push(ValidationError::new("faults.latency.max_delay_ms", "must be >= 1"));
    }
    if faults.latency.interface.trim().is_empty() {
        errors.push(ValidationError::new("faults.latency.interface", "must not be empty"));
    }
    if faults.latency.tc_binary.trim().is_empty() {
        errors.push(ValidationError::new("faults.latency.tc_binary", "must not be empty"));
    }
    if faults.redis_latency.default_delay_ms == 0 {
        errors.push(ValidationError::new("faults.redis_latency.default_delay_ms", "must be > 0"));
    }
    if faults.redis_latency.max_delay_ms == 0 {
        errors.push(ValidationError::new("faults.redis_latency.max_delay_ms", "must be >= 1"));
    }
    if faults.redis_latency.proxy_name.trim().is_empty() {
        errors.push(ValidationError::new("faults.redis_latency.proxy_name", "must not be empty"));
    }
    if faults.redis_latency.toxic_name.trim().is_empty() {
        errors.push(ValidationError::new("faults.redis_latency.toxic_name", "must not be empty"));
    }

    match Url::parse(&config.toxiproxy.api_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "toxiproxy.api_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("toxiproxy.api_url", e.to_string())),
    }

    if config.store.mock_user_count == 0 {
        errors.push(ValidationError::new("store.mock_user_count", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
