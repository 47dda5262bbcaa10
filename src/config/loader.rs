//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::SandboxConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<SandboxConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => SandboxConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file without validating it.
pub fn load_file(path: &Path) -> Result<SandboxConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Override fields from environment variables.
///
/// Unparseable values are skipped with a warning.
pub fn apply_env_overrides<F>(config: &mut SandboxConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = parse_var::<u16, _>(&lookup, "PORT") {
        config.server.bind_address = match config.server.bind_address.parse::<SocketAddr>() {
            Ok(mut addr) => {
                addr.set_port(port);
                addr.to_string()
            }
            Err(_) => format!("0.0.0.0:{}", port),
        };
    }

    let faults = &mut config.faults;
    if let Some(v) = parse_var(&lookup, "CPU_FAULT_DEFAULT_DURATION") {
        faults.cpu.default_duration_ms = v;
    }
    if let Some(v) = parse_var(&lookup, "LATENCY_FAULT_DEFAULT_DELAY") {
        faults.latency.default_delay_ms = v;
    }
    if let Some(v) = parse_var(&lookup, "LATENCY_FAULT_MAX_DELAY") {
        faults.latency.max_delay_ms = v;
    }
    if let Some(v) = non_empty(&lookup, "NETWORK_FAULT_INTERFACE") {
        faults.latency.interface = v;
    }
    if let Some(v) = parse_var(&lookup, "REDIS_FAULT_DEFAULT_DELAY") {
        faults.redis_latency.default_delay_ms = v;
    }
    if let Some(v) = parse_var(&lookup, "REDIS_FAULT_MAX_DELAY") {
        faults.redis_latency.max_delay_ms = v;
    }

    if let Some(v) = non_empty(&lookup, "DEPLOY_PROXY") {
        config.toxiproxy.provision = v.eq_ignore_ascii_case("true");
    }
    if let Some(v) = non_empty(&lookup, "TOXIPROXY_URL") {
        config.toxiproxy.api_url = v;
    }
    if let Some(v) = non_empty(&lookup, "LOG_LEVEL") {
        config.observability.log_level = v;
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SandboxConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("PORT", "8080"),
                ("CPU_FAULT_DEFAULT_DURATION", "500"),
                ("LATENCY_FAULT_MAX_DELAY", "1000"),
                ("NETWORK_FAULT_INTERFACE", "ens5"),
                ("REDIS_FAULT_DEFAULT_DELAY", "75"),
                ("DEPLOY_PROXY", "true"),
            ]),
        );

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.faults.cpu.default_duration_ms, 500);
        assert_eq!(config.faults.latency.max_delay_ms, 1000);
        assert_eq!(config.faults.latency.interface, "ens5");
        assert_eq!(config.faults.redis_latency.default_delay_ms, 75);
        assert!(config.toxiproxy.provision);
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = SandboxConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("PORT", "http"), ("LATENCY_FAULT_DEFAULT_DELAY", "-1"), ("NETWORK_FAULT_INTERFACE", "")]),
        );

        assert_eq!(config.server.bind_address, "0.0.0.0:3500");
        assert_eq!(config.faults.latency.default_delay_ms, 200);
        assert_eq!(config.faults.latency.interface, "eth0");
    }

    #[test]
    fn test_load_file_and_parse_error() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("fault-sandbox-good-{}.toml", std::process::id()));
        let bad = dir.join(format!("fault-sandbox-bad-{}.toml", std::process::id()));

        fs::File::create(&good)
            .unwrap()
            .write_all(b"[faults.cpu]\ndefault_duration_ms = 42\n")
            .unwrap();
        fs::File::create(&bad).unwrap().write_all(b"[faults.cpu\n").unwrap();

        assert_eq!(load_file(&good).unwrap().faults.cpu.default_duration_ms, 42);
        assert!(matches!(load_file(&bad), Err(ConfigError::Parse(_))));
        assert!(matches!(
            load_file(&dir.join("fault-sandbox-missing.toml")),
            Err(ConfigError::Io(_))
        ));

        let _ = fs::remove_file(good);
        let _ = fs::remove_file(bad);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![
            ValidationError {
                field: "a",
                message: "bad".into(),
            },
            ValidationError {
                field: "b",
                message: "worse".into(),
            },
        ]);
        assert_eq!(err.to_string(), "Validation failed: a: bad, b: worse");
    }
}
