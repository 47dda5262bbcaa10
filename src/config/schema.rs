//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the sandbox service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SandboxConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Per-fault settings.
    pub faults: FaultsConfig,

    /// Cache proxy control plane.
    pub toxiproxy: ToxiproxyConfig,

    /// Mock user store.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3500").
    pub bind_address: String,

    /// Request timeout in seconds. Must cover the longest CPU burn.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3500".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FaultsConfig {
    pub cpu: CpuFaultConfig,
    pub latency: LatencyFaultConfig,
    pub redis_latency: CacheLatencyFaultConfig,
}

/// CPU burn fault.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CpuFaultConfig {
    /// Burn duration when the request gives none, in milliseconds.
    pub default_duration_ms: u64,
}

impl Default for CpuFaultConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 200,
        }
    }
}

/// Network latency fault.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyFaultConfig {
    /// Delay when the request gives none, in milliseconds.
    pub default_delay_ms: u64,

    /// Upper bound for requested delays, in milliseconds.
    pub max_delay_ms: u64,

    /// Interface the netem rule is attached to.
    pub interface: String,

    /// Path or name of the `tc` binary.
    pub tc_binary: String,
}

impl Default for LatencyFaultConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: 200,
            max_delay_ms: 5000,
            interface: "eth0".to_string(),
            tc_binary: "tc".to_string(),
        }
    }
}

/// Cache latency fault.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheLatencyFaultConfig {
    /// Latency when the request gives none, in milliseconds.
    pub default_delay_ms: u64,

    /// Upper bound for requested latency, in milliseconds.
    pub max_delay_ms: u64,

    /// Proxy in front of the cache.
    pub proxy_name: String,

    /// Name of the toxic attached to the proxy.
    pub toxic_name: String,
}

impl Default for CacheLatencyFaultConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: 100,
            max_delay_ms: 2000,
            proxy_name: "redis".to_string(),
            toxic_name: "redis_delay".to_string(),
        }
    }
}

/// Toxiproxy control plane.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToxiproxyConfig {
    /// Control plane base URL.
    pub api_url: String,

    /// Create the cache proxy at startup.
    pub provision: bool,

    /// Listen address of the provisioned proxy.
    pub listen: String,

    /// Cache address the proxy forwards to.
    pub upstream: String,
}

impl Default for ToxiproxyConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8474".to_string(),
            provision: false,
            listen: "localhost:6379".to_string(),
            upstream: "redis-service:6379".to_string(),
        }
    }
}

/// Mock user store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Users synthesized when the database is empty.
    pub mock_user_count: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { mock_user_count: 10 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
