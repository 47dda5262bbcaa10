//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply environment overrides)
//!     → validation.rs (semantic checks)
//!     → SandboxConfig (validated, immutable)
//!     → passed by reference to each subsystem at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheLatencyFaultConfig, CpuFaultConfig, FaultsConfig, LatencyFaultConfig, ObservabilityConfig,
    SandboxConfig, ServerConfig, StoreConfig, ToxiproxyConfig,
};
