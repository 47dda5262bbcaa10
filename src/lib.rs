//! Fault-injection sandbox library

pub mod admin;
pub mod config;
pub mod control;
pub mod fault;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::schema::SandboxConfig;
pub use fault::{Fault, FaultManager, FaultName, FaultParams, FaultStatus};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::Store;
