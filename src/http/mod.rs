//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, access log, request metrics)
//!     → users.rs / admin (handlers; fault calls hop onto the blocking pool)
//!     → response.rs (JSON error bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod users;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
