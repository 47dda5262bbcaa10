//! Fault admin API.
//!
//! No authentication: anyone who can reach the port can switch faults.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/faults", get(get_faults))
        .route("/faults/active", get(get_active_faults))
        .route("/faults/stop-all", post(stop_all_faults))
        .route("/faults/{name}/start", post(start_fault))
        .route("/faults/{name}/stop", post(stop_fault))
        .with_state(state)
}
