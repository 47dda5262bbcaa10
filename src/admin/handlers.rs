use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::fault::{FaultManager, FaultName, FaultParams, FaultStatus};
use crate::http::response::error_response;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// Body of `POST /faults/{name}/start`. May be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    pub duration_ms: Option<i64>,
}

pub async fn get_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

pub async fn get_faults(State(state): State<AppState>) -> Json<BTreeMap<FaultName, FaultStatus>> {
    Json(state.faults.status())
}

pub async fn get_active_faults(State(state): State<AppState>) -> Json<Vec<FaultName>> {
    Json(state.faults.list_active())
}

pub async fn start_fault(State(state): State<AppState>, Path(name): Path<String>, body: Bytes) -> Response {
    let request: StartRequest = if body.is_empty() {
        StartRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e)),
        }
    };

    let params = FaultParams {
        duration_ms: request.duration_ms,
    };
    run_and_report(state.faults, move |faults| faults.start_fault(&name, params)).await
}

pub async fn stop_fault(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    run_and_report(state.faults, move |faults| faults.stop_fault(&name)).await
}

pub async fn stop_all_faults(State(state): State<AppState>) -> Response {
    run_and_report(state.faults, |faults| faults.stop_all_faults()).await
}

/// Run a manager operation on the blocking pool and answer with the
/// resulting status snapshot.
async fn run_and_report<F>(faults: Arc<FaultManager>, op: F) -> Response
where
    F: FnOnce(&FaultManager) + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        op(&faults);
        faults.status()
    })
    .await;

    match result {
        Ok(status) => (StatusCode::ACCEPTED, Json(status)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Fault admin task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}
