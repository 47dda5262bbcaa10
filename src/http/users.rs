//! Mock users API.
//!
//! Every request first applies its fault instruction through the
//! [`FaultManager`](crate::fault::FaultManager), then serves the users.
//! Both steps block (CPU burn, `tc`, Toxiproxy) and run on the blocking pool.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::fault::{FaultName, FaultParams};
use crate::http::response::error_response;
use crate::http::server::AppState;
use crate::store::{StoreError, User};

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub chaos: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VariantQuery {
    pub mode: Option<String>,
    pub duration: Option<String>,
}

/// What a request asks the fault manager to do before serving users.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Chaos {
    Start(String),
    StopAll,
}

/// Parse the `duration` query parameter. Empty or absent means "use the default".
fn parse_duration(raw: Option<&str>) -> Result<Option<i64>, Response> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
            tracing::debug!(duration = %value, "Rejected duration parameter");
            error_response(StatusCode::BAD_REQUEST, "Invalid duration parameter")
        }),
    }
}

/// `GET /api/users?chaos=<name|none>&duration=<ms>`
pub async fn list_users(State(state): State<AppState>, Query(query): Query<UsersQuery>) -> Response {
    let duration_ms = match parse_duration(query.duration.as_deref()) {
        Ok(d) => d,
        Err(response) => return response,
    };
    let chaos = match query.chaos {
        Some(name) if !name.is_empty() && name != "none" => Chaos::Start(name),
        _ => Chaos::StopAll,
    };

    match serve_users(&state, chaos, duration_ms).await {
        Ok(users) => Json(users).into_response(),
        Err(response) => response,
    }
}

/// `GET /api/users/{variant}?mode=<0|1>&duration=<ms>`
///
/// Variant 1 injects latency, 2 burns CPU, 3 slows the cache.
pub async fn list_users_variant(
    State(state): State<AppState>,
    Path(variant): Path<String>,
    Query(query): Query<VariantQuery>,
) -> Response {
    let fault = match variant.as_str() {
        "1" => FaultName::Latency,
        "2" => FaultName::Cpu,
        "3" => FaultName::RedisLatency,
        _ => return error_response(StatusCode::NOT_FOUND, "Unknown users variant"),
    };
    let duration_ms = match parse_duration(query.duration.as_deref()) {
        Ok(d) => d,
        Err(response) => return response,
    };
    let chaos = if query.mode.as_deref() == Some("0") {
        Chaos::StopAll
    } else {
        Chaos::Start(fault.as_str().to_string())
    };

    match serve_users(&state, chaos, duration_ms).await {
        Ok(users) => Json(json!({ "data": users })).into_response(),
        Err(response) => response,
    }
}

async fn serve_users(state: &AppState, chaos: Chaos, duration_ms: Option<i64>) -> Result<Vec<User>, Response> {
    let faults = state.faults.clone();
    let store = state.store.clone();

    let result = tokio::task::spawn_blocking(move || {
        match chaos {
            Chaos::Start(name) => faults.start_fault(&name, FaultParams { duration_ms }),
            Chaos::StopAll => faults.stop_all_faults(),
        }
        store.query_users()
    })
    .await;

    match result {
        Ok(Ok(users)) => Ok(users),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to query users");
            Err(store_error_response(&e))
        }
        Err(e) => {
            tracing::error!(error = %e, "Users task failed");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

fn store_error_response(err: &StoreError) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to query users: {}", err))
}
