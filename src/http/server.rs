//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, access log, tracing, timeout)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::SandboxConfig;
use crate::fault::FaultManager;
use crate::http::request::{log_request, propagate_request_id_layer, set_request_id_layer};
use crate::http::users::{list_users, list_users_variant};
use crate::store::Store;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub faults: Arc<FaultManager>,
    pub store: Arc<Store>,
}

/// HTTP server for the sandbox API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &SandboxConfig, faults: Arc<FaultManager>, store: Arc<Store>) -> Self {
        let state = AppState { faults, store };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SandboxConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/users", get(list_users))
            .route("/api/users/{variant}", get(list_users_variant))
            .with_state(state.clone())
            .merge(setup_admin_router(state))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(propagate_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn(log_request))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout_secs,
                    ))),
            )
    }

    /// The assembled router, for serving on a caller-managed listener.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
