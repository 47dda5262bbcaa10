//! Fault-injection sandbox service.
//!
//! A mock users API whose requests can switch failure modes on and off, used
//! to check how callers cope with a slow network, a starved CPU and a slow
//! cache.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                    FAULT SANDBOX                     │
//!                    │                                                      │
//!   Client Request   │  ┌─────────┐    ┌──────────────┐    ┌────────────┐  │
//!   ─────────────────┼─▶│  http   │───▶│    fault     │───▶│  control   │──┼──▶ tc / Toxiproxy
//!                    │  │ server  │    │   manager    │    │  planes    │  │
//!                    │  └────┬────┘    └──────────────┘    └────────────┘  │
//!                    │       │                                              │
//!                    │       ▼                                              │
//!   Client Response  │  ┌─────────┐                                         │
//!   ◀────────────────┼──│  store  │ (cache → database → mock seed)          │
//!                    │  └─────────┘                                         │
//!                    │                                                      │
//!                    │  ┌────────────────────────────────────────────────┐ │
//!                    │  │ config │ observability │ lifecycle │ admin API │ │
//!                    │  └────────────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::runtime::Handle;

use fault_sandbox::config::load_config;
use fault_sandbox::lifecycle::startup::{build_default_fault_manager, provision_proxy, toxiproxy_client};
use fault_sandbox::lifecycle::{wait_for_signal, Shutdown};
use fault_sandbox::observability::{logging, metrics};
use fault_sandbox::{HttpServer, Store};

#[derive(Parser)]
#[command(name = "fault-sandbox", version)]
#[command(about = "Mock users API with switchable latency, CPU and cache faults", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fault-sandbox starting");
    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        interface = %config.faults.latency.interface,
        toxiproxy = %config.toxiproxy.api_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = toxiproxy_client(&config, Handle::current())?;
    provision_proxy(&config, &client).await;

    let faults = Arc::new(build_default_fault_manager(&config, client));
    let store = Arc::new(Store::in_memory(config.store.mock_user_count));
    tracing::info!(faults = ?faults.names(), "Faults registered");

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, faults.clone(), store);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let signalled = tokio::select! {
        _ = wait_for_signal() => true,
        result = &mut server_task => {
            result??;
            false
        }
    };
    if signalled {
        shutdown.trigger();
        server_task.await??;
    }

    tokio::task::spawn_blocking(move || faults.stop_all_faults()).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
