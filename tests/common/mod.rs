//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fmt::{self, Write as _};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fault_sandbox::config::SandboxConfig;
use fault_sandbox::control::{ToxicControl, TrafficControl};
use fault_sandbox::fault::error::FaultError;
use fault_sandbox::fault::FaultResult;
use fault_sandbox::lifecycle::startup::build_fault_manager;
use fault_sandbox::lifecycle::Shutdown;
use fault_sandbox::{FaultManager, HttpServer, Store};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// `tc` stand-in that tracks the rules it would have installed.
#[derive(Default)]
pub struct CountingTc {
    pub adds: AtomicUsize,
    pub clears: AtomicUsize,
    pub fail_add: AtomicBool,
    rules: Mutex<Vec<u64>>,
}

impl CountingTc {
    /// Delays currently installed, oldest first.
    pub fn rules(&self) -> Vec<u64> {
        self.rules.lock().unwrap().clone()
    }
}

impl TrafficControl for CountingTc {
    fn add_delay(&self, _interface: &str, delay_ms: u64) -> FaultResult<()> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(FaultError::ExternalCommand {
                command: format!("tc qdisc add dev eth0 root netem delay {}ms", delay_ms),
                status: "exit status: 2".into(),
                output: "RTNETLINK answers: Operation not permitted".into(),
            });
        }
        self.rules.lock().unwrap().push(delay_ms);
        Ok(())
    }

    fn clear(&self, _interface: &str) -> FaultResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.rules.lock().unwrap().clear();
        Ok(())
    }
}

/// Toxiproxy stand-in that tracks attached toxics.
#[derive(Default)]
pub struct CountingToxics {
    pub adds: AtomicUsize,
    pub removes: AtomicUsize,
    pub fail_add: AtomicBool,
    toxics: Mutex<Vec<(String, u64)>>,
}

impl CountingToxics {
    pub fn toxics(&self) -> Vec<(String, u64)> {
        self.toxics.lock().unwrap().clone()
    }
}

impl ToxicControl for CountingToxics {
    fn add_latency_toxic(&self, _proxy: &str, toxic: &str, latency_ms: u64) -> FaultResult<()> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(FaultError::ExternalService("attach toxic returned 500 Internal Server Error".into()));
        }
        self.toxics.lock().unwrap().push((toxic.to_string(), latency_ms));
        Ok(())
    }

    fn remove_toxic(&self, _proxy: &str, toxic: &str) -> FaultResult<()> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.toxics.lock().unwrap().retain(|(name, _)| name != toxic);
        Ok(())
    }
}

/// A log event seen by [`CapturedEvents`].
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub fields: String,
}

/// Layer that keeps every event it sees.
#[derive(Clone, Default)]
pub struct CapturedEvents {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedEvents {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events at `level` or more severe.
    pub fn at_least(&self, level: Level) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| e.level <= level).collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldText::default();
        event.record(&mut fields);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: fields.0,
        });
    }
}

#[derive(Default)]
struct FieldText(String);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let _ = write!(self.0, "{}={:?} ", field.name(), value);
    }
}

/// Fault manager wired to counting control planes.
pub struct Sandbox {
    pub manager: Arc<FaultManager>,
    pub tc: Arc<CountingTc>,
    pub toxics: Arc<CountingToxics>,
}

pub fn sandbox(config: &SandboxConfig) -> Sandbox {
    let tc = Arc::new(CountingTc::default());
    let toxics = Arc::new(CountingToxics::default());
    let manager = Arc::new(build_fault_manager(config, tc.clone(), toxics.clone()));
    Sandbox { manager, tc, toxics }
}

/// Serve the full HTTP API on an ephemeral port.
pub async fn spawn_app(config: &SandboxConfig, manager: Arc<FaultManager>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = Arc::new(Store::in_memory(config.store.mock_user_count));
    let server = HttpServer::new(config, manager, store);

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    (addr, shutdown)
}

/// A request seen by [`start_programmable_backend`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Start a programmable mock HTTP server on an ephemeral port.
///
/// `f` receives each request and returns the status and body to answer with.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let log = seen.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        log.lock().unwrap().push(request.clone());
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            204 => "204 No Content",
                            404 => "404 Not Found",
                            409 => "409 Conflict",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(RecordedRequest { method, path, body })
}
