//! Shared utilities for integration testing.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::Request,
    Router,
};
use tokio::net::TcpListener;

use wfc_proxy::config::RouterConfig;
use wfc_proxy::http::HttpServer;
use wfc_proxy::lifecycle::Shutdown;
use wfc_proxy::observability::AccessLogger;

/// A request as seen by a mock origin.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub host: Option<String>,
    pub forwarded_for: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct Origin {
    label: &'static str,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

/// A mock origin that records every request and answers with its label.
pub struct MockOrigin {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl MockOrigin {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seen(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }
}

async fn record(State(origin): State<Origin>, request: Request<Body>) -> &'static str {
    let (parts, body) = request.into_parts();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    let recorded = Recorded {
        method: parts.method.to_string(),
        target: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_default(),
        host: header("host"),
        forwarded_for: header("x-forwarded-for"),
        body: to_bytes(body, usize::MAX).await.unwrap_or_default().to_vec(),
    };
    origin.seen.lock().unwrap().push(recorded);
    origin.label
}

/// Start a mock origin on an ephemeral loopback port.
pub async fn start_mock_origin(label: &'static str) -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new().fallback(record).with_state(Origin {
        label,
        seen: seen.clone(),
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockOrigin { addr, seen }
}

/// In-memory access log sink.
#[derive(Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A running proxy bound to an ephemeral loopback port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub log: CapturedLog,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.addr, target)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(config: RouterConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = CapturedLog::default();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(&config, AccessLogger::new(log.clone()));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, log, shutdown }
}

pub fn router_config(domain: &str, primary: &MockOrigin, default: &MockOrigin) -> RouterConfig {
    RouterConfig {
        host_domain: domain.to_owned(),
        primary: primary.url().parse().unwrap(),
        default: default.url().parse().unwrap(),
        rewrite_host: false,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
