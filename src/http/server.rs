//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy handler
//! - Wire up middleware (tracing)
//! - Bind server to listener and serve until shutdown
//! - Per request: classify, write the access log line, dispatch

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::RouterConfig;
use crate::http::dispatch::Dispatcher;
use crate::http::request::RequestView;
use crate::observability::access_log::{AccessLogEntry, AccessLogger};
use crate::routing::Classifier;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub dispatcher: Arc<Dispatcher>,
    pub access_log: AccessLogger,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server from the validated routing configuration.
    pub fn new(config: &RouterConfig, access_log: AccessLogger) -> Self {
        let state = AppState {
            classifier: Arc::new(Classifier::from_config(config)),
            dispatcher: Arc::new(Dispatcher::from_config(config)),
            access_log,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router. Every method and path goes to the proxy handler.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Classifies the request, logs it, and forwards it to the chosen upstream.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let classification = state.classifier.classify(&RequestView::from_request(&request));

    tracing::debug!(
        client = %client_addr,
        upstream = ?classification.upstream,
        reason = %classification.reason,
        "Request classified"
    );

    let entry = AccessLogEntry::from_request(&request, client_addr, classification.status());
    state.access_log.record(&entry);

    state
        .dispatcher
        .dispatch(classification.upstream, request, client_addr)
        .await
}
