//! Upstream selection.
//!
//! # Responsibilities
//! - Own the two long-lived forwarders (primary and default)
//! - Hand each request to the forwarder its classification selected
//!
//! # Design Decisions
//! - No failover between upstreams; errors come back as the forwarder made them

use std::net::SocketAddr;

use axum::{body::Body, http::Request, response::Response};

use crate::config::RouterConfig;
use crate::http::forward::{build_client, UpstreamForwarder};
use crate::routing::Upstream;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    primary: UpstreamForwarder,
    default: UpstreamForwarder,
}

impl Dispatcher {
    pub fn new(primary: UpstreamForwarder, default: UpstreamForwarder) -> Self {
        Self { primary, default }
    }

    /// Build both forwarders on one shared connection pool.
    pub fn from_config(config: &RouterConfig) -> Self {
        let client = build_client();
        Self::new(
            UpstreamForwarder::new(config.primary.clone(), client.clone(), config.rewrite_host),
            UpstreamForwarder::new(config.default.clone(), client, config.rewrite_host),
        )
    }

    pub fn forwarder(&self, upstream: Upstream) -> &UpstreamForwarder {
        match upstream {
            Upstream::Primary => &self.primary,
            Upstream::Default => &self.default,
        }
    }

    pub async fn dispatch(
        &self,
        upstream: Upstream,
        request: Request<Body>,
        client_addr: SocketAddr,
    ) -> Response {
        self.forwarder(upstream).forward(request, client_addr).await
    }
}
