//! Single-origin reverse proxying.
//!
//! # Responsibilities
//! - Readdress an inbound request at a fixed upstream origin
//! - Stream the request body up and the response body back
//! - Map upstream failures to `502 Bad Gateway`
//!
//! # Design Decisions
//! - Bodies are never buffered; `Body` is handed straight to the client
//! - Hop-by-hop headers are dropped in both directions
//! - No retries: the caller gets whatever the origin (or the network) gave

use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Version},
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::upstream::UpstreamTarget;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// HTTP client shared by the forwarders.
pub type HttpClient = Client<HttpConnector, Body>;

pub fn build_client() -> HttpClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Forwards requests to one fixed origin.
#[derive(Clone)]
pub struct UpstreamForwarder {
    target: UpstreamTarget,
    client: HttpClient,
    rewrite_host: bool,
}

impl UpstreamForwarder {
    pub fn new(target: UpstreamTarget, client: HttpClient, rewrite_host: bool) -> Self {
        Self {
            target,
            client,
            rewrite_host,
        }
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    /// Send `request` to the origin and return its response.
    pub async fn forward(&self, request: Request<Body>, client_addr: SocketAddr) -> Response {
        let upstream_request = match self.prepare(request, client_addr.ip()) {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(upstream = %self.target, error = %e, "Failed to build upstream request");
                return StatusCode::BAD_GATEWAY.into_response();
            }
        };

        match self.client.request(upstream_request).await {
            Ok(response) => {
                let (mut parts, body) = response.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(upstream = %self.target, error = %e, "Upstream request failed");
                StatusCode::BAD_GATEWAY.into_response()
            }
        }
    }

    fn prepare(
        &self,
        request: Request<Body>,
        client_ip: IpAddr,
    ) -> Result<Request<Body>, axum::http::Error> {
        let (mut parts, body) = request.into_parts();

        // HTTP/2 clients carry the host in the URI, which is about to be replaced.
        if !self.rewrite_host && !parts.headers.contains_key(header::HOST) {
            if let Some(authority) = parts.uri.authority() {
                let host = HeaderValue::from_str(authority.as_str())?;
                parts.headers.insert(header::HOST, host);
            }
        }

        parts.uri = self.target.rewrite_uri(&parts.uri)?;
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);
        append_forwarded_for(&mut parts.headers, client_ip);

        if self.rewrite_host {
            let host = HeaderValue::from_str(self.target.authority().as_str())?;
            parts.headers.insert(header::HOST, host);
        }

        Ok(Request::from_parts(parts, body))
    }
}

impl std::fmt::Debug for UpstreamForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamForwarder")
            .field("target", &self.target)
            .field("rewrite_host", &self.rewrite_host)
            .finish()
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, client_ip: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client_ip.to_string()
    } else {
        format!("{}, {}", prior.join(", "), client_ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
