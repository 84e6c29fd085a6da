//! Request inspection.
//!
//! # Responsibilities
//! - Extract routing-relevant information (host, target, path)
//! - Read optional headers used by the access log
//!
//! # Design Decisions
//! - Views borrow the request; host and target are never normalized
//! - The path is percent-decoded, and only allocates when it contains escapes
//! - Missing or non-UTF-8 values read as empty strings

use std::borrow::Cow;

use axum::http::{header, HeaderMap, HeaderName, Request};
use percent_encoding::percent_decode_str;

/// Borrowed view of the parts of a request the routing rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView<'a> {
    host: &'a str,
    target: &'a str,
    path: Cow<'a, str>,
}

impl<'a> RequestView<'a> {
    /// Build a view from a raw host and request target (path plus query).
    pub fn new(host: &'a str, target: &'a str) -> Self {
        let raw_path = match target.split_once('?') {
            Some((path, _)) => path,
            None => target,
        };

        Self {
            host,
            target,
            path: percent_decode_str(raw_path).decode_utf8_lossy(),
        }
    }

    pub fn from_request<B>(request: &'a Request<B>) -> Self {
        Self::new(request_host(request), request_target(request))
    }

    pub fn host(&self) -> &'a str {
        self.host
    }

    /// Path plus query exactly as received.
    pub fn target(&self) -> &'a str {
        self.target
    }

    /// Target without its query string, percent-decoded.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Host the client addressed: the URI authority for absolute-form requests,
/// otherwise the `Host` header.
pub fn request_host<B>(request: &Request<B>) -> &str {
    if let Some(authority) = request.uri().authority() {
        return authority.as_str();
    }
    header_str(request.headers(), &header::HOST).unwrap_or("")
}

pub fn request_target<B>(request: &Request<B>) -> &str {
    let uri = request.uri();
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

/// Header value as a string, `None` when absent, empty, or not valid UTF-8.
pub fn header_str<'h>(headers: &'h HeaderMap, name: &HeaderName) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
