//! Upstream origin descriptors.
//!
//! # Responsibilities
//! - Parse configured remote URLs once at startup
//! - Rewrite an inbound request URI so it addresses the origin
//!
//! # Design Decisions
//! - Only plain `http` origins (the forwarding client uses `HttpConnector`)
//! - Base path and query of the origin are kept and merged with the request's

use std::fmt;
use std::str::FromStr;

use axum::http::uri::{Authority, InvalidUri, Scheme};
use axum::http::Uri;
use thiserror::Error;
use url::Url;

/// Error produced when a remote URL cannot be used as an upstream origin.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("unsupported scheme `{0}`, only http upstreams are supported")]
    UnsupportedScheme(String),
    #[error("missing host")]
    MissingHost,
    #[error("invalid authority: {0}")]
    Authority(#[from] InvalidUri),
}

/// An immutable upstream origin (scheme, authority, base path and query).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
    base_query: Option<String>,
}

impl UpstreamTarget {
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Build the URI used to reach this origin for an inbound request URI.
    ///
    /// The request path is appended to the base path with exactly one slash
    /// between them; queries are joined with `&` when both are present.
    pub fn rewrite_uri(&self, incoming: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_path(&self.base_path, incoming.path());
        let query = match (
            self.base_query.as_deref().unwrap_or(""),
            incoming.query().unwrap_or(""),
        ) {
            ("", "") => None,
            (base, "") => Some(base.to_owned()),
            ("", query) => Some(query.to_owned()),
            (base, query) => Some(format!("{base}&{query}")),
        };

        let path_and_query = match query {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl FromStr for UpstreamTarget {
    type Err = TargetError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(raw)?;
        if url.scheme() != "http" {
            return Err(TargetError::UnsupportedScheme(url.scheme().to_owned()));
        }

        let host = url.host_str().ok_or(TargetError::MissingHost)?;
        let authority = match url.port() {
            Some(port) => Authority::from_str(&format!("{host}:{port}"))?,
            None => Authority::from_str(host)?,
        };

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
            base_path: url.path().to_owned(),
            base_query: url.query().map(str::to_owned),
        })
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)?;
        if let Some(query) = &self.base_query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

fn join_path(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
