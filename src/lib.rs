//! WFC traffic router.
//!
//! Classifies each request by host and path, writes an access log line, and
//! forwards it to either the primary (WFC) upstream or the default upstream.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{ProxyConfig, RouterConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Classifier, Upstream};
