//! Diagnostics logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Honor `RUST_LOG`, falling back to the configured level
//!
//! # Design Decisions
//! - Diagnostics go to stderr; stdout is reserved for access log lines

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(level: &str) -> String {
    format!("wfc_proxy={level},tower_http=warn")
}

pub fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
