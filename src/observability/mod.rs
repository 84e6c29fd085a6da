//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → access_log.rs (one line on stdout, written before dispatch)
//!
//! Everything else:
//!     → logging.rs (tracing events on stderr)
//! ```
//!
//! # Design Decisions
//! - The access log format is fixed and is not routed through tracing
//! - Diagnostics are structured tracing events, filtered by level

pub mod access_log;
pub mod logging;

pub use access_log::{AccessLogEntry, AccessLogger};
pub use logging::init_logging;
