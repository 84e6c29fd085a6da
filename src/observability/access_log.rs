//! Per-request access log.
//!
//! # Responsibilities
//! - Format one line per request with client, time, request line,
//!   referrer, user agent and the routing status
//! - Write lines to a shared sink without interleaving
//!
//! # Design Decisions
//! - Written synchronously before dispatch and flushed immediately
//! - The sink lock covers a single line write, never a forward
//! - Sink failures are reported via tracing and otherwise ignored
//!
//! Line format:
//! ```text
//! 192.0.2.7:50123 [7/March/2024:9:5:3 100] "GET nas.example.com/ac HTTP/1.1"  "-" "Nintendo DS": Request matched rule for 'dwc auth'
//! ```

use std::fmt;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::{header, Request};
use chrono::{DateTime, Datelike, FixedOffset, Local, Timelike};

use crate::http::request::{header_str, request_host, request_target};

/// One access log record.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: SocketAddr,
    pub timestamp: DateTime<FixedOffset>,
    pub method: String,
    /// Host followed by path and query.
    pub target: String,
    pub protocol: String,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub status: String,
}

impl AccessLogEntry {
    /// Capture the logged fields of `request`, stamped with the local time.
    pub fn from_request<B>(request: &Request<B>, remote_addr: SocketAddr, status: String) -> Self {
        let headers = request.headers();
        Self {
            remote_addr,
            timestamp: Local::now().fixed_offset(),
            method: request.method().to_string(),
            target: format!("{}{}", request_host(request), request_target(request)),
            protocol: format!("{:?}", request.version()),
            referer: header_str(headers, &header::REFERER).map(str::to_owned),
            user_agent: header_str(headers, &header::USER_AGENT).map(str::to_owned),
            status,
        }
    }
}

impl fmt::Display for AccessLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] \"{} {} {}\"  \"{}\" \"{}\": {}",
            self.remote_addr,
            format_timestamp(&self.timestamp),
            self.method,
            self.target,
            self.protocol,
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
            self.status,
        )
    }
}

/// `day/MonthName/year:hour:minute:second offset`, numbers unpadded and the
/// offset in hundredths of an hour (UTC+1 is `100`, UTC-5:30 is `-550`).
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    format!(
        "{}/{}/{}:{}:{}:{} {}",
        ts.day(),
        ts.format("%B"),
        ts.year(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.offset().local_minus_utc() / 36,
    )
}

/// Shared, line-serialized access log sink.
#[derive(Clone)]
pub struct AccessLogger {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl AccessLogger {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn record(&self, entry: &AccessLogEntry) {
        let line = entry.to_string();

        let mut sink = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(sink, "{line}").and_then(|()| sink.flush()) {
            tracing::warn!(error = %e, "Failed to write access log line");
        }
    }
}

impl fmt::Debug for AccessLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessLogger").finish_non_exhaustive()
    }
}
