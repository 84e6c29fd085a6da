//! Configuration schema definitions.
//!
//! Keys are camelCase in the config file (`hostDomain`, `primaryRemoteURL`, ...).

use serde::{Deserialize, Serialize};

use crate::http::upstream::UpstreamTarget;

/// Port used when `port` is unset or zero.
pub const DEFAULT_PORT: u16 = 80;

/// Root configuration as read from disk.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address to bind the listener to (wildcard when unset).
    #[serde(rename = "localIP")]
    pub local_ip: Option<String>,

    /// Listening port.
    pub port: Option<u16>,

    /// Serving domain every routed host must reference.
    #[serde(rename = "hostDomain")]
    pub host_domain: String,

    /// Origin receiving traffic that matches a routing rule.
    #[serde(rename = "primaryRemoteURL")]
    pub primary_remote_url: String,

    /// Origin receiving everything else.
    #[serde(rename = "defaultRemoteURL")]
    pub default_remote_url: String,

    /// Replace the client's Host header with the upstream authority.
    #[serde(rename = "rewriteHost")]
    pub rewrite_host: bool,

    /// Diagnostics log level (trace, debug, info, warn, error).
    #[serde(rename = "logLevel")]
    pub log_level: Option<String>,
}

impl ProxyConfig {
    /// Port the listener will use.
    pub fn effective_port(&self) -> u16 {
        self.port.filter(|p| *p != 0).unwrap_or(DEFAULT_PORT)
    }

    /// Log level, falling back to `info`.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

/// Validated, immutable routing configuration.
///
/// Built once at startup and handed to the classifier and dispatcher.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub host_domain: String,
    pub primary: UpstreamTarget,
    pub default: UpstreamTarget,
    pub rewrite_host: bool,
}
