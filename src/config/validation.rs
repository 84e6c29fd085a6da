//! Configuration validation.
//!
//! # Responsibilities
//! - Require the serving domain and both remotes
//! - Parse remotes into upstream targets
//! - Resolve the effective listen address
//!
//! # Design Decisions
//! - Fails on the first problem, checking fields in a fixed order
//! - Runs before any listener is created

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::config::loader::ConfigError;
use crate::config::schema::{ProxyConfig, RouterConfig};
use crate::http::upstream::UpstreamTarget;

/// Check required fields and build the routing configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<RouterConfig, ConfigError> {
    if config.host_domain.is_empty() {
        return Err(ConfigError::MissingHostDomain);
    }
    if config.primary_remote_url.is_empty() {
        return Err(ConfigError::MissingPrimaryRemote);
    }
    if config.default_remote_url.is_empty() {
        return Err(ConfigError::MissingDefaultRemote);
    }

    Ok(RouterConfig {
        host_domain: config.host_domain.clone(),
        primary: parse_remote("primaryRemoteURL", &config.primary_remote_url)?,
        default: parse_remote("defaultRemoteURL", &config.default_remote_url)?,
        rewrite_host: config.rewrite_host,
    })
}

/// Address the listener binds to: `localIP` (wildcard when unset) and `port`.
pub fn listen_address(config: &ProxyConfig) -> Result<SocketAddr, ConfigError> {
    let ip = match config.local_ip.as_deref() {
        None | Some("") => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        Some(raw) => raw.parse().map_err(|source| ConfigError::InvalidLocalIp {
            value: raw.to_owned(),
            source,
        })?,
    };
    Ok(SocketAddr::new(ip, config.effective_port()))
}

fn parse_remote(field: &'static str, value: &str) -> Result<UpstreamTarget, ConfigError> {
    value.parse().map_err(|source| ConfigError::InvalidRemote {
        field,
        value: value.to_owned(),
        source,
    })
}
