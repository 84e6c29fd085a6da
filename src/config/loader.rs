//! Configuration loading from disk.

use std::fs;
use std::net::AddrParseError;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::http::upstream::TargetError;

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no host domain specified, set `hostDomain` to continue")]
    MissingHostDomain,

    #[error("no primary remote specified, set `primaryRemoteURL` to continue")]
    MissingPrimaryRemote,

    #[error("no default remote specified, set `defaultRemoteURL` to continue")]
    MissingDefaultRemote,

    #[error("invalid {field} `{value}`: {source}")]
    InvalidRemote {
        field: &'static str,
        value: String,
        source: TargetError,
    },

    #[error("invalid localIP `{value}`: {source}")]
    InvalidLocalIp {
        value: String,
        source: AddrParseError,
    },
}

/// Load configuration from a TOML file.
///
/// Only syntax is checked here; see [`validate_config`](super::validation::validate_config).
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}
