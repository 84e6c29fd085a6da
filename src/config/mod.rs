//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (required fields, remote URLs, listen address)
//!     → RouterConfig (validated, immutable)
//!     → handed to the classifier and dispatcher at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once; there is no reload
//! - Any error is fatal before the listener is created

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ProxyConfig, RouterConfig, DEFAULT_PORT};
pub use validation::{listen_address, validate_config};
