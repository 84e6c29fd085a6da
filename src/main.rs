//! WFC Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────┐
//!                       │                   WFC PROXY                   │
//!                       │                                               │
//!     Client Request    │  ┌─────────┐    ┌────────────┐    ┌────────┐  │
//!     ──────────────────┼─▶│  http   │───▶│  routing   │───▶│ access │  │
//!                       │  │ server  │    │ classifier │    │  log   │  │
//!                       │  └─────────┘    └────────────┘    └───┬────┘  │
//!                       │                                       │       │
//!                       │                                       ▼       │
//!     Client Response   │                 ┌────────────┐   ┌──────────┐ │     ┌─────────┐
//!     ◀─────────────────┼─────────────────│  forward   │◀──│ dispatch │─┼────▶│ primary │
//!                       │                 └────────────┘   └──────────┘ │     │ default │
//!                       │                                               │     └─────────┘
//!                       └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use wfc_proxy::config::{listen_address, load_config, validate_config, ProxyConfig};
use wfc_proxy::http::HttpServer;
use wfc_proxy::lifecycle::Shutdown;
use wfc_proxy::observability::{init_logging, AccessLogger};

#[derive(Parser)]
#[command(name = "wfc-proxy", version)]
#[command(about = "Routes WFC traffic to a primary upstream and everything else to a default upstream")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_config(&cli.config);
    init_logging(
        config
            .as_ref()
            .map(ProxyConfig::effective_log_level)
            .unwrap_or("info"),
    );

    tracing::info!("wfc-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router_config = validate_config(&config)?;
    let bind_address = listen_address(&config)?;

    tracing::info!(
        host_domain = %router_config.host_domain,
        primary = %router_config.primary,
        default = %router_config.default,
        rewrite_host = router_config.rewrite_host,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(&router_config, AccessLogger::stdout());
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
