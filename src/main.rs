//! Switchman gateway (v0.1)
//!
//! Serves a routing table written in the switchman configuration language.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ runtime snapshot ──▶ routing::Server::dispatch
//!                                                                  │
//!                                  ┌───────────────────────────────┼──────────────────┐
//!                                  ▼                               ▼                  ▼
//!                           endpoints::files             endpoints::redirect   endpoints::proxy ──▶ Backend
//!
//!     config file ──▶ lang (tokenizer, reader) ──▶ config::parser ──▶ routing::Server
//!                        ▲                                               │
//!     admin API / watcher / SIGHUP ─────────────────────────────────────▶ runtime swap
//! ```

use clap::Parser;
use std::path::PathBuf;

use switchman::config::{load_gateway_config, validation::validate_config, GatewayConfig, LoadError};
use switchman::lifecycle::startup;
use switchman::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "switchman")]
#[command(version, about = "Configuration-driven HTTP gateway", long_about = None)]
struct Cli {
    /// Routing configuration file.
    config: PathBuf,

    /// Process options file (TOML).
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Override the gateway listen address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the admin API listen address.
    #[arg(long)]
    admin_bind: Option<String>,

    /// Reload the routing configuration when the file changes.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.options {
        Some(path) => load_gateway_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(admin_bind) = cli.admin_bind {
        config.admin.bind_address = admin_bind;
    }
    if cli.watch {
        config.reload.watch = true;
    }
    validate_config(&config).map_err(LoadError::Validation)?;

    init_logging(&config.observability.log_level);
    tracing::info!("switchman v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        admin_enabled = config.admin.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(&cli.config, config).await?;
    Ok(())
}
