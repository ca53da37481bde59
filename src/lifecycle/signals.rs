//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT/SIGTERM and trigger graceful shutdown
//! - Reload the routing configuration and admin accounts on SIGHUP
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::auth::AuthManager;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::runtime::Runtime;

/// Resolve when the process is asked to stop.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Trigger `shutdown` once a stop signal arrives.
pub fn spawn_shutdown_listener(shutdown: Shutdown) {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        shutdown.trigger();
    });
}

/// Reload the routing configuration and accounts on every SIGHUP until shutdown.
#[cfg(unix)]
pub fn spawn_reload_listener(
    runtime: Arc<Runtime>,
    auth: Arc<AuthManager>,
    mut shutdown: broadcast::Receiver<()>,
) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for SIGHUP, reload on signal disabled");
            return;
        }
    };

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    tracing::info!(path = ?runtime.config_path(), "SIGHUP received, reloading configuration");
                    match runtime.reload() {
                        Ok(()) => metrics::record_reload(true),
                        Err(e) => {
                            metrics::record_reload(false);
                            tracing::error!(error = %e, "Reload failed, keeping current configuration");
                        }
                    }
                    if let Err(e) = auth.reload() {
                        tracing::error!(error = %e, "Auth reload failed, keeping current accounts");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_listener(
    _runtime: Arc<Runtime>,
    _auth: Arc<AuthManager>,
    _shutdown: broadcast::Receiver<()>,
) {
}
