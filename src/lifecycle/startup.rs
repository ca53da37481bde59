//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the routing configuration and build the runtime
//! - Prepare the settings store, seed admin credentials and load accounts
//! - Start background tasks (metrics, watcher, signal listeners)
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admin::{setup_admin_router, AdminState};
use crate::auth::{AdminCredentials, AuthError, AuthManager, CREDENTIALS_SECTION};
use crate::config::watcher::ConfigWatcher;
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lang::ParseError;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::runtime::Runtime;
use crate::settings::{FileStore, MemoryStore, SettingsError, Store};

/// Fatal errors while bringing the gateway up.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load routing configuration: {0}")]
    Config(#[from] ParseError),
    #[error("failed to prepare settings store: {0}")]
    Settings(#[from] SettingsError),
    #[error("failed to load admin accounts: {0}")]
    Auth(#[from] AuthError),
    #[error("failed to watch routing configuration: {0}")]
    Watch(#[from] notify::Error),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Settings store selected by the options file.
pub fn open_store(config: &GatewayConfig) -> Result<Arc<dyn Store>, SettingsError> {
    let store: Arc<dyn Store> = match &config.settings.directory {
        Some(directory) => Arc::new(FileStore::new(directory)),
        None => Arc::new(MemoryStore::new()),
    };

    if let Some(api_key) = &config.admin.api_key {
        store.save(CREDENTIALS_SECTION, &AdminCredentials { api_key: api_key.clone() })?;
    }

    tracing::info!(backend = store.name(), "Settings store ready");
    Ok(store)
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Run the gateway until a shutdown signal arrives.
pub async fn run(config_path: &Path, config: GatewayConfig) -> Result<(), StartupError> {
    let runtime = Arc::new(Runtime::load(config_path)?);
    let store = open_store(&config)?;
    let auth = Arc::new(AuthManager::new(store)?);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_shutdown_listener(shutdown.clone());
    signals::spawn_reload_listener(runtime.clone(), auth.clone(), shutdown.subscribe());

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = if config.reload.watch {
        let (watcher, updates) = ConfigWatcher::new(config_path);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    if config.admin.enabled {
        let listener = bind(&config.admin.bind_address).await?;
        let app = setup_admin_router(
            AdminState {
                runtime: runtime.clone(),
                auth,
            },
            &config.admin,
        );
        let mut admin_shutdown = shutdown.subscribe();
        tracing::info!(address = %config.admin.bind_address, "Admin API listening");
        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = admin_shutdown.recv().await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Admin API stopped with error");
            }
        });
    }

    let listener = bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(runtime, &config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_store_seeds_credentials() {
        let mut config = GatewayConfig::default();
        config.admin.api_key = Some("secret".into());

        let store = open_store(&config).unwrap();
        let credentials: AdminCredentials = store.load(CREDENTIALS_SECTION).unwrap();
        assert_eq!(credentials.api_key, "secret");

        let auth = AuthManager::new(store).unwrap();
        assert_eq!(auth.authorize(Some("secret")).unwrap(), crate::auth::Principal::ApiKey);
    }

    #[test]
    fn test_open_store_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GatewayConfig::default();
        config.settings.directory = Some(dir.path().to_path_buf());

        let store = open_store(&config).unwrap();
        assert_eq!(store.name(), "filesystem");
        assert!(matches!(
            store.load::<AdminCredentials>(CREDENTIALS_SECTION),
            Err(SettingsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_routing_config_fails() {
        let err = run(Path::new("/definitely/not/here.conf"), GatewayConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::Config(ParseError::Io(_))));
    }
}
