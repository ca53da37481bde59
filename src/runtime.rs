//! Active routing table.
//!
//! # Responsibilities
//! - Hold the routing table currently used for dispatch
//! - Swap in a new table atomically (admin API, watcher, SIGHUP)
//! - Remember which file the table was loaded from
//!
//! # Design Decisions
//! - Requests take an `Arc<Server>` snapshot and keep it for their whole
//!   lifetime, so a swap never affects a request already in flight
//! - A failed reload leaves the previous table active
//! - Replacing the configuration writes the file and swaps the table under
//!   one lock, so concurrent writers leave both holding the same version

use arc_swap::ArcSwap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::load_server;
use crate::lang::ParseError;
use crate::routing::Server;

/// Shared gateway state: the routing table and where it came from.
pub struct Runtime {
    server: ArcSwap<Server>,
    config_path: PathBuf,
    write_lock: Mutex<()>,
}

impl Runtime {
    pub fn new(server: Server, config_path: impl Into<PathBuf>) -> Self {
        Self {
            server: ArcSwap::from_pointee(server),
            config_path: config_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Parse the routing configuration at `path` and track its location.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let server = load_server(path)?;
        tracing::info!(path = ?path, endpoints = server.len(), "Routing configuration loaded");
        Ok(Self::new(server, path))
    }

    /// Snapshot of the active routing table.
    pub fn current(&self) -> Arc<Server> {
        self.server.load_full()
    }

    /// Replace the active table. The configuration file is not touched.
    pub fn update_server(&self, server: Server) {
        tracing::info!(endpoints = server.len(), "Routing table updated");
        self.server.store(Arc::new(server));
    }

    /// Persist `source` to the configuration file, then activate `server`.
    ///
    /// `server` must be the table parsed from `source`. On a write error the
    /// active table is left unchanged.
    pub async fn replace_config(&self, source: &[u8], server: Server) -> io::Result<()> {
        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&self.config_path, source).await?;
        self.update_server(server);
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Re-read the configuration file, keeping the current table on failure.
    pub fn reload(&self) -> Result<(), ParseError> {
        let server = load_server(&self.config_path)?;
        self.update_server(server);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ONE: &str = "server { endpoints { /a: redirect { url: /x } } }";
    const TWO: &str = "server { endpoints { /a: redirect { url: /x } /b: redirect { url: /y } } }";

    #[test]
    fn test_load_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchman.conf");
        fs::write(&path, ONE).unwrap();

        let runtime = Runtime::load(&path).unwrap();
        assert_eq!(runtime.current().len(), 1);
        assert_eq!(runtime.config_path(), path.as_path());

        fs::write(&path, TWO).unwrap();
        runtime.reload().unwrap();
        assert_eq!(runtime.current().len(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchman.conf");
        fs::write(&path, ONE).unwrap();
        let runtime = Runtime::load(&path).unwrap();

        fs::write(&path, "server { endpoints { /a: teleport {} } }").unwrap();
        assert!(runtime.reload().is_err());
        assert_eq!(runtime.current().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_config_writes_then_swaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchman.conf");
        fs::write(&path, ONE).unwrap();
        let runtime = Runtime::load(&path).unwrap();

        let table = crate::config::parse_server(TWO.as_bytes()).unwrap();
        runtime.replace_config(TWO.as_bytes(), table).await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), TWO);
        assert_eq!(runtime.current().len(), 2);
    }

    #[tokio::test]
    async fn test_replace_config_write_error_keeps_table() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new(Server::default(), dir.path().join("missing").join("switchman.conf"));

        let table = crate::config::parse_server(ONE.as_bytes()).unwrap();
        assert!(runtime.replace_config(ONE.as_bytes(), table).await.is_err());
        assert!(runtime.current().is_empty());
    }

    #[test]
    fn test_snapshot_survives_update() {
        let runtime = Runtime::new(Server::default(), "unused.conf");
        let snapshot = runtime.current();

        runtime.update_server(crate::config::parse_server(ONE.as_bytes()).unwrap());

        assert!(snapshot.is_empty());
        assert_eq!(runtime.current().len(), 1);
    }
}
