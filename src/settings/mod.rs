//! Settings store for gateway sections such as admin credentials.
//!
//! # Design Decisions
//! - Sections are JSON values keyed by a Name; typed access goes through serde
//! - The trait is object safe so the gateway can hold an `Arc<dyn Store>`
//! - Loading a missing section is an error, not a default

use serde::{de::DeserializeOwned, Serialize};

use crate::lang::Token;

pub mod filesystem;
pub mod memory;

pub use filesystem::FileStore;
pub use memory::MemoryStore;

/// Errors raised by settings stores.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings section '{0}' not found")]
    NotFound(String),
    #[error("'{0}' is not a valid settings section name")]
    InvalidName(String),
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings section has unexpected shape: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Trait for settings storage backends.
pub trait Store: Send + Sync {
    /// Read a section.
    fn load_value(&self, name: &str) -> Result<serde_json::Value, SettingsError>;

    /// Create or replace a section.
    fn save_value(&self, name: &str, value: serde_json::Value) -> Result<(), SettingsError>;

    /// Get storage backend name.
    fn name(&self) -> &'static str;
}

impl dyn Store + '_ {
    /// Read a section into `T`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, SettingsError> {
        Ok(serde_json::from_value(self.load_value(name)?)?)
    }

    /// Store `value` as a section.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), SettingsError> {
        self.save_value(name, serde_json::to_value(value)?)
    }
}

pub(crate) fn check_name(name: &str) -> Result<(), SettingsError> {
    if Token::new(name).is_name() {
        Ok(())
    } else {
        Err(SettingsError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Section {
        api_key: String,
        retries: u32,
    }

    fn stores() -> Vec<(Arc<dyn Store>, tempfile::TempDir)> {
        let dir = tempfile::tempdir().unwrap();
        let file: Arc<dyn Store> = Arc::new(FileStore::new(dir.path()));
        vec![
            (Arc::new(MemoryStore::new()), tempfile::tempdir().unwrap()),
            (file, dir),
        ]
    }

    #[test]
    fn test_typed_round_trip() {
        for (store, _dir) in stores() {
            let section = Section { api_key: "k".into(), retries: 3 };
            store.save("admin", &section).unwrap();
            assert_eq!(store.load::<Section>("admin").unwrap(), section, "{}", store.name());
        }
    }

    #[test]
    fn test_missing_section() {
        for (store, _dir) in stores() {
            let err = store.load::<Section>("admin").unwrap_err();
            assert!(matches!(err, SettingsError::NotFound(ref n) if n == "admin"), "{}", store.name());
        }
    }

    #[test]
    fn test_type_mismatch() {
        for (store, _dir) in stores() {
            store.save("admin", &"just a string").unwrap();
            let err = store.load::<Section>("admin").unwrap_err();
            assert!(matches!(err, SettingsError::Serde(_)), "{}", store.name());
        }
    }

    #[test]
    fn test_invalid_name() {
        for (store, _dir) in stores() {
            let err = store.save("../escape", &1).unwrap_err();
            assert!(matches!(err, SettingsError::InvalidName(_)), "{}", store.name());
        }
    }
}
