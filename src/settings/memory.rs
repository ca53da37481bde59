//! In-memory settings store.

use dashmap::DashMap;

use super::{check_name, SettingsError, Store};

/// Keeps sections in a concurrent map. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sections: DashMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load_value(&self, name: &str) -> Result<serde_json::Value, SettingsError> {
        check_name(name)?;
        self.sections
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SettingsError::NotFound(name.to_string()))
    }

    fn save_value(&self, name: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        check_name(name)?;
        self.sections.insert(name.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
