//! Filesystem settings store.
//!
//! One pretty-printed `<name>.json` file per section inside a directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{check_name, SettingsError, Store};

#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn section_path(&self, name: &str) -> Result<PathBuf, SettingsError> {
        check_name(name)?;
        Ok(self.directory.join(format!("{name}.json")))
    }
}

impl Store for FileStore {
    fn load_value(&self, name: &str) -> Result<serde_json::Value, SettingsError> {
        let path = self.section_path(name)?;
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SettingsError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&content)?)
    }

    fn save_value(&self, name: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let path = self.section_path(name)?;
        fs::create_dir_all(&self.directory)?;
        fs::write(path, serde_json::to_vec_pretty(&value)?)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("settings"));
        store.save_value("admin", serde_json::json!({ "api_key": "secret" })).unwrap();

        let written = fs::read_to_string(store.directory().join("admin.json")).unwrap();
        assert!(written.contains("\"api_key\": \"secret\""));
    }
}
