//! Configuration loading from disk.

use std::fs::{self, File};
use std::path::Path;

use crate::config::parser::parse_server;
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::lang::ParseError;
use crate::routing::Server;

/// Error type for options loading.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "IO error: {}", e),
            LoadError::Parse(e) => write!(f, "Parse error: {}", e),
            LoadError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Load and validate process options from a TOML file.
pub fn load_gateway_config(path: &Path) -> Result<GatewayConfig, LoadError> {
    let content = fs::read_to_string(path).map_err(LoadError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(LoadError::Parse)?;

    validate_config(&config).map_err(LoadError::Validation)?;

    Ok(config)
}

/// Load a routing table from a configuration file.
pub fn load_server(path: &Path) -> Result<Server, ParseError> {
    let file = File::open(path)?;
    parse_server(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_server() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "server {{ endpoints {{ /: redirect {{ url: /home }} }} }}").unwrap();

        let server = load_server(file.path()).unwrap();
        assert_eq!(server.len(), 1);
    }

    #[test]
    fn test_load_server_missing_file() {
        let err = load_server(Path::new("/definitely/not/here.conf")).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }

    #[test]
    fn test_load_gateway_config_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[timeouts]\nrequest_secs = 0\n").unwrap();

        match load_gateway_config(file.path()) {
            Err(LoadError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_gateway_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[listener\n").unwrap();
        assert!(matches!(load_gateway_config(file.path()), Err(LoadError::Parse(_))));
    }
}
