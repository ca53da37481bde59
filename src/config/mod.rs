//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! routing config file (custom language)
//!     → loader.rs (open file)
//!     → parser.rs (grammar on top of lang::Reader)
//!     → proxy_url.rs (proxy target validation)
//!     → routing::Server (validated, immutable)
//!
//! options file (TOML)
//!     → loader.rs (deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig
//!
//! On change:
//!     watcher.rs detects modification
//!     → parser.rs re-parses
//!     → new Server sent to the HTTP server for an atomic swap
//! ```
//!
//! # Design Decisions
//! - A routing table is all-or-nothing: no partial tables on error
//! - All option fields have defaults to allow minimal files
//! - A failed reload keeps the previous table

pub mod loader;
pub mod parser;
pub mod proxy_url;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_gateway_config, load_server, LoadError};
pub use parser::parse_server;
pub use proxy_url::{parse_proxy_url, ProxyUrlError};
pub use schema::{
    AdminConfig, FilesConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, ReloadConfig,
    SettingsConfig, TimeoutConfig,
};
