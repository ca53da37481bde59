//! Switchman: a configuration-driven HTTP gateway.

pub mod admin;
pub mod auth;
pub mod config;
pub mod endpoints;
pub mod http;
pub mod lang;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod runtime;
pub mod settings;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use runtime::Runtime;
