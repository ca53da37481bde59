//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware)
//!     → request.rs (request ID)
//!     → runtime snapshot → routing::Server::dispatch
//!     → endpoints (files, redirect, proxy)
//!     → response.rs (fixed not-found / bad-gateway pages)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
