//! Administrative API.
//!
//! # Responsibilities
//! - Read, verify and replace the routing configuration at runtime
//! - Report the active endpoints and process status
//! - Sign admin users in and manage their accounts
//! - Guard every route except `/login` with a session token or the API key
//!
//! # Design Decisions
//! - Runs on its own listener, separate from gateway traffic
//! - A rejected configuration changes neither the file nor the active table

pub mod auth;
pub mod handlers;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use self::users::*;
use crate::auth::AuthManager;
use crate::config::AdminConfig;
use crate::runtime::Runtime;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub runtime: Arc<Runtime>,
    pub auth: Arc<AuthManager>,
}

pub fn setup_admin_router(state: AdminState, config: &AdminConfig) -> Router {
    Router::new()
        .route("/config", get(get_config).post(put_config))
        .route("/verify", post(verify))
        .route("/endpoints", get(get_endpoints))
        .route("/status", get(get_status))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).patch(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .route("/login", post(login))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_config_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
