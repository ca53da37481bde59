use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::config::parse_server;
use crate::routing::Endpoint;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        endpoints: state.runtime.current().len(),
    })
}

pub async fn get_endpoints(State(state): State<AdminState>) -> Json<Vec<Endpoint>> {
    Json(state.runtime.current().endpoints().to_vec())
}

/// Current contents of the routing configuration file.
pub async fn get_config(State(state): State<AdminState>) -> Response {
    let path = state.runtime.config_path();
    match tokio::fs::read_to_string(path).await {
        Ok(content) => content.into_response(),
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to read config file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading config file").into_response()
        }
    }
}

/// Validate, persist and activate a new routing configuration.
///
/// The file is only rewritten, and the table only swapped, when the body parses.
pub async fn put_config(State(state): State<AdminState>, body: Bytes) -> Response {
    let server = match parse_server(&body[..]) {
        Ok(server) => server,
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    };

    let path = state.runtime.config_path();
    if let Err(e) = state.runtime.replace_config(&body, server).await {
        tracing::error!(path = ?path, error = %e, "Failed to update config file");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error updating config file").into_response();
    }

    tracing::info!(path = ?path, "Config file updated via admin API");
    StatusCode::OK.into_response()
}

/// Parse a routing configuration without applying it.
pub async fn verify(body: Bytes) -> Response {
    match parse_server(&body[..]) {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    }
}
