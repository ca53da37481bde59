//! Redirect behavior.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::response;
use crate::routing::RedirectEndpoint;

impl RedirectEndpoint {
    /// Permanent redirect to the configured target; the local path is ignored.
    pub fn serve(&self) -> Response {
        match HeaderValue::from_str(&self.target) {
            Ok(location) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response(),
            Err(e) => {
                tracing::error!(target_url = %self.target, error = %e, "Redirect target is not a valid header");
                response::internal_error()
            }
        }
    }
}
