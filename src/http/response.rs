//! Fixed gateway responses.
//!
//! # Design Decisions
//! - Not-found and bad-gateway are ordinary responses, never errors
//! - Missing files and traversal attempts share the same not-found body

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

const NOT_FOUND_PAGE: &str =
    "<h1>404</h1> <p>The page you requested does not seem to exist</p>";
const BAD_GATEWAY_PAGE: &str =
    "<h1>502</h1> <p>The server behind this address could not be reached</p>";
const INTERNAL_ERROR_PAGE: &str =
    "<h1>500</h1> <p>The request could not be processed</p>";

fn html(status: StatusCode, page: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        Body::from(page),
    )
        .into_response()
}

pub fn not_found() -> Response {
    html(StatusCode::NOT_FOUND, NOT_FOUND_PAGE)
}

pub fn bad_gateway() -> Response {
    html(StatusCode::BAD_GATEWAY, BAD_GATEWAY_PAGE)
}

pub fn internal_error() -> Response {
    html(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_PAGE)
}
