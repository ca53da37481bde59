//! Reverse proxy behavior.
//!
//! # Responsibilities
//! - Rewrite the request target onto the backend (`proto://host` + joined path + query)
//! - Forward method, headers and body, streaming in both directions
//! - Turn any upstream failure into a 502
//!
//! # Design Decisions
//! - Connection-level (hop-by-hop) headers are dropped in both directions
//! - `Host` is forwarded unchanged; backends see the name the client used
//! - No retries: the body is streamed and cannot be replayed

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Request, Uri, Version},
    response::Response,
};
use std::time::Instant;
use url::Url;

use crate::endpoints::HttpClient;
use crate::http::response;
use crate::routing::ProxyEndpoint;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Errors building the backend request target.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid backend uri: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),
}

impl ProxyEndpoint {
    pub async fn serve(&self, local_path: &str, request: Request<Body>, client: &HttpClient) -> Response {
        let start = Instant::now();
        let target = match self.target_uri(local_path, request.uri().query()) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(host = %self.host, error = %e, "Failed to build backend request");
                return response::bad_gateway();
            }
        };

        let (mut parts, body) = request.into_parts();
        tracing::debug!(method = %parts.method, uri = %target, "Forwarding request");

        parts.uri = target;
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);

        match client.request(Request::from_parts(parts, body)).await {
            Ok(upstream) => {
                let (mut parts, body) = upstream.into_parts();
                strip_hop_by_hop(&mut parts.headers);
                tracing::debug!(
                    host = %self.host,
                    status = %parts.status,
                    latency = ?start.elapsed(),
                    "Backend responded"
                );
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(host = %self.host, error = %e, "Upstream request failed");
                response::bad_gateway()
            }
        }
    }

    /// The absolute URI on the backend for a request remainder and query.
    pub fn target_uri(&self, local_path: &str, query: Option<&str>) -> Result<Uri, ProxyError> {
        let mut url = Url::parse(&format!("{}://{}", self.proto, self.host))?;
        url.set_path(&join_path(&self.path, local_path));
        url.set_query(query);
        Ok(url.as_str().parse()?)
    }
}

/// Appends a request remainder to the backend base path with a single `/` between them.
pub fn join_path(base: &str, local_path: &str) -> String {
    if local_path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), local_path.trim_start_matches('/'))
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Connection may name further per-hop headers.
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}
