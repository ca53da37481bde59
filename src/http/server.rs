//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with the catch-all gateway handler
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Dispatch requests against the active routing table
//! - Apply routing table updates pushed by the watcher
//! - Shut down gracefully on the broadcast signal

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::endpoints::{Remainder, ServeContext};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::Server;
use crate::runtime::Runtime;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<Runtime>,
    pub context: Arc<ServeContext>,
}

/// Public gateway server.
pub struct HttpServer {
    runtime: Arc<Runtime>,
    router: Router,
}

impl HttpServer {
    pub fn new(runtime: Arc<Runtime>, config: &GatewayConfig) -> Self {
        let state = AppState {
            runtime: runtime.clone(),
            context: Arc::new(ServeContext::new(config)),
        };
        let router = Self::build_router(state, Duration::from_secs(config.timeouts.request_secs));
        Self { runtime, router }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// The router, for driving the gateway without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<Server>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let runtime = self.runtime.clone();
        tokio::spawn(async move {
            while let Some(server) = config_updates.recv().await {
                runtime.update_server(server);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: dispatch on the decoded path and run the endpoint behavior
/// with both forms of the remainder.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let request_id = request.request_id().to_string();

    let raw_path = request.uri().path().to_string();
    let decoded = urlencoding::decode(&raw_path).map(|p| p.into_owned()).ok();
    let path = decoded.as_deref().unwrap_or(raw_path.as_str());

    // Held for the whole request so a concurrent swap cannot affect it.
    let server = state.runtime.current();

    let Some(matched) = server.dispatch(path) else {
        tracing::debug!(request_id = %request_id, path = %path, "No endpoint matched");
        let response = response::not_found();
        metrics::record_request(&method, response.status().as_u16(), "none", start);
        return response;
    };

    let kind = matched.endpoint.function.kind();
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        location = %matched.endpoint.location,
        endpoint = kind,
        "Dispatching request"
    );

    let remainder = if decoded.is_some() {
        Remainder {
            decoded: matched.local_path,
            raw: raw_remainder(&raw_path, matched.endpoint.location.len()),
        }
    } else {
        Remainder::plain(matched.local_path)
    };

    let response = matched.endpoint.function.serve(remainder, request, &state.context).await;

    metrics::record_request(&method, response.status().as_u16(), kind, start);
    response
}

/// The part of an encoded path left after the first `decoded_len` decoded bytes.
///
/// A `%XX` escape counts as one decoded byte; anything else counts as itself.
fn raw_remainder(raw: &str, decoded_len: usize) -> &str {
    let bytes = raw.as_bytes();
    let mut i = 0;
    let mut consumed = 0;
    while consumed < decoded_len && i < bytes.len() {
        let escaped = bytes[i] == b'%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
        i += if escaped { 3 } else { 1 };
        consumed += 1;
    }
    raw.get(i..).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_server;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    fn server_for(source: &str) -> HttpServer {
        let table = parse_server(source.as_bytes()).unwrap();
        let runtime = Arc::new(Runtime::new(table, "switchman.conf"));
        HttpServer::new(runtime, &GatewayConfig::default())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_redirect_dispatch() {
        let server = server_for("server { endpoints { /old: redirect { url: /new } } }");
        let response = server.router().oneshot(get("/old/page")).await.unwrap();

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/new");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unmatched_is_not_found() {
        let server = server_for("server { endpoints { /old: redirect { url: /new } } }");
        let response = server.router().oneshot(get("/other")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_path_is_decoded_before_dispatch() {
        let server = server_for("server { endpoints { \"/a b\": redirect { url: /spaced } } }");
        let response = server.router().oneshot(get("/a%20b")).await.unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[test]
    fn test_raw_remainder_keeps_escapes() {
        assert_eq!(raw_remainder("/api/100%25", 4), "/100%25");
        assert_eq!(raw_remainder("/api/a%2Fb", 4), "/a%2Fb");
        assert_eq!(raw_remainder("/a%20b/c", 4), "/c");
        assert_eq!(raw_remainder("/api", 4), "");
        assert_eq!(raw_remainder("/", 1), "");
        assert_eq!(raw_remainder("/100%zz", 1), "100%zz");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let server = server_for("server { endpoints { /: redirect { url: /x } } }");
        let request = Request::builder()
            .uri("/")
            .header("x-request-id", "fixed-id")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "fixed-id");
    }

    #[tokio::test]
    async fn test_table_swap_applies_to_new_requests() {
        let server = server_for("server { endpoints { /a: redirect { url: /x } } }");
        let router = server.router();

        server
            .runtime
            .update_server(parse_server("server { endpoints { /b: redirect { url: /y } } }".as_bytes()).unwrap());

        let a = router.clone().oneshot(get("/a")).await.unwrap();
        let b = router.oneshot(get("/b")).await.unwrap();
        assert_eq!(a.status(), StatusCode::NOT_FOUND);
        assert_eq!(b.status(), StatusCode::MOVED_PERMANENTLY);
    }
}
