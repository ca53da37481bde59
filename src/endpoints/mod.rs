//! Endpoint behaviors.
//!
//! # Data Flow
//! ```text
//! routing::Match { endpoint, local_path } + raw remainder
//!     → Remainder { decoded, raw }
//!     → EndpointFunction::serve
//!         Files    → files.rs (resolve under root, stream file)
//!         Redirect → redirect.rs (301 + Location)
//!         Proxy    → proxy.rs (rewrite target, forward, stream back)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Behaviors never fail: problems become not-found or bad-gateway responses
//! - One HTTP client is shared by every proxy endpoint
//! - Files resolve the decoded remainder; proxies forward the remainder
//!   exactly as the client encoded it

pub mod files;
pub mod proxy;
pub mod redirect;

use axum::{body::Body, http::Request, response::Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::routing::EndpointFunction;

/// Client used to reach proxy backends.
pub type HttpClient = Client<HttpConnector, Body>;

/// Shared state the behaviors need besides the endpoint itself.
#[derive(Clone)]
pub struct ServeContext {
    pub client: HttpClient,
    /// Document served for an empty remainder or a directory.
    pub index_file: String,
}

impl ServeContext {
    pub fn new(config: &GatewayConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

        Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
            index_file: config.files.index.clone(),
        }
    }
}

/// The path remaining after the endpoint location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remainder<'a> {
    /// Percent-decoded, as used for dispatch.
    pub decoded: &'a str,
    /// As it appeared in the request target.
    pub raw: &'a str,
}

impl<'a> Remainder<'a> {
    /// A remainder with no escapes, where both forms are the same.
    pub fn plain(path: &'a str) -> Self {
        Self { decoded: path, raw: path }
    }
}

impl EndpointFunction {
    /// Handles a request given the path remaining after the endpoint location.
    pub async fn serve(&self, remainder: Remainder<'_>, request: Request<Body>, ctx: &ServeContext) -> Response {
        match self {
            EndpointFunction::Files(files) => files.serve(remainder.decoded, &ctx.index_file).await,
            EndpointFunction::Redirect(redirect) => redirect.serve(),
            EndpointFunction::Proxy(proxy) => proxy.serve(remainder.raw, request, &ctx.client).await,
        }
    }
}
