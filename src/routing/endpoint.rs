//! Endpoint definitions produced by the configuration parser.

use serde::Serialize;
use std::path::PathBuf;

/// Binds a URL path prefix to an endpoint behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Path prefix. Empty matches every request.
    pub location: String,
    #[serde(flatten)]
    pub function: EndpointFunction,
}

impl Endpoint {
    pub fn new(location: impl Into<String>, function: EndpointFunction) -> Self {
        Self {
            location: location.into(),
            function,
        }
    }

    /// Remainder of `path` after the location, if the location prefixes it.
    pub fn local_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.location.as_str())
    }
}

/// The action applied to requests received by an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EndpointFunction {
    Files(FilesEndpoint),
    Redirect(RedirectEndpoint),
    Proxy(ProxyEndpoint),
}

impl EndpointFunction {
    /// Endpoint type keyword, as written in the configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            EndpointFunction::Files(_) => "files",
            EndpointFunction::Redirect(_) => "redirect",
            EndpointFunction::Proxy(_) => "proxy",
        }
    }
}

/// Serves files from a local directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilesEndpoint {
    /// Directory the files are served from.
    pub source: PathBuf,
}

/// Answers every request with a permanent redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectEndpoint {
    pub target: String,
}

/// Forwards requests to an HTTP backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyEndpoint {
    /// Always `http`.
    pub proto: String,
    /// `hostname:port`.
    pub host: String,
    /// Path prefix on the backend, at least `/`.
    pub path: String,
}
