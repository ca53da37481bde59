//! Proxy target URL validation.
//!
//! Accepted shape: `[http://][hostname][:port][/path]`. Query strings and
//! fragments are rejected; missing parts default to `http`, `localhost`,
//! `80` and `/`.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::routing::ProxyEndpoint;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<scheme>[^:/?#]*)://)?(?P<host>[^:/?#]*)(?::(?P<port>[^/?#]*))?(?P<path>/[^?#]*)?(?P<query>\?[^#]*)?(?P<fragment>#.*)?$",
    )
    .expect("proxy url pattern is valid")
});

static HOSTNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$",
    )
    .expect("hostname pattern is valid")
});

const DEFAULT_PROTO: &str = "http";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyUrlError {
    #[error("url is empty")]
    Empty,

    #[error("'{0}' is not a valid url")]
    Malformed(String),

    #[error("protocol '{0}' not supported")]
    UnsupportedProtocol(String),

    #[error("'{0}' is not a valid hostname")]
    InvalidHostname(String),

    #[error("'{0}' is not a valid port")]
    InvalidPort(String),

    #[error("query is not allowed in a proxy url")]
    QueryNotAllowed,

    #[error("fragment is not allowed in a proxy url")]
    FragmentNotAllowed,
}

/// Validates a proxy url and fills in the defaults.
pub fn parse_proxy_url(url: &str) -> Result<ProxyEndpoint, ProxyUrlError> {
    if url.is_empty() {
        return Err(ProxyUrlError::Empty);
    }

    let caps = URL_PATTERN
        .captures(url)
        .ok_or_else(|| ProxyUrlError::Malformed(url.to_string()))?;

    if caps.name("query").is_some() {
        return Err(ProxyUrlError::QueryNotAllowed);
    }
    if caps.name("fragment").is_some() {
        return Err(ProxyUrlError::FragmentNotAllowed);
    }

    if let Some(scheme) = caps.name("scheme") {
        if scheme.as_str() != DEFAULT_PROTO {
            return Err(ProxyUrlError::UnsupportedProtocol(scheme.as_str().to_string()));
        }
    }

    let hostname = match caps.name("host").map(|m| m.as_str()) {
        None | Some("") => DEFAULT_HOST,
        Some(host) if HOSTNAME_PATTERN.is_match(host) => host,
        Some(host) => return Err(ProxyUrlError::InvalidHostname(host.to_string())),
    };

    let port = match caps.name("port").map(|m| m.as_str()) {
        None => DEFAULT_PORT,
        Some(port) => match port.parse::<u16>() {
            Ok(p) if p > 0 => p,
            _ => return Err(ProxyUrlError::InvalidPort(port.to_string())),
        },
    };

    let path = caps.name("path").map_or("/", |m| m.as_str());

    Ok(ProxyEndpoint {
        proto: DEFAULT_PROTO.to_string(),
        host: format!("{hostname}:{port}"),
        path: path.to_string(),
    })
}
