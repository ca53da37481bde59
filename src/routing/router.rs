//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store endpoints in declaration order
//! - Find the first endpoint whose location prefixes the request path
//! - Return the endpoint together with the endpoint-local remainder
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - O(n) prefix scan, acceptable for hand-written configurations
//! - Explicit no-match rather than a silent default

use serde::Serialize;

use crate::routing::endpoint::Endpoint;

/// Routing table: the ordered endpoints of one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Server {
    endpoints: Vec<Endpoint>,
}

/// A dispatched request: the matched endpoint and the path left after its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'s, 'p> {
    pub endpoint: &'s Endpoint,
    pub local_path: &'p str,
}

impl Server {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Finds the first endpoint, in declaration order, whose location is a prefix of `path`.
    pub fn dispatch<'s, 'p>(&'s self, path: &'p str) -> Option<Match<'s, 'p>> {
        self.endpoints.iter().find_map(|endpoint| {
            endpoint
                .local_path(path)
                .map(|local_path| Match { endpoint, local_path })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::endpoint::{EndpointFunction, FilesEndpoint, RedirectEndpoint};

    fn table() -> Server {
        Server::new(vec![
            Endpoint::new(
                "/a",
                EndpointFunction::Files(FilesEndpoint { source: "/x/".into() }),
            ),
            Endpoint::new(
                "/b",
                EndpointFunction::Redirect(RedirectEndpoint { target: "/a".into() }),
            ),
        ])
    }

    #[test]
    fn test_dispatch_prefix() {
        let server = table();

        let m = server.dispatch("/a/index.html").unwrap();
        assert_eq!(m.endpoint.location, "/a");
        assert_eq!(m.local_path, "/index.html");

        let m = server.dispatch("/b").unwrap();
        assert_eq!(m.endpoint.location, "/b");
        assert_eq!(m.local_path, "");

        assert!(server.dispatch("/c").is_none());
    }

    #[test]
    fn test_dispatch_is_not_segment_aware() {
        let server = table();
        let m = server.dispatch("/abc").unwrap();
        assert_eq!(m.endpoint.location, "/a");
        assert_eq!(m.local_path, "bc");
    }

    #[test]
    fn test_first_declared_wins() {
        let catch_all = Endpoint::new(
            "",
            EndpointFunction::Redirect(RedirectEndpoint { target: "/home".into() }),
        );
        let specific = Endpoint::new(
            "/api",
            EndpointFunction::Redirect(RedirectEndpoint { target: "/v2".into() }),
        );

        let server = Server::new(vec![catch_all.clone(), specific.clone()]);
        let m = server.dispatch("/api/users").unwrap();
        assert_eq!(m.endpoint, &catch_all);
        assert_eq!(m.local_path, "/api/users");

        let server = Server::new(vec![specific.clone(), catch_all]);
        assert_eq!(server.dispatch("/api/users").unwrap().endpoint, &specific);
    }

    #[test]
    fn test_empty_table() {
        let server = Server::default();
        assert!(server.is_empty());
        assert!(server.dispatch("/").is_none());
    }
}
