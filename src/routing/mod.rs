//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path (percent-decoded)
//!     → router.rs (scan endpoints in declaration order)
//!     → first endpoint whose location prefixes the path
//!     → Match { endpoint, local_path } or explicit no-match
//! ```
//!
//! # Design Decisions
//! - Built once per successful parse, immutable afterwards
//! - First match wins; declaration order is the only priority
//! - Plain string prefix matching, not segment aware
//! - Hot reload swaps the whole table, entries are never edited in place

pub mod endpoint;
pub mod router;

pub use endpoint::{Endpoint, EndpointFunction, FilesEndpoint, ProxyEndpoint, RedirectEndpoint};
pub use router::{Match, Server};
