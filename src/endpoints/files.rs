//! Static file behavior.
//!
//! # Responsibilities
//! - Map the local path to a file under the configured source directory
//! - Refuse anything that would leave that directory
//! - Stream the file with a content type derived from its extension
//!
//! # Design Decisions
//! - Traversal attempts and missing files are indistinguishable (404)
//! - `..` is resolved lexically first, then the canonical path is re-checked
//!   so symlinks cannot point outside the root

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;

use crate::http::response;
use crate::routing::FilesEndpoint;

impl FilesEndpoint {
    pub async fn serve(&self, local_path: &str, index_file: &str) -> Response {
        let Some(relative) = resolve_local_path(local_path) else {
            tracing::debug!(local_path = %local_path, "Rejected path outside of file root");
            return response::not_found();
        };

        let Some(path) = locate(&self.source, &relative, index_file).await else {
            tracing::debug!(local_path = %local_path, root = ?self.source, "File not found");
            return response::not_found();
        };

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(path = ?path, error = %e, "Failed to open file");
                return response::not_found();
            }
        };
        let length = match file.metadata().await {
            Ok(metadata) => metadata.len(),
            Err(_) => return response::not_found(),
        };

        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        tracing::debug!(path = ?path, mime = %mime, "Serving file");

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime.as_ref())
            .header(header::CONTENT_LENGTH, length)
            .body(Body::from_stream(ReaderStream::new(file)))
            .unwrap_or_else(|_| response::internal_error())
    }
}

/// Resolves `.` and `..` in a request remainder.
///
/// Returns `None` when the path would climb above the root or contains
/// characters that cannot be part of a file name.
pub fn resolve_local_path(local_path: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in local_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s if s.contains(['\\', '\0']) => return None,
            s => segments.push(s),
        }
    }
    Some(segments.iter().collect())
}

/// Finds the file to serve, falling back to the index document for directories.
async fn locate(root: &Path, relative: &Path, index_file: &str) -> Option<PathBuf> {
    let mut path = root.join(relative);
    if fs::metadata(&path).await.ok()?.is_dir() {
        path.push(index_file);
    }

    let canonical_root = fs::canonicalize(root).await.ok()?;
    let canonical = fs::canonicalize(&path).await.ok()?;
    if !canonical.starts_with(&canonical_root) {
        return None;
    }

    fs::metadata(&canonical)
        .await
        .ok()
        .filter(|m| m.is_file())
        .map(|_| canonical)
}
