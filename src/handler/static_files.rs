//! File serving module
//!
//! Reads resolved targets from disk and builds their responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::error::{ResolveError, ServeError};
use crate::http;
use crate::logger;
use crate::routing::{ResolvedTarget, TargetKind};

/// Read a resolved target in full
///
/// The whole file is read before any byte is sent, so the response length is
/// always the length of what was actually read.
pub async fn load_target(target: &ResolvedTarget) -> Result<Bytes, ServeError> {
    fs::read(&target.path)
        .await
        .map(Bytes::from)
        .map_err(|source| ServeError::Io {
            path: target.path.clone(),
            source,
        })
}

/// Serve a resolved target
pub async fn serve_target(target: &ResolvedTarget, is_head: bool) -> Response<Full<Bytes>> {
    let data = match load_target(target).await {
        Ok(data) => data,
        Err(err) => return error_response(&err, is_head),
    };

    match target.kind {
        TargetKind::Package => http::build_package_response(
            data,
            &target.content_type,
            target.download_filename.as_deref(),
            is_head,
        ),
        TargetKind::Landing | TargetKind::Page | TargetKind::Static => {
            http::build_file_response(data, &target.content_type, is_head)
        }
    }
}

/// Map a serving error to its response
pub fn error_response(err: &ServeError, is_head: bool) -> Response<Full<Bytes>> {
    match err {
        ServeError::Resolve(ResolveError::PackageNotYetAvailable) => {
            http::build_not_ready_response(is_head)
        }
        ServeError::Resolve(ResolveError::NotFound(_)) => http::build_404_response(),
        ServeError::Resolve(ResolveError::PathRejected(path)) => {
            logger::log_warning(&format!("Rejected request path: {path}"));
            http::build_404_response()
        }
        ServeError::Io { .. } => {
            logger::log_error(&err.to_string());
            http::build_500_response()
        }
    }
}
