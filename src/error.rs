//! Error types
//!
//! Request-scoped errors never escape a single connection; startup errors are fatal.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Why a request path could not be mapped to a file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// None of the configured package candidates exist yet
    #[error("package not yet available: no candidate file exists")]
    PackageNotYetAvailable,

    #[error("not found: {0}")]
    NotFound(String),

    /// Path tried to leave the root directory or was otherwise malformed
    #[error("path rejected: {0}")]
    PathRejected(String),
}

/// Errors raised while serving a single request
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors before the server starts accepting connections
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
