// Application state module
// Immutable per-process state shared by every connection

use std::path::{Path, PathBuf};

use hyper::header::HeaderMap;

use super::types::Config;
use crate::error::StartupError;
use crate::http;

/// Application state
///
/// Built once before the listener opens and only ever read afterwards,
/// so it is shared as `Arc<AppState>` without any locking.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical absolute form of `config.site.root`
    root: PathBuf,
    /// CORS, `Server` and configured override headers for every response
    common_headers: HeaderMap,
}

impl AppState {
    /// Validate the configuration and pin the root directory
    pub fn new(config: Config) -> Result<Self, StartupError> {
        config.validate()?;

        let root = Path::new(&config.site.root).canonicalize().map_err(|e| {
            StartupError::Invalid(format!(
                "site.root '{}' is not accessible: {e}",
                config.site.root
            ))
        })?;
        if !root.is_dir() {
            return Err(StartupError::Invalid(format!(
                "site.root '{}' is not a directory",
                root.display()
            )));
        }

        let common_headers = http::build_common_headers(&config.http)?;

        Ok(Self {
            config,
            root,
            common_headers,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn common_headers(&self) -> &HeaderMap {
        &self.common_headers
    }
}
