//! Path resolver
//!
//! Maps a request path to the file that should be served. Rewrite rules are
//! applied in a fixed order:
//!
//! 1. `/` serves the landing page
//! 2. a configured page alias (e.g. `/old`) serves that page
//! 3. a package alias, or any path ending in the package extension, serves the
//!    first candidate that exists on disk
//! 4. anything else is a plain static file under the root
//!
//! Resolution only reads filesystem metadata; it never mutates anything.

use std::path::{Path, PathBuf};

use super::path::{decode_request_path, locate_file};
use crate::config::Config;
use crate::error::ResolveError;
use crate::http::mime;

/// Which rewrite rule produced a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Landing,
    Page,
    Package,
    Static,
}

/// A file that exists under the root and is ready to be served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Canonical absolute path
    pub path: PathBuf,
    pub content_type: String,
    /// Name offered to the client in `Content-Disposition`, packages only
    pub download_filename: Option<String>,
    pub kind: TargetKind,
}

/// Resolve `raw_path` (the URI path, without query string) against `root`
///
/// `root` must be the canonical form of `config.site.root`.
pub fn resolve(
    config: &Config,
    root: &Path,
    raw_path: &str,
) -> Result<ResolvedTarget, ResolveError> {
    if raw_path == "/" {
        return resolve_page(root, &config.site.landing_page, TargetKind::Landing);
    }

    if let Some(page) = config.site.pages.iter().find(|p| p.path == raw_path) {
        return resolve_page(root, &page.file, TargetKind::Page);
    }

    if is_package_request(config, raw_path) {
        return resolve_package(config, root);
    }

    resolve_static(root, raw_path, &config.site.index_files)
}

/// Whether a request path asks for the package download
pub fn is_package_request(config: &Config, raw_path: &str) -> bool {
    if config.package.download_paths.iter().any(|p| p == raw_path) {
        return true;
    }
    config.package.match_extension
        && Path::new(raw_path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(config.package_extension()))
}

/// Pick the first candidate that exists, in declaration order
fn resolve_package(config: &Config, root: &Path) -> Result<ResolvedTarget, ResolveError> {
    config
        .package
        .candidates
        .iter()
        .find_map(|candidate| locate_file(root, Path::new(candidate)))
        .map(|path| ResolvedTarget {
            path,
            content_type: config.package.content_type.clone(),
            download_filename: config.package.download_filename.clone(),
            kind: TargetKind::Package,
        })
        .ok_or(ResolveError::PackageNotYetAvailable)
}

fn resolve_page(root: &Path, file: &str, kind: TargetKind) -> Result<ResolvedTarget, ResolveError> {
    let path = locate_file(root, Path::new(file))
        .ok_or_else(|| ResolveError::NotFound(file.to_string()))?;
    Ok(plain_target(path, kind))
}

fn resolve_static(
    root: &Path,
    raw_path: &str,
    index_files: &[String],
) -> Result<ResolvedTarget, ResolveError> {
    let relative = decode_request_path(raw_path)?;
    let not_found = || ResolveError::NotFound(raw_path.to_string());

    let joined = root.join(&relative);
    let path = if joined.is_dir() {
        index_files
            .iter()
            .find_map(|index| locate_file(root, &relative.join(index)))
            .ok_or_else(not_found)?
    } else {
        locate_file(root, &relative).ok_or_else(not_found)?
    };

    Ok(plain_target(path, TargetKind::Static))
}

fn plain_target(path: PathBuf, kind: TargetKind) -> ResolvedTarget {
    let content_type = mime::content_type_for(&path).to_string();
    ResolvedTarget {
        path,
        content_type,
        download_filename: None,
        kind,
    }
}
