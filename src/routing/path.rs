//! Request path decoding and traversal checks
//!
//! Every path that reaches the filesystem goes through here. Paths that try to
//! climb out of the root are rejected outright, never normalized.

use std::path::{Component, Path, PathBuf};

use crate::error::ResolveError;

/// Decode a URI path into a path relative to the served root
///
/// Empty and `.` segments are dropped. `..` segments, NUL bytes, backslashes and
/// undecodable bytes cause the whole request to be rejected.
pub fn decode_request_path(raw: &str) -> Result<PathBuf, ResolveError> {
    let reject = || ResolveError::PathRejected(raw.to_string());

    let decoded = percent_decode(raw).ok_or_else(reject)?;
    if decoded.contains(['\0', '\\']) {
        return Err(reject());
    }

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(reject()),
            name => {
                // A segment like "C:" would become a prefix component on Windows
                let mut components = Path::new(name).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => relative.push(name),
                    _ => return Err(reject()),
                }
            }
        }
    }

    Ok(relative)
}

/// Whether a configured path stays inside the root when joined to it
pub fn is_safe_relative(value: &str) -> bool {
    !value.is_empty()
        && !value.contains(['\0', '\\'])
        && Path::new(value)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && Path::new(value)
            .components()
            .any(|c| matches!(c, Component::Normal(_)))
}

/// Canonical path of `root/relative` if it is a regular file that really lives under `root`
///
/// `root` must already be canonical. Symlinks pointing outside the root are refused.
pub fn locate_file(root: &Path, relative: &Path) -> Option<PathBuf> {
    let canonical = root.join(relative).canonicalize().ok()?;
    if !canonical.starts_with(root) {
        crate::logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            relative.display(),
            canonical.display()
        ));
        return None;
    }
    canonical.is_file().then_some(canonical)
}

/// Percent-decode a URI path, `None` if the result is not valid UTF-8
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((h << 4) | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
