//! MIME type detection module
//!
//! Content-Type lookup by file extension for files served from the root.

use std::path::Path;

/// Get MIME Content-Type for a file path, matching the extension case-insensitively
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    content_type_for_extension(extension.as_deref())
}

fn content_type_for_extension(extension: Option<&str>) -> &'static str {
    match extension {
        // Pages
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("txt" | "md") => "text/plain; charset=utf-8",

        // Images used by download pages
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        // Android packages; other bundle formats fall through to octet-stream
        Some("apk") => "application/vnd.android.package-archive",

        // Archives and documents
        Some("zip") => "application/zip",
        Some("pdf") => "application/pdf",

        _ => "application/octet-stream",
    }
}
