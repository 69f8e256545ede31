//! Logger module
//!
//! Provides logging utilities for the distribution server including:
//! - Startup banner with local and LAN download URLs
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{AppState, LoggingConfig};
use std::net::{IpAddr, SocketAddr};

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(logging: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        logging.access_log_file.as_deref(),
        logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, lan_ip: IpAddr, state: &AppState) {
    let config = &state.config;
    let port = addr.port();

    write_info("======================================");
    write_info("APK download server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Serving directory: {}", state.root().display()));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!("Landing page: {}", config.site.landing_page));
    write_info(&format!("  Local:   http://localhost:{port}/"));
    write_info(&format!("  Network: http://{}/", SocketAddr::new(lan_ip, port)));
    for page in &config.site.pages {
        write_info(&format!(
            "Page {} -> {} (http://{}{})",
            page.path,
            page.file,
            SocketAddr::new(lan_ip, port),
            page.path
        ));
    }
    for path in &config.package.download_paths {
        write_info(&format!(
            "Package download: http://{}{path}",
            SocketAddr::new(lan_ip, port)
        ));
    }
    if config.package.match_extension {
        write_info(&format!(
            "Any *.{} request serves the first available candidate:",
            config.package_extension()
        ));
    } else {
        write_info("Package candidates (first existing wins):");
    }
    for (i, candidate) in config.package.candidates.iter().enumerate() {
        let marker = if state.root().join(candidate).is_file() {
            "present"
        } else {
            "missing"
        };
        write_info(&format!("  {}. {candidate} [{marker}]", i + 1));
    }
    if let Some(name) = &config.package.download_filename {
        write_info(&format!("Download filename: {name}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("Press Ctrl+C to stop the server");
    write_info("======================================\n");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    match writer::get() {
        Some(w) => w.write_access(&entry.format(format)),
        None => println!("{}", entry.format(format)),
    }
}

pub fn log_shutdown(signal: &str) {
    write_info(&format!("\n[SIGNAL] {signal} received, server stopped"));
}
