//! Request handler module
//!
//! Dispatches each request through the resolver and serves the resulting file.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
