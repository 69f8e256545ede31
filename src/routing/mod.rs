//! Routing module
//!
//! Turns request paths into files under the served root:
//! - Path decoding and traversal rejection
//! - Landing page, page alias and package candidate rewrites

pub mod path;
pub mod resolver;

pub use resolver::{resolve, ResolvedTarget, TargetKind};
