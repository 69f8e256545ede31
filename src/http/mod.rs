//! HTTP protocol layer module
//!
//! Content types, response builders and the headers stamped onto every response.

pub mod headers;
pub mod mime;
pub mod response;

pub use headers::{apply_common_headers, build_common_headers};
pub use response::{
    build_404_response, build_405_response, build_500_response, build_file_response,
    build_not_ready_response, build_options_response, build_package_response,
};
