//! Headers added to every response
//!
//! The set is built once at startup from configuration so that request handling
//! never has to parse header names or values.

use hyper::header::{HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::Response;

use crate::config::HttpConfig;
use crate::error::StartupError;

/// Build the header set stamped onto every response
///
/// Configured overrides go in first; `Access-Control-Allow-Origin: *` is inserted
/// last so no override can narrow it.
pub fn build_common_headers(http: &HttpConfig) -> Result<HeaderMap, StartupError> {
    let mut headers = HeaderMap::new();

    let server = HeaderValue::from_str(&http.server_name)
        .map_err(|e| StartupError::Invalid(format!("http.server_name: {e}")))?;
    headers.insert(SERVER, server);

    for header in &http.headers {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|e| StartupError::Invalid(format!("header name '{}': {e}", header.name)))?;
        let value = HeaderValue::from_str(&header.value)
            .map_err(|e| StartupError::Invalid(format!("header '{}' value: {e}", header.name)))?;
        headers.insert(name, value);
    }

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    Ok(headers)
}

/// Copy the common headers onto a response, replacing same-named headers
pub fn apply_common_headers<B>(response: &mut Response<B>, common: &HeaderMap) {
    let headers = response.headers_mut();
    for (name, value) in common {
        headers.insert(name.clone(), value.clone());
    }
}
