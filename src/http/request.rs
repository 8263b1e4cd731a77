//! Request identification.
//!
//! The request-id layer assigns a UUID `x-request-id` to every request that
//! arrives without one; handlers and spans read it back from the headers.

use axum::http::{HeaderMap, HeaderName};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request's `x-request-id`, or `"unknown"` when absent or not UTF-8.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
