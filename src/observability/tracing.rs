//! Per-request spans.
//!
//! Every request span carries the `x-request-id` assigned by the request-id
//! layer, so log lines from the handler and the fabric client can be
//! correlated.

use axum::body::Body;
use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;

use crate::http::request::request_id;

/// Builds the `request` span used by the HTTP trace layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl MakeSpan<Body> for RequestSpan {
    fn make_span(&mut self, request: &Request<Body>) -> Span {
        tracing::info_span!(
            "request",
            request_id = %request_id(request.headers()),
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}
