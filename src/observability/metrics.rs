//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): HTTP requests by operation, status
//! - `bridge_request_duration_seconds` (histogram): HTTP latency by operation
//! - `bridge_ledger_calls_total` (counter): contract calls by transaction,
//!   kind (submit/evaluate) and outcome
//! - `bridge_ledger_call_duration_seconds` (histogram): contract call latency
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::fabric::InvocationKind;

/// Install the Prometheus recorder and its HTTP listener on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled HTTP request.
pub fn record_request(operation: &'static str, status: u16, start: Instant) {
    counter!(
        "bridge_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("bridge_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record one contract call.
pub fn record_ledger_call(transaction: &str, kind: InvocationKind, ok: bool, start: Instant) {
    let outcome = if ok { "success" } else { "error" };
    counter!(
        "bridge_ledger_calls_total",
        "transaction" => transaction.to_string(),
        "kind" => kind.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "bridge_ledger_call_duration_seconds",
        "transaction" => transaction.to_string(),
        "kind" => kind.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
