//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handlers, fabric client:
//!     → logging.rs (subscriber setup, structured log events)
//!     → metrics.rs (request and ledger call counters, latency histograms)
//!     → tracing.rs (per-request spans carrying x-request-id)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (when enabled)
//! ```

pub mod logging;
pub mod metrics;
pub mod tracing;
