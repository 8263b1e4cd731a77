//! Asset operations exposed over HTTP.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → service.rs (connection context: profile → wallet → gateway → contract)
//!     → fabric::Contract (one submit or evaluate)
//!     → result or FabricError back to the handler
//! ```
//!
//! A connection context lives for exactly one call and is never shared
//! between requests.

pub mod service;
pub mod types;

pub use service::BridgeService;
pub use types::{AssetValue, CreateAssetRequest, MessageResponse, ASSET_CREATED};
