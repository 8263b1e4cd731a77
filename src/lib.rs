//! HTTP bridge to a Hyperledger Fabric asset contract.

pub mod bridge;
pub mod config;
pub mod fabric;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use bridge::BridgeService;
pub use config::schema::BridgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
