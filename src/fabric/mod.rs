//! Hyperledger Fabric gateway client.
//!
//! # Data Flow
//! ```text
//! connection profile (JSON) ──┐
//! wallet/<label>.id ──────────┼─▶ gateway.rs (Gateway → Network → Contract)
//!                             │        │
//!                             │        ▼
//!                             └─▶ client.rs (GrpcConnector / GrpcLedgerClient)
//!                                      │  proposal.rs (build + sign)
//!                                      ▼
//!                             gateway.Gateway gRPC service on the peer
//! ```
//!
//! Nothing in this module is cached: every [`Gateway::connect`] opens a new
//! channel for one caller.

pub mod client;
#[cfg(test)]
mod fake_gateway;
pub mod gateway;
pub mod identity;
pub mod profile;
pub mod proposal;
pub mod proto;
pub mod types;
pub mod wallet;

pub use client::GrpcConnector;
pub use gateway::{Connector, Contract, Gateway, GatewayOptions, LedgerClient, Network};
pub use identity::{Identity, TransactionSigner};
pub use profile::ConnectionProfile;
pub use types::{DiscoveryOptions, FabricError, FabricResult, Invocation, InvocationKind};
pub use wallet::Wallet;
