//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!     → shared via Arc with the request handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults; with no file the bridge runs on the
//!   fixed identity/channel/chaincode constants
//! - The connection profile and wallet named here are NOT cached: they are
//!   re-read for every request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::BridgeConfig;
pub use schema::DiscoveryConfig;
pub use schema::FabricConfig;
pub use schema::ListenerConfig;
