//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files, and
//! the defaults reproduce the fixed constants the bridge runs with when no
//! config file is given.

use serde::{Deserialize, Serialize};

/// Root configuration for the asset bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Fabric network, identity and contract selection.
    pub fabric: FabricConfig,

    /// Network client timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Maximum requests handled concurrently (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            max_connections: 1_024,
        }
    }
}

/// Everything needed to build a connection context for one request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FabricConfig {
    /// Path to the connection profile (JSON), re-read on every request.
    pub connection_profile: String,

    /// Directory of the file-system wallet.
    pub wallet_path: String,

    /// Wallet label of the identity used to sign transactions.
    pub identity: String,

    /// Channel the contract is deployed on.
    pub channel: String,

    /// Chaincode name.
    pub chaincode: String,

    /// Service discovery options passed to the gateway.
    pub discovery: DiscoveryConfig,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            connection_profile: "Rest-api/connection.json".to_string(),
            wallet_path: "wallet".to_string(),
            identity: "User1".to_string(),
            channel: "mychannel".to_string(),
            chaincode: "asset-transfer-basic".to_string(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// Discovery options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Let the gateway peer pick endorsers.
    pub enabled: bool,

    /// Treat network endpoints as reachable on localhost.
    pub as_localhost: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            as_localhost: true,
        }
    }
}

/// Timeouts applied by the gateway client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Gateway connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per gRPC call timeout in seconds. Overridden by the connection
    /// profile's endorser timeout when present.
    pub call_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            call_secs: 300,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 100 * 1024, // 100 KiB
        }
    }
}
