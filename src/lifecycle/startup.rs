//! Startup orchestration.
//!
//! Order: metrics exporter, listener bind, signal handling, serve. Any
//! startup error is fatal; traffic is accepted only once the listener is
//! bound.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::BridgeConfig;
use crate::fabric::GrpcConnector;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid {field} '{value}': {source}")]
    Address {
        field: &'static str,
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the bridge with the production gRPC connector until a termination
/// signal arrives.
pub async fn run(config: BridgeConfig) -> Result<(), StartupError> {
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());
    run_until(config, shutdown).await
}

/// Like [`run`], but stops when `shutdown` is triggered by the caller.
pub async fn run_until(config: BridgeConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr =
            config
                .observability
                .metrics_address
                .parse()
                .map_err(|source| StartupError::Address {
                    field: "observability.metrics_address",
                    value: config.observability.metrics_address.clone(),
                    source,
                })?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    tracing::info!(
        address = %listener.local_addr()?,
        connection_profile = %config.fabric.connection_profile,
        wallet = %config.fabric.wallet_path,
        max_connections = config.listener.max_connections,
        "Listening for connections"
    );

    let connector = GrpcConnector::new(
        Duration::from_secs(config.timeouts.connect_secs),
        Duration::from_secs(config.timeouts.call_secs),
    );
    let server = HttpServer::new(config, Arc::new(connector));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
