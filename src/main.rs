//! Fabric asset bridge.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http server ──▶ handler ──▶ bridge service │
//!                              │                                   │          │
//!                              │     connection profile ◀──────────┤          │
//!                              │     wallet (User1)     ◀──────────┤          │
//!                              │                                   ▼          │
//!     Client Response          │                         fabric gateway gRPC ─┼──▶ Peer
//!     ◀────────────────────────┼── {message} / text / {error} ◀────┘          │
//!                              └──────────────────────────────────────────────┘
//! ```
//!
//! Every request builds its own gateway connection; nothing is pooled.

use clap::Parser;
use std::path::PathBuf;

use fabric_asset_bridge::config::load_or_default;
use fabric_asset_bridge::lifecycle;
use fabric_asset_bridge::observability::logging;

#[derive(Parser)]
#[command(name = "fabric-asset-bridge")]
#[command(about = "REST bridge to the asset-transfer-basic chaincode", long_about = None)]
struct Args {
    /// TOML config file; built-in defaults when omitted.
    #[arg(short, long, env = "BRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        channel = %config.fabric.channel,
        chaincode = %config.fabric.chaincode,
        identity = %config.fabric.identity,
        "fabric-asset-bridge starting"
    );

    lifecycle::run(config).await?;
    Ok(())
}
