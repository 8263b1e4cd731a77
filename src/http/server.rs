//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the asset handlers
//! - Wire up middleware (request ID, tracing, body and concurrency limits)
//! - Serve on a listener until shutdown is signalled

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::bridge::BridgeService;
use crate::config::BridgeConfig;
use crate::fabric::Connector;
use crate::http::handlers;
use crate::observability::tracing::RequestSpan;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<BridgeService>,
}

/// HTTP server for the asset bridge.
pub struct HttpServer {
    router: Router,
    config: BridgeConfig,
}

impl HttpServer {
    /// Create a server whose handlers reach the ledger through `connector`.
    pub fn new(config: BridgeConfig, connector: Arc<dyn Connector>) -> Self {
        let state = AppState {
            bridge: Arc::new(BridgeService::new(config.fabric.clone(), connector)),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &BridgeConfig, state: AppState) -> Router {
        Router::new()
            .route(
                "/assets",
                get(handlers::list_assets).post(handlers::create_asset),
            )
            .route("/assets/{id}", get(handlers::read_asset))
            .route("/health", get(handlers::health))
            .with_state(state)
            // Checked by the body extractors; oversize becomes a 413 `ApiError`.
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections)),
            )
    }

    /// Run the server, accepting connections on the given listener until a
    /// value arrives on `shutdown`. In-flight requests are allowed to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            channel = %self.config.fabric.channel,
            chaincode = %self.config.fabric.chaincode,
            identity = %self.config.fabric.identity,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}
