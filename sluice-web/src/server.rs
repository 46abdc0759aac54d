//! HTTP server wiring for Sluice.
//!
//! Builds the application state and router, then serves until shutdown.
//! The router is exposed separately so integration tests can drive it
//! without binding a socket.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::get;
use sluice_core::config::SluiceConfig;
use sluice_core::delivery::FileDelivery;
use sluice_core::fs::{GuessMimeResolver, SanitizeConfig};
use tower_http::cors::CorsLayer;

use crate::handlers::{download_file, service_health};

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The delivery orchestrator
    pub delivery: Arc<FileDelivery>,
    /// Full service configuration
    pub config: Arc<SluiceConfig>,
    /// Sanitization policy for client-supplied references
    pub sanitize: Arc<SanitizeConfig>,
    /// Directory all served files must live under
    pub root_dir: PathBuf,
    /// Server start time, for health reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds state from configuration with the standard collaborators.
    pub fn new(config: SluiceConfig) -> Self {
        let config = Arc::new(config);
        let delivery = Arc::new(FileDelivery::new(
            config.delivery.clone(),
            config.offload.mode.clone(),
            Arc::new(GuessMimeResolver),
        ));

        Self {
            delivery,
            root_dir: config.server.root_dir.clone(),
            sanitize: Arc::new(SanitizeConfig::default()),
            config,
            started_at: Instant::now(),
        }
    }
}

/// Builds the application router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // File delivery
        .route("/files/{*reference}", get(download_file))
        // Operational endpoints
        .route("/healthz", get(service_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the delivery server until the process is stopped.
///
/// # Errors
///
/// Returns an error if the listen address cannot be bound or the server
/// loop fails.
pub async fn run_server(config: SluiceConfig) -> sluice_core::Result<()> {
    let bind_address = config.server.bind_address.clone();
    let state = AppState::new(config);
    let app = build_router(state);

    println!("Sluice file server running on http://{bind_address}");
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
