//! Health check endpoint for the delivery service.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::server::AppState;

/// Reports service liveness and basic configuration.
pub async fn service_health(State(state): State<AppState>) -> impl IntoResponse {
    let health_info = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "root_dir": state.root_dir.display().to_string(),
        "range_enabled": state.config.delivery.range_enabled,
    });

    (StatusCode::OK, axum::Json(health_info))
}
