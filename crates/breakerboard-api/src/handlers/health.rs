//! Health check handlers.

use axum::Json;
use axum::extract::State;

use breakerboard_core::traits::CounterStore;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// GET /health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let reachable = match state.store.health_check().await {
        Ok(reachable) => reachable,
        Err(e) => {
            tracing::warn!(error = %e, "Counter store health check failed");
            false
        }
    };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if reachable { "ok" } else { "degraded" }.to_string(),
        store: if reachable { "connected" } else { "unreachable" }.to_string(),
        store_provider: state.config.store.provider.clone(),
        active_streams: state.stream_metrics.active(),
        stream: state.stream_metrics.snapshot(),
    }))
}
