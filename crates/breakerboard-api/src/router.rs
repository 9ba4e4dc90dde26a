//! Route definitions.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the router: the metrics stream at `stream.path` plus health checks.
pub fn build_router(state: AppState) -> Router {
    let stream_path = state.config.stream.path.clone();

    Router::new()
        .route(&stream_path, get(handlers::stream::metrics_stream))
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
