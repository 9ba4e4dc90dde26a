//! The metrics event stream endpoint.

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use breakerboard_core::error::AppError;
use breakerboard_stream::{ActiveStreamGuard, StreamOutcome};

use crate::error::ApiError;
use crate::state::AppState;

/// Content type of the stream response.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream;charset=UTF-8";

/// Cache-Control value forbidding any caching of the stream.
pub const NO_CACHE: &str = "no-cache, no-store, max-age=0, must-revalidate";

/// Frames buffered between the stream loop and the response body.
const FRAME_BUFFER: usize = 32;

/// Query parameters of the stream endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    /// Per-connection tick delay in milliseconds.
    pub delay: Option<u64>,
}

/// GET {stream.path}[?delay=ms]
pub async fn metrics_stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Response, ApiError> {
    let max = state.config.stream.max_connections;
    let guard = ActiveStreamGuard::try_acquire(&state.stream_metrics, max).ok_or_else(|| {
        AppError::service_unavailable(format!("Maximum of {max} concurrent streams reached"))
    })?;

    let stream = match query.delay {
        Some(ms) if ms > 0 => state.stream.with_delay(Duration::from_millis(ms)),
        _ => state.stream.clone(),
    };
    let cancel = state.shutdown.child_token();
    let conn_id = Uuid::new_v4();
    let (mut tx, rx) = mpsc::channel::<Bytes>(FRAME_BUFFER);

    info!(
        conn_id = %conn_id,
        delay_ms = stream.delay().as_millis() as u64,
        "Metrics stream opened"
    );

    tokio::spawn(async move {
        let _guard = guard;
        match stream.run(&mut tx, cancel).await {
            StreamOutcome::Cancelled => info!(conn_id = %conn_id, "Metrics stream cancelled"),
            StreamOutcome::Disconnected => info!(conn_id = %conn_id, "Metrics stream client left"),
            StreamOutcome::Failed(e) => {
                error!(conn_id = %conn_id, error = %e, "Metrics stream terminated")
            }
        }
    });

    let frames = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|frame| (Ok::<_, Infallible>(frame), rx))
    });

    Ok((
        [
            (header::CONTENT_TYPE, EVENT_STREAM_CONTENT_TYPE),
            (header::CACHE_CONTROL, NO_CACHE),
            (header::PRAGMA, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}
