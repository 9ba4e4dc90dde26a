//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use breakerboard_api::{AppState, build_router};
use breakerboard_core::config::AppConfig;
use breakerboard_core::config::store::MemoryStoreConfig;
use breakerboard_core::traits::ManualClock;
use breakerboard_core::types::CounterEntry;
use breakerboard_store::StoreManager;
use breakerboard_store::memory::MemoryCounterStore;

/// Fixed "now" of every test, in epoch seconds.
pub const NOW: i64 = 1_700_000_000;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Counter store the stream reads
    pub store: Arc<MemoryCounterStore>,
    /// Clock shared by the poll pipeline
    pub clock: Arc<ManualClock>,
    /// Cancels every open stream
    pub shutdown: CancellationToken,
}

impl TestApp {
    /// Create a test application with default configuration
    pub fn new() -> Self {
        Self::with_config("")
    }

    /// Create a test application from a TOML configuration document
    pub fn with_config(toml: &str) -> Self {
        let mut config = AppConfig::from_toml(toml).expect("Failed to parse test config");
        config.store.provider = "memory".to_string();
        let store = Arc::new(MemoryCounterStore::new(&MemoryStoreConfig::default()));
        let clock = Arc::new(ManualClock::at_secs(NOW));
        let shutdown = CancellationToken::new();

        let state = AppState::build(
            config,
            Arc::new(StoreManager::from_store(store.clone())),
            clock.clone(),
            shutdown.clone(),
        )
        .expect("Failed to build app state");

        Self {
            router: build_router(state),
            store,
            clock,
            shutdown,
        }
    }

    /// Write a counter entry created `age_secs` before [`NOW`]
    pub async fn seed(&self, key: &str, value: i64, age_secs: i64) {
        self.store
            .insert_entry(CounterEntry::new(key, value, NOW - age_secs, 60))
            .await;
    }

    /// Send a GET request and return the raw response parts
    pub async fn get(&self, path: &str) -> (StatusCode, HeaderMap, Body) {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let (parts, body) = response.into_parts();
        (parts.status, parts.headers, body)
    }

    /// Send a GET request and parse the JSON body
    pub async fn get_json(&self, path: &str) -> TestResponse {
        let (status, _headers, body) = self.get(path).await;
        let body_bytes = axum::body::to_bytes(body, 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Open the metrics stream
    pub async fn open_stream(&self, path: &str) -> (StatusCode, HeaderMap, FrameReader) {
        let (status, headers, body) = self.get(path).await;
        (status, headers, FrameReader::new(body))
    }
}

/// Reads stream frames one body chunk at a time.
pub struct FrameReader {
    chunks: BoxStream<'static, Result<Bytes, axum::Error>>,
}

impl FrameReader {
    fn new(body: Body) -> Self {
        Self {
            chunks: body.into_data_stream().boxed(),
        }
    }

    /// Next frame as text, `None` once the stream has ended
    pub async fn next_frame(&mut self) -> Option<String> {
        let chunk = tokio::time::timeout(Duration::from_secs(30), self.chunks.next())
            .await
            .expect("Timed out waiting for a frame")?
            .expect("Stream body failed");
        Some(String::from_utf8(chunk.to_vec()).expect("Frame is not UTF-8"))
    }

    /// Next frame, which must be a `data:` frame, parsed as JSON
    pub async fn next_data(&mut self) -> Value {
        let frame = self.next_frame().await.expect("Stream ended early");
        let json = frame
            .strip_prefix("data: ")
            .and_then(|rest| rest.strip_suffix("\n\n"))
            .unwrap_or_else(|| panic!("Not a data frame: {frame:?}"));
        serde_json::from_str(json).expect("Data frame is not JSON")
    }
}

/// Simplified test response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
