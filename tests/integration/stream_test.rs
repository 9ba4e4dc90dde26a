//! Integration tests for the metrics event stream and health endpoints.

mod helpers;

use std::collections::HashSet;

use axum::http::{StatusCode, header};

use breakerboard_core::types::MetricsCounter;
use breakerboard_store::keys;

use helpers::{NOW, TestApp};

const PFX: &str = "phystrix_cb_";

/// Bucket index of [`NOW`] with the default 100 ms buckets.
const NOW_BUCKET: i64 = NOW * 10;

#[tokio::test(start_paused = true)]
async fn test_stream_headers() {
    let app = TestApp::new();

    let (status, headers, _frames) = app.open_stream("/hystrix.stream").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream;charset=UTF-8");
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "no-cache, no-store, max-age=0, must-revalidate"
    );
    assert_eq!(headers[header::PRAGMA], "no-cache");
}

#[tokio::test(start_paused = true)]
async fn test_empty_store_pings_every_tick() {
    let app = TestApp::new();

    let (_, _, mut frames) = app.open_stream("/hystrix.stream").await;

    assert_eq!(frames.next_frame().await.unwrap(), "ping: \n\n");
    assert_eq!(frames.next_frame().await.unwrap(), "ping: \n\n");
}

#[tokio::test(start_paused = true)]
async fn test_one_data_frame_per_running_command() {
    let app = TestApp::new();
    app.seed(&keys::bucket(PFX, "A", MetricsCounter::Success, NOW_BUCKET), 3, 0).await;
    app.seed(&keys::bucket(PFX, "A", MetricsCounter::Failure, NOW_BUCKET), 1, 0).await;
    app.seed(&keys::bucket(PFX, "B", MetricsCounter::Success, NOW_BUCKET), 5, 0).await;
    app.seed(&keys::circuit_opened(PFX, "B"), NOW, 0).await;

    let (_, _, mut frames) = app.open_stream("/hystrix.stream").await;
    let first = frames.next_data().await;
    let second = frames.next_data().await;

    let names: HashSet<String> = [&first, &second]
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, HashSet::from(["A".to_string(), "B".to_string()]));

    let (a, b) = if first["name"] == "A" { (first, second) } else { (second, first) };
    assert_eq!(a["type"], "HystrixCommand");
    assert_eq!(a["group"], "A");
    assert_eq!(a["currentTime"], NOW * 1000);
    assert_eq!(a["rollingCountSuccess"], 3);
    assert_eq!(a["rollingCountFailure"], 1);
    assert_eq!(a["errorCount"], 1);
    assert_eq!(a["requestCount"], 4);
    assert_eq!(a["errorPercentage"], 25.0);
    assert_eq!(a["isCircuitBreakerOpen"], false);
    assert_eq!(a["reportingHosts"], 1);

    assert_eq!(b["rollingCountSuccess"], 5);
    assert_eq!(b["isCircuitBreakerOpen"], true);

    // The next tick starts over with the same two commands.
    let third = frames.next_data().await;
    assert!(third["name"] == "A" || third["name"] == "B");
}

#[tokio::test(start_paused = true)]
async fn test_command_outside_window_is_not_streamed() {
    let app = TestApp::new();
    // Default window is 1000 ms; this entry is alive but five seconds old.
    app.seed(&keys::bucket(PFX, "Old", MetricsCounter::Success, 1), 1, 5).await;

    let (_, _, mut frames) = app.open_stream("/hystrix.stream").await;
    assert_eq!(frames.next_frame().await.unwrap(), "ping: \n\n");
}

#[tokio::test(start_paused = true)]
async fn test_per_command_window_and_properties() {
    let app = TestApp::with_config(
        r#"
        [commands.Slow.metrics]
        rollingStatisticalWindowInMilliseconds = 10000

        [commands.Slow.circuitBreaker]
        enabled = false
        "#,
    );
    app.seed(&keys::bucket(PFX, "Slow", MetricsCounter::Success, 1), 1, 5).await;
    app.seed(&keys::bucket(PFX, "Fast", MetricsCounter::Success, 1), 1, 5).await;

    let (_, _, mut frames) = app.open_stream("/hystrix.stream").await;
    let data = frames.next_data().await;

    assert_eq!(data["name"], "Slow");
    assert_eq!(data["propertyValue_circuitBreakerEnabled"], false);
    assert_eq!(
        data["propertyValue_metricsRollingStatisticalWindowInMilliseconds"],
        10000
    );
    // Fast fell out of its one second window, so the next tick is Slow again.
    assert_eq!(frames.next_data().await["name"], "Slow");
}

#[tokio::test(start_paused = true)]
async fn test_command_disappears_when_it_goes_idle() {
    let app = TestApp::new();
    app.seed(&keys::bucket(PFX, "A", MetricsCounter::Success, NOW_BUCKET), 1, 0).await;

    let (_, _, mut frames) = app.open_stream("/hystrix.stream?delay=100").await;
    assert_eq!(frames.next_data().await["name"], "A");

    app.clock.advance_millis(2_000);
    assert_eq!(frames.next_frame().await.unwrap(), "ping: \n\n");
}

#[tokio::test(start_paused = true)]
async fn test_connection_limit() {
    let app = TestApp::with_config("[stream]\nmax_connections = 1");

    let (status, _, _held) = app.open_stream("/hystrix.stream").await;
    assert_eq!(status, StatusCode::OK);

    let response = app.get_json("/hystrix.stream").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "SERVICE_UNAVAILABLE");
}

#[tokio::test(start_paused = true)]
async fn test_invalid_delay_rejected() {
    let app = TestApp::new();
    let (status, _, _) = app.get("/hystrix.stream?delay=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_ends_streams() {
    let app = TestApp::new();

    let (_, _, mut frames) = app.open_stream("/hystrix.stream").await;
    assert_eq!(frames.next_frame().await.unwrap(), "ping: \n\n");

    app.shutdown.cancel();
    while frames.next_frame().await.is_some() {}
}

#[tokio::test(start_paused = true)]
async fn test_custom_stream_path() {
    let app = TestApp::with_config("[stream]\npath = \"/metrics/stream\"");

    let (status, _, _) = app.open_stream("/metrics/stream").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app.get("/hystrix.stream").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.get_json("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test(start_paused = true)]
async fn test_detailed_health_check() {
    let app = TestApp::new();
    let (_, _, mut frames) = app.open_stream("/hystrix.stream").await;
    frames.next_frame().await.unwrap();

    let response = app.get_json("/health/detailed").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["store"], "connected");
    assert_eq!(data["store_provider"], "memory");
    assert_eq!(data["active_streams"], 1);
    assert_eq!(data["stream"]["streams_opened"], 1);
    assert!(data["stream"]["ping_frames_sent"].as_u64().unwrap() >= 1);
}
