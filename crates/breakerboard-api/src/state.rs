//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use breakerboard_core::config::AppConfig;
use breakerboard_core::result::AppResult;
use breakerboard_core::traits::{Clock, CounterStore};
use breakerboard_store::StoreManager;
use breakerboard_stream::provider::{StoreCircuitBreakerProvider, StoreMetricsProvider};
use breakerboard_stream::{
    ConfigResolver, CounterStoreScanner, MetricsStream, SnapshotAssembler, StorePoller,
    StreamMetrics,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Counter store (Redis or in-memory)
    pub store: Arc<StoreManager>,
    /// Stream loop template, cloned per connection
    pub stream: MetricsStream,
    /// Process-wide stream counters
    pub stream_metrics: Arc<StreamMetrics>,
    /// Cancelled when the process shuts down; every stream holds a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the poll pipeline over `store` and build the state.
    ///
    /// Fails when the command configuration tree or the key prefix cannot
    /// be used.
    pub fn build(
        config: AppConfig,
        store: Arc<StoreManager>,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> AppResult<Self> {
        let prefix = config.store.key_prefix.clone();
        let counters: Arc<dyn CounterStore> = store.clone();

        let resolver = Arc::new(ConfigResolver::new(&config.commands)?);
        let scanner = CounterStoreScanner::new(prefix.clone(), config.stream.strict_counter_keys)?;
        let assembler = SnapshotAssembler::new(
            Arc::new(StoreMetricsProvider::new(
                Arc::clone(&counters),
                Arc::clone(&clock),
                prefix.clone(),
            )),
            Arc::new(StoreCircuitBreakerProvider::new(Arc::clone(&counters), prefix)),
            Arc::clone(&clock),
        );
        let poller = StorePoller::new(counters, scanner, resolver, assembler, clock);

        let stream_metrics = Arc::new(StreamMetrics::new());
        let stream = MetricsStream::new(
            Arc::new(poller),
            Duration::from_millis(config.stream.delay_ms),
            Arc::clone(&stream_metrics),
        );

        info!(
            path = %config.stream.path,
            delay_ms = config.stream.delay_ms,
            commands = config.commands.len(),
            "Metrics stream pipeline ready"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            stream,
            stream_metrics,
            shutdown,
        })
    }
}
