//! Snapshot assembly.
//!
//! Joins live counters, circuit state and resolved configuration into one
//! [`CommandSnapshot`]. Any provider failure degrades the record to its
//! defaults: a command discovered in the scan may already be gone from the
//! store by the time its counters are read.

use std::sync::Arc;

use tracing::warn;

use breakerboard_core::config::CommandConfig;
use breakerboard_core::result::AppResult;
use breakerboard_core::traits::{
    CircuitBreaker, CircuitBreakerProvider, Clock, CommandMetrics, MetricsProvider,
};
use breakerboard_core::types::MetricsCounter;

use crate::snapshot::{CommandSnapshot, LiveCounts};

/// Builds [`CommandSnapshot`]s from the metrics and circuit breaker providers.
#[derive(Debug, Clone)]
pub struct SnapshotAssembler {
    metrics: Arc<dyn MetricsProvider>,
    breakers: Arc<dyn CircuitBreakerProvider>,
    clock: Arc<dyn Clock>,
}

impl SnapshotAssembler {
    /// Create an assembler over the given providers.
    pub fn new(
        metrics: Arc<dyn MetricsProvider>,
        breakers: Arc<dyn CircuitBreakerProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            metrics,
            breakers,
            clock,
        }
    }

    /// Snapshot of `command_key` under `config`. Never fails.
    pub async fn assemble(&self, command_key: &str, config: &CommandConfig) -> CommandSnapshot {
        let current_time = self.clock.now_millis();

        match self.live_counts(command_key, config).await {
            Ok(live) => CommandSnapshot::new(command_key, current_time, config, live),
            Err(e) => {
                warn!(
                    command_key = %command_key,
                    error = %e,
                    "Metrics unavailable, emitting default record"
                );
                CommandSnapshot::empty(command_key, current_time, config)
            }
        }
    }

    async fn live_counts(&self, command_key: &str, config: &CommandConfig) -> AppResult<LiveCounts> {
        let metrics = self.metrics.command_metrics(command_key, config).await?;
        let breaker = self
            .breakers
            .circuit_breaker(command_key, config, Arc::clone(&metrics))
            .await?;

        let health = metrics.health_counts().await?;
        let circuit_open = breaker.is_open().await?;

        Ok(LiveCounts {
            circuit_open,
            health,
            exceptions_thrown: metrics.rolling_count(MetricsCounter::ExceptionThrown).await?,
            failure: metrics.rolling_count(MetricsCounter::Failure).await?,
            fallback_failure: metrics.rolling_count(MetricsCounter::FallbackFailure).await?,
            fallback_success: metrics.rolling_count(MetricsCounter::FallbackSuccess).await?,
            responses_from_cache: metrics.rolling_count(MetricsCounter::ResponseFromCache).await?,
            short_circuited: metrics.rolling_count(MetricsCounter::ShortCircuited).await?,
            success: metrics.rolling_count(MetricsCounter::Success).await?,
        })
    }
}
