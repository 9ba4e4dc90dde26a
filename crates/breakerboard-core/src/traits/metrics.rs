//! Rolling metrics provider seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CommandConfig;
use crate::result::AppResult;
use crate::types::{HealthCounts, MetricsCounter};

/// Rolling counters of a single command key.
#[async_trait]
pub trait CommandMetrics: Send + Sync + std::fmt::Debug {
    /// Sum of `counter` over the rolling window.
    async fn rolling_count(&self, counter: MetricsCounter) -> AppResult<u64>;

    /// Derived totals over the rolling window.
    async fn health_counts(&self) -> AppResult<HealthCounts>;
}

/// Hands out [`CommandMetrics`] per command key.
///
/// Implementations are expected to return the same instance for the same
/// key for the lifetime of the process.
#[async_trait]
pub trait MetricsProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Metrics for `command_key` under its resolved configuration.
    async fn command_metrics(
        &self,
        command_key: &str,
        config: &CommandConfig,
    ) -> AppResult<Arc<dyn CommandMetrics>>;
}
