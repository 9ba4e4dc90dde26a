//! Rolling counters read from the bucketed store layout.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use breakerboard_core::config::CommandConfig;
use breakerboard_core::config::command::MetricsConfig;
use breakerboard_core::result::AppResult;
use breakerboard_core::traits::{Clock, CommandMetrics, CounterStore, MetricsProvider};
use breakerboard_core::types::{HealthCounts, MetricsCounter};
use breakerboard_store::keys;

/// Health counts computed at a point in time.
#[derive(Debug, Clone, Copy)]
struct HealthSnapshot {
    computed_at_ms: i64,
    counts: HealthCounts,
}

/// Rolling counters of one command key.
#[derive(Debug)]
pub struct StoreCommandMetrics {
    command_key: String,
    prefix: String,
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    config: MetricsConfig,
    /// Last health snapshot, reused while younger than the snapshot interval.
    health: Mutex<Option<HealthSnapshot>>,
}

impl StoreCommandMetrics {
    /// Create metrics for `command_key`.
    pub fn new(
        command_key: impl Into<String>,
        prefix: impl Into<String>,
        store: Arc<dyn CounterStore>,
        clock: Arc<dyn Clock>,
        config: MetricsConfig,
    ) -> Self {
        Self {
            command_key: command_key.into(),
            prefix: prefix.into(),
            store,
            clock,
            config,
            health: Mutex::new(None),
        }
    }

    /// Bucket indexes covering the rolling window at `now_ms`, newest first.
    fn bucket_indexes(&self, now_ms: i64) -> impl Iterator<Item = i64> {
        let size = i64::try_from(self.config.bucket_size_ms()).unwrap_or(i64::MAX);
        let buckets =
            i64::try_from(self.config.rolling_statistical_window_buckets.max(1)).unwrap_or(i64::MAX);
        (0..buckets).map(move |i| now_ms.saturating_sub(i.saturating_mul(size)).div_euclid(size))
    }

    async fn compute_health(&self) -> AppResult<HealthCounts> {
        let success = self.rolling_count(MetricsCounter::Success).await?;
        let failure = self
            .rolling_count(MetricsCounter::Failure)
            .await?
            .saturating_add(self.rolling_count(MetricsCounter::Timeout).await?)
            .saturating_add(self.rolling_count(MetricsCounter::ShortCircuited).await?);

        Ok(HealthCounts::new(success.saturating_add(failure), failure))
    }
}

#[async_trait]
impl CommandMetrics for StoreCommandMetrics {
    async fn rolling_count(&self, counter: MetricsCounter) -> AppResult<u64> {
        let now_ms = self.clock.now_millis();
        let mut sum = 0u64;

        for index in self.bucket_indexes(now_ms) {
            let key = keys::bucket(&self.prefix, &self.command_key, counter, index);
            if let Some(value) = self.store.get(&key).await? {
                sum = sum.saturating_add(value.max(0) as u64);
            }
        }

        Ok(sum)
    }

    async fn health_counts(&self) -> AppResult<HealthCounts> {
        let now_ms = self.clock.now_millis();
        let interval = self.config.health_snapshot_interval_in_milliseconds as i64;

        {
            let cached = self.health.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(snapshot) = *cached {
                if now_ms - snapshot.computed_at_ms < interval {
                    return Ok(snapshot.counts);
                }
            }
        }

        let counts = self.compute_health().await?;
        debug!(
            command_key = %self.command_key,
            total = counts.total,
            failure = counts.failure,
            "Computed health counts"
        );

        let mut cached = self.health.lock().unwrap_or_else(|e| e.into_inner());
        *cached = Some(HealthSnapshot {
            computed_at_ms: now_ms,
            counts,
        });
        Ok(counts)
    }
}

/// Hands out one [`StoreCommandMetrics`] per command key.
#[derive(Debug)]
pub struct StoreMetricsProvider {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    prefix: String,
    instances: DashMap<String, Arc<StoreCommandMetrics>>,
}

impl StoreMetricsProvider {
    /// Create a provider reading keys under `prefix`.
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            prefix: prefix.into(),
            instances: DashMap::new(),
        }
    }
}

#[async_trait]
impl MetricsProvider for StoreMetricsProvider {
    async fn command_metrics(
        &self,
        command_key: &str,
        config: &CommandConfig,
    ) -> AppResult<Arc<dyn CommandMetrics>> {
        let metrics: Arc<dyn CommandMetrics> = self
            .instances
            .entry(command_key.to_string())
            .or_insert_with(|| {
                Arc::new(StoreCommandMetrics::new(
                    command_key,
                    self.prefix.clone(),
                    Arc::clone(&self.store),
                    Arc::clone(&self.clock),
                    config.metrics.clone(),
                ))
            })
            .clone();

        Ok(metrics)
    }
}
