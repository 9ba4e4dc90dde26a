//! Circuit state derived from the counter store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use breakerboard_core::config::CommandConfig;
use breakerboard_core::config::command::CircuitBreakerConfig;
use breakerboard_core::result::AppResult;
use breakerboard_core::traits::{CircuitBreaker, CircuitBreakerProvider, CommandMetrics, CounterStore};
use breakerboard_store::keys;

/// Read-only circuit breaker of one command key.
///
/// Reports the state the command runners would see; it never trips or
/// resets the circuit itself.
#[derive(Debug)]
pub struct StoreCircuitBreaker {
    command_key: String,
    prefix: String,
    store: Arc<dyn CounterStore>,
    metrics: Arc<dyn CommandMetrics>,
    config: CircuitBreakerConfig,
}

impl StoreCircuitBreaker {
    /// Create a breaker view for `command_key`.
    pub fn new(
        command_key: impl Into<String>,
        prefix: impl Into<String>,
        store: Arc<dyn CounterStore>,
        metrics: Arc<dyn CommandMetrics>,
        config: CircuitBreakerConfig,
    ) -> Self {
        Self {
            command_key: command_key.into(),
            prefix: prefix.into(),
            store,
            metrics,
            config,
        }
    }
}

#[async_trait]
impl CircuitBreaker for StoreCircuitBreaker {
    async fn is_open(&self) -> AppResult<bool> {
        if self.config.force_open {
            return Ok(true);
        }
        if self.config.force_closed || !self.config.enabled {
            return Ok(false);
        }

        let marker = keys::circuit_opened(&self.prefix, &self.command_key);
        if self.store.get(&marker).await?.is_some() {
            return Ok(true);
        }

        let health = self.metrics.health_counts().await?;
        if health.total < self.config.request_volume_threshold {
            return Ok(false);
        }
        Ok(health.error_percentage >= f64::from(self.config.error_threshold_percentage))
    }
}

/// Hands out one [`StoreCircuitBreaker`] per command key.
#[derive(Debug)]
pub struct StoreCircuitBreakerProvider {
    store: Arc<dyn CounterStore>,
    prefix: String,
    instances: DashMap<String, Arc<StoreCircuitBreaker>>,
}

impl StoreCircuitBreakerProvider {
    /// Create a provider reading markers under `prefix`.
    pub fn new(store: Arc<dyn CounterStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            instances: DashMap::new(),
        }
    }
}

#[async_trait]
impl CircuitBreakerProvider for StoreCircuitBreakerProvider {
    async fn circuit_breaker(
        &self,
        command_key: &str,
        config: &CommandConfig,
        metrics: Arc<dyn CommandMetrics>,
    ) -> AppResult<Arc<dyn CircuitBreaker>> {
        let breaker: Arc<dyn CircuitBreaker> = self
            .instances
            .entry(command_key.to_string())
            .or_insert_with(|| {
                Arc::new(StoreCircuitBreaker::new(
                    command_key,
                    self.prefix.clone(),
                    Arc::clone(&self.store),
                    metrics,
                    config.circuit_breaker.clone(),
                ))
            })
            .clone();

        Ok(breaker)
    }
}
