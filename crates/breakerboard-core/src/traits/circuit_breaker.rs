//! Circuit breaker provider seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CommandConfig;
use crate::result::AppResult;

use super::metrics::CommandMetrics;

/// Read-only view of one command's circuit breaker.
#[async_trait]
pub trait CircuitBreaker: Send + Sync + std::fmt::Debug {
    /// Whether calls to the command are currently short-circuited.
    async fn is_open(&self) -> AppResult<bool>;
}

/// Hands out [`CircuitBreaker`] views per command key.
#[async_trait]
pub trait CircuitBreakerProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Circuit breaker for `command_key`, backed by its metrics.
    async fn circuit_breaker(
        &self,
        command_key: &str,
        config: &CommandConfig,
        metrics: Arc<dyn CommandMetrics>,
    ) -> AppResult<Arc<dyn CircuitBreaker>>;
}
