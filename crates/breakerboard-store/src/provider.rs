//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use breakerboard_core::config::store::StoreConfig;
use breakerboard_core::error::AppError;
use breakerboard_core::result::AppResult;
use breakerboard_core::traits::CounterStore;
use breakerboard_core::types::CounterEntry;

/// Store manager that wraps the configured counter store backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner counter store.
    inner: Arc<dyn CounterStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn CounterStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis counter store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCounterStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                warn!("Initializing in-memory counter store; counters written by other processes are not visible");
                Arc::new(crate::memory::MemoryCounterStore::new(&config.memory))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_store(store: Arc<dyn CounterStore>) -> Self {
        Self { inner: store }
    }
}

#[async_trait]
impl CounterStore for StoreManager {
    async fn entries(&self, prefix: &str) -> AppResult<Vec<CounterEntry>> {
        self.inner.entries(prefix).await
    }

    async fn get(&self, key: &str) -> AppResult<Option<i64>> {
        self.inner.get(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
