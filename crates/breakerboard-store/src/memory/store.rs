//! In-memory counter store implementation using the moka crate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use breakerboard_core::config::store::MemoryStoreConfig;
use breakerboard_core::result::AppResult;
use breakerboard_core::traits::{Clock, CounterStore, SystemClock};
use breakerboard_core::types::CounterEntry;

/// Value held per key.
#[derive(Debug, Clone, Copy)]
struct StoredCounter {
    value: i64,
    creation_time: i64,
    ttl_seconds: i64,
}

/// Evicts each entry once its own TTL has elapsed since it was written.
///
/// Eviction is lazy, so readers still see the occasional stale entry.
struct CounterExpiry;

impl CounterExpiry {
    fn ttl(value: &StoredCounter) -> Option<Duration> {
        Some(Duration::from_secs(value.ttl_seconds.max(1) as u64))
    }
}

impl Expiry<String, StoredCounter> for CounterExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredCounter,
        _created_at: Instant,
    ) -> Option<Duration> {
        Self::ttl(value)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredCounter,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Self::ttl(value)
    }
}

/// In-memory counter store using moka.
#[derive(Debug, Clone)]
pub struct MemoryCounterStore {
    /// The underlying moka cache.
    cache: Cache<String, StoredCounter>,
    /// Time source for entries written without an explicit creation time.
    clock: Arc<dyn Clock>,
}

impl MemoryCounterStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new in-memory store stamping entries with `clock`.
    pub fn with_clock(config: &MemoryStoreConfig, clock: Arc<dyn Clock>) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(CounterExpiry)
            .build();

        Self { cache, clock }
    }

    /// Write `value` under `key`, created now.
    pub async fn insert(&self, key: &str, value: i64, ttl_seconds: i64) {
        let creation_time = self.clock.now_secs();
        self.insert_entry(CounterEntry::new(key, value, creation_time, ttl_seconds))
            .await;
    }

    /// Write a fully specified entry, creation time included.
    pub async fn insert_entry(&self, entry: CounterEntry) {
        let stored = StoredCounter {
            value: entry.value,
            creation_time: entry.creation_time,
            ttl_seconds: entry.ttl_seconds,
        };
        self.cache.insert(entry.key, stored).await;
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn entries(&self, prefix: &str) -> AppResult<Vec<CounterEntry>> {
        let entries: Vec<CounterEntry> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, stored)| CounterEntry {
                key: key.to_string(),
                value: stored.value,
                creation_time: stored.creation_time,
                ttl_seconds: stored.ttl_seconds,
            })
            .collect();

        debug!(prefix, count = entries.len(), "Listed counter entries");
        Ok(entries)
    }

    async fn get(&self, key: &str) -> AppResult<Option<i64>> {
        Ok(self.cache.get(key).await.map(|stored| stored.value))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
