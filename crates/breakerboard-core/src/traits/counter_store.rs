//! Read-only view of the shared counter store.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::CounterEntry;

/// Trait for counter store backends (Redis or in-memory).
///
/// The store is written by an arbitrary number of unrelated processes.
/// Implementations only read; expiry is enforced by the backend on a
/// best-effort basis, so callers must re-check [`CounterEntry::is_expired`].
#[async_trait]
pub trait CounterStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return every entry whose key starts with `prefix`.
    ///
    /// Each call produces a fresh listing; no state is kept between calls.
    async fn entries(&self, prefix: &str) -> AppResult<Vec<CounterEntry>>;

    /// Read the value of a single key. Returns `None` if absent.
    async fn get(&self, key: &str) -> AppResult<Option<i64>>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
