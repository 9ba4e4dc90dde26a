//! Raw counter store entries and counter kinds.

use serde::{Deserialize, Serialize};

/// One raw entry of the shared counter store.
///
/// Owned by the store; the streaming side only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    /// Full store key, prefix included.
    pub key: String,
    /// Counter value.
    pub value: i64,
    /// Creation time in epoch seconds.
    pub creation_time: i64,
    /// Time-to-live in seconds, counted from `creation_time`.
    pub ttl_seconds: i64,
}

impl CounterEntry {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, value: i64, creation_time: i64, ttl_seconds: i64) -> Self {
        Self {
            key: key.into(),
            value,
            creation_time,
            ttl_seconds,
        }
    }

    /// Whether the entry outlived its TTL at `now_secs`.
    ///
    /// An entry is still alive during the second it expires in.
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.creation_time.saturating_add(self.ttl_seconds) < now_secs
    }
}

/// Kinds of rolling counters recorded per command.
///
/// The ordinal is the number embedded in bucket keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricsCounter {
    /// Command completed successfully.
    Success,
    /// Command failed.
    Failure,
    /// Command timed out.
    Timeout,
    /// Command was rejected by an open circuit.
    ShortCircuited,
    /// Fallback completed successfully.
    FallbackSuccess,
    /// Fallback failed.
    FallbackFailure,
    /// An exception escaped to the caller.
    ExceptionThrown,
    /// Response was served from the request cache.
    ResponseFromCache,
}

impl MetricsCounter {
    /// Every counter kind, in ordinal order.
    pub const ALL: [MetricsCounter; 8] = [
        Self::Success,
        Self::Failure,
        Self::Timeout,
        Self::ShortCircuited,
        Self::FallbackSuccess,
        Self::FallbackFailure,
        Self::ExceptionThrown,
        Self::ResponseFromCache,
    ];

    /// Numeric code used in bucket keys.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Success => 1,
            Self::Failure => 2,
            Self::Timeout => 3,
            Self::ShortCircuited => 4,
            Self::FallbackSuccess => 5,
            Self::FallbackFailure => 6,
            Self::ExceptionThrown => 7,
            Self::ResponseFromCache => 8,
        }
    }

    /// Inverse of [`MetricsCounter::ordinal`].
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.ordinal() == ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let entry = CounterEntry::new("k", 1, 100, 60);
        assert!(!entry.is_expired(159));
        assert!(!entry.is_expired(160));
        assert!(entry.is_expired(161));
    }

    #[test]
    fn test_ordinals() {
        for counter in MetricsCounter::ALL {
            assert_eq!(MetricsCounter::from_ordinal(counter.ordinal()), Some(counter));
        }
        assert_eq!(MetricsCounter::from_ordinal(0), None);
        assert_eq!(MetricsCounter::from_ordinal(9), None);
    }
}
