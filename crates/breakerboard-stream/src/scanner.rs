//! Counter store scanning.
//!
//! Turns the raw listing of the counter store into `(command key, entry)`
//! pairs. Entries past their TTL are dropped here because the store's own
//! expiry lags; keys that do not follow the counter layout are skipped.

use regex::Regex;
use tracing::debug;

use breakerboard_core::error::AppError;
use breakerboard_core::result::AppResult;
use breakerboard_core::types::CounterEntry;
use breakerboard_store::keys;

/// A live counter entry together with the command key it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedCounter<'a> {
    /// Command key extracted from the entry's key.
    pub command_key: &'a str,
    /// The underlying entry.
    pub entry: &'a CounterEntry,
}

/// Extracts command keys from counter store entries.
#[derive(Debug, Clone)]
pub struct CounterStoreScanner {
    /// Prefix every counter key starts with.
    prefix: String,
    /// `^<prefix>(<command>)_<counter>_<bucket>$`
    pattern: Regex,
    /// Fail on keys that do not follow the counter layout.
    strict: bool,
}

impl CounterStoreScanner {
    /// Create a scanner for keys under `prefix`.
    pub fn new(prefix: impl Into<String>, strict: bool) -> Result<Self, AppError> {
        let prefix = prefix.into();
        let pattern = Regex::new(&format!(
            "^{}(.*)_(?:.*)_(?:[0-9]+)$",
            regex::escape(&prefix)
        ))?;

        Ok(Self {
            prefix,
            pattern,
            strict,
        })
    }

    /// The key prefix this scanner matches.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extract the command key from a counter key.
    pub fn command_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(key)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }

    /// Lazily yield every live, well-formed entry of `entries` at `now_secs`.
    ///
    /// In strict mode a malformed key that is not a circuit state marker
    /// yields an error instead of being skipped.
    pub fn scan<'a>(
        &'a self,
        entries: &'a [CounterEntry],
        now_secs: i64,
    ) -> impl Iterator<Item = AppResult<ScannedCounter<'a>>> + 'a {
        entries.iter().filter_map(move |entry| {
            if entry.is_expired(now_secs) {
                return None;
            }

            match self.command_key(&entry.key) {
                Some(command_key) => Some(Ok(ScannedCounter { command_key, entry })),
                None if self.strict && !keys::is_state_marker(&entry.key) => Some(Err(
                    AppError::validation(format!("Invalid counter key: {}", entry.key)),
                )),
                None => {
                    debug!(key = %entry.key, "Skipping unrecognized counter key");
                    None
                }
            }
        })
    }
}
