//! Event stream configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default delay between two poll ticks, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Metrics event stream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Route the stream is served on.
    #[serde(default = "default_path")]
    pub path: String,
    /// Delay between poll ticks in milliseconds.
    #[serde(default = "default_delay")]
    pub delay_ms: u64,
    /// Maximum number of concurrently open streams.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Fail the tick on counter keys that do not match the structured
    /// key pattern instead of skipping them.
    #[serde(default)]
    pub strict_counter_keys: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            delay_ms: default_delay(),
            max_connections: default_max_connections(),
            strict_counter_keys: false,
        }
    }
}

impl StreamConfig {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.path.starts_with('/') {
            return Err(AppError::configuration(format!(
                "stream.path must start with '/': {}",
                self.path
            )));
        }
        if self.delay_ms == 0 {
            return Err(AppError::configuration("stream.delay_ms must be positive"));
        }
        Ok(())
    }
}

fn default_path() -> String {
    "/hystrix.stream".to_string()
}

fn default_delay() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_max_connections() -> usize {
    5
}
