//! Aggregate health view over the rolling window.

use serde::{Deserialize, Serialize};

/// Totals derived from the rolling counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthCounts {
    /// Requests seen in the window.
    pub total: u64,
    /// Requests that failed, timed out, or were short-circuited.
    pub failure: u64,
    /// `failure / total * 100`, zero when there were no requests.
    pub error_percentage: f64,
}

impl HealthCounts {
    /// Build health counts from raw totals.
    pub fn new(total: u64, failure: u64) -> Self {
        let error_percentage = if total > 0 {
            failure as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total,
            failure,
            error_percentage,
        }
    }
}
