//! Per-command configuration.
//!
//! A [`CommandConfig`] is the typed view of one merged command block.
//! Field names follow the camelCase keys used in the configuration tree,
//! and every field falls back to the built-in default when absent.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Resolved configuration for one command key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandConfig {
    /// Fallback settings.
    pub fallback: FallbackConfig,
    /// Circuit breaker settings.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Rolling metrics settings.
    pub metrics: MetricsConfig,
    /// Request cache toggle.
    pub request_cache: ToggleConfig,
    /// Request log toggle.
    pub request_log: ToggleConfig,
}

impl CommandConfig {
    /// Build the typed view from a merged configuration block.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(value).map_err(|e| {
            AppError::with_source(
                crate::error::ErrorKind::Configuration,
                format!("Invalid command configuration: {e}"),
                e,
            )
        })
    }
}

/// Fallback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FallbackConfig {
    /// Whether the fallback path is enabled.
    pub enabled: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CircuitBreakerConfig {
    /// Whether the circuit breaker participates at all.
    pub enabled: bool,
    /// Error percentage at or above which the circuit trips.
    pub error_threshold_percentage: u32,
    /// Force the circuit open regardless of health.
    pub force_open: bool,
    /// Force the circuit closed regardless of health.
    pub force_closed: bool,
    /// Minimum requests in the window before the circuit may trip.
    pub request_volume_threshold: u64,
    /// How long the circuit stays open before a trial request.
    pub sleep_window_in_milliseconds: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            error_threshold_percentage: 50,
            force_open: false,
            force_closed: false,
            request_volume_threshold: 20,
            sleep_window_in_milliseconds: 5000,
        }
    }
}

/// Rolling metrics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsConfig {
    /// How long a computed health snapshot stays fresh.
    pub health_snapshot_interval_in_milliseconds: u64,
    /// Length of the rolling statistical window.
    pub rolling_statistical_window_in_milliseconds: u64,
    /// Number of buckets the rolling window is split into.
    pub rolling_statistical_window_buckets: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            health_snapshot_interval_in_milliseconds: 1000,
            rolling_statistical_window_in_milliseconds: 1000,
            rolling_statistical_window_buckets: 10,
        }
    }
}

impl MetricsConfig {
    /// Width of one rolling bucket in milliseconds, never zero.
    pub fn bucket_size_ms(&self) -> u64 {
        let buckets = self.rolling_statistical_window_buckets.max(1);
        (self.rolling_statistical_window_in_milliseconds / buckets).max(1)
    }
}

/// Single `enabled` switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleConfig {
    /// Whether the feature is enabled.
    pub enabled: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
