//! The per-command record pushed to dashboard viewers.
//!
//! The field set and names are fixed by the dashboard's wire schema.
//! Fields this system does not track are still emitted with constant
//! values so consumers expecting the full schema keep working.

use serde::Serialize;

use breakerboard_core::config::CommandConfig;
use breakerboard_core::types::HealthCounts;

/// Schema tag the dashboard keys on.
pub const RECORD_TYPE: &str = "HystrixCommand";

/// Mean total latency reported while latency is not measured.
const LATENCY_TOTAL_MEAN: u64 = 15;

/// Latency percentile distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LatencyPercentiles {
    #[serde(rename = "0")]
    pub p0: u64,
    #[serde(rename = "25")]
    pub p25: u64,
    #[serde(rename = "50")]
    pub p50: u64,
    #[serde(rename = "75")]
    pub p75: u64,
    #[serde(rename = "90")]
    pub p90: u64,
    #[serde(rename = "95")]
    pub p95: u64,
    #[serde(rename = "99")]
    pub p99: u64,
    #[serde(rename = "99.5")]
    pub p99_5: u64,
    #[serde(rename = "100")]
    pub p100: u64,
}

/// Live counters of one command at one poll tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveCounts {
    pub circuit_open: bool,
    pub health: HealthCounts,
    pub exceptions_thrown: u64,
    pub failure: u64,
    pub fallback_failure: u64,
    pub fallback_success: u64,
    pub responses_from_cache: u64,
    pub short_circuited: u64,
    pub success: u64,
}

/// Snapshot of one command, serialized as one `data:` frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSnapshot {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: String,
    pub group: String,
    #[serde(rename = "currentTime")]
    pub current_time: i64,

    #[serde(rename = "isCircuitBreakerOpen")]
    pub is_circuit_breaker_open: bool,

    #[serde(rename = "errorPercentage")]
    pub error_percentage: f64,
    #[serde(rename = "errorCount")]
    pub error_count: u64,
    #[serde(rename = "requestCount")]
    pub request_count: u64,

    #[serde(rename = "rollingCountCollapsedRequests")]
    pub rolling_count_collapsed_requests: u64,
    #[serde(rename = "rollingCountExceptionsThrown")]
    pub rolling_count_exceptions_thrown: u64,
    #[serde(rename = "rollingCountFailure")]
    pub rolling_count_failure: u64,
    #[serde(rename = "rollingCountFallbackFailure")]
    pub rolling_count_fallback_failure: u64,
    #[serde(rename = "rollingCountFallbackRejection")]
    pub rolling_count_fallback_rejection: u64,
    #[serde(rename = "rollingCountFallbackSuccess")]
    pub rolling_count_fallback_success: u64,
    #[serde(rename = "rollingCountResponsesFromCache")]
    pub rolling_count_responses_from_cache: u64,
    #[serde(rename = "rollingCountSemaphoreRejected")]
    pub rolling_count_semaphore_rejected: u64,
    #[serde(rename = "rollingCountShortCircuited")]
    pub rolling_count_short_circuited: u64,
    #[serde(rename = "rollingCountSuccess")]
    pub rolling_count_success: u64,
    #[serde(rename = "rollingCountThreadPoolRejected")]
    pub rolling_count_thread_pool_rejected: u64,
    #[serde(rename = "rollingCountTimeout")]
    pub rolling_count_timeout: u64,

    #[serde(rename = "currentConcurrentExecutionCount")]
    pub current_concurrent_execution_count: u64,

    #[serde(rename = "latencyExecute_mean")]
    pub latency_execute_mean: u64,
    #[serde(rename = "latencyExecute")]
    pub latency_execute: LatencyPercentiles,
    #[serde(rename = "latencyTotal_mean")]
    pub latency_total_mean: u64,
    #[serde(rename = "latencyTotal")]
    pub latency_total: LatencyPercentiles,

    #[serde(rename = "propertyValue_circuitBreakerRequestVolumeThreshold")]
    pub circuit_breaker_request_volume_threshold: u64,
    #[serde(rename = "propertyValue_circuitBreakerSleepWindowInMilliseconds")]
    pub circuit_breaker_sleep_window_in_milliseconds: u64,
    #[serde(rename = "propertyValue_circuitBreakerErrorThresholdPercentage")]
    pub circuit_breaker_error_threshold_percentage: u32,
    #[serde(rename = "propertyValue_circuitBreakerForceOpen")]
    pub circuit_breaker_force_open: bool,
    #[serde(rename = "propertyValue_circuitBreakerForceClosed")]
    pub circuit_breaker_force_closed: bool,
    #[serde(rename = "propertyValue_circuitBreakerEnabled")]
    pub circuit_breaker_enabled: bool,

    #[serde(rename = "propertyValue_executionIsolationStrategy")]
    pub execution_isolation_strategy: &'static str,
    #[serde(rename = "propertyValue_executionIsolationThreadTimeoutInMilliseconds")]
    pub execution_isolation_thread_timeout_in_milliseconds: u64,
    #[serde(rename = "propertyValue_executionIsolationThreadInterruptOnTimeout")]
    pub execution_isolation_thread_interrupt_on_timeout: bool,
    #[serde(rename = "propertyValue_executionIsolationThreadPoolKeyOverride")]
    pub execution_isolation_thread_pool_key_override: &'static str,
    #[serde(rename = "propertyValue_executionIsolationSemaphoreMaxConcurrentRequests")]
    pub execution_isolation_semaphore_max_concurrent_requests: u64,
    #[serde(rename = "propertyValue_fallbackIsolationSemaphoreMaxConcurrentRequests")]
    pub fallback_isolation_semaphore_max_concurrent_requests: u64,

    #[serde(rename = "propertyValue_metricsRollingStatisticalWindowInMilliseconds")]
    pub metrics_rolling_statistical_window_in_milliseconds: u64,

    #[serde(rename = "propertyValue_requestCacheEnabled")]
    pub request_cache_enabled: bool,
    #[serde(rename = "propertyValue_requestLogEnabled")]
    pub request_log_enabled: bool,

    #[serde(rename = "reportingHosts")]
    pub reporting_hosts: u64,
}

impl CommandSnapshot {
    /// Build the record for `command_key` from live counts and its config.
    pub fn new(
        command_key: &str,
        current_time: i64,
        config: &CommandConfig,
        live: LiveCounts,
    ) -> Self {
        let breaker = &config.circuit_breaker;

        Self {
            record_type: RECORD_TYPE,
            name: command_key.to_string(),
            group: command_key.to_string(),
            current_time,

            is_circuit_breaker_open: live.circuit_open,

            error_percentage: live.health.error_percentage,
            error_count: live.health.failure,
            request_count: live.health.total,

            rolling_count_collapsed_requests: 0,
            rolling_count_exceptions_thrown: live.exceptions_thrown,
            rolling_count_failure: live.failure,
            rolling_count_fallback_failure: live.fallback_failure,
            rolling_count_fallback_rejection: 0,
            rolling_count_fallback_success: live.fallback_success,
            rolling_count_responses_from_cache: live.responses_from_cache,
            rolling_count_semaphore_rejected: 0,
            rolling_count_short_circuited: live.short_circuited,
            rolling_count_success: live.success,
            rolling_count_thread_pool_rejected: 0,
            rolling_count_timeout: 0,

            current_concurrent_execution_count: 0,

            latency_execute_mean: 0,
            latency_execute: LatencyPercentiles::default(),
            latency_total_mean: LATENCY_TOTAL_MEAN,
            latency_total: LatencyPercentiles::default(),

            circuit_breaker_request_volume_threshold: breaker.request_volume_threshold,
            circuit_breaker_sleep_window_in_milliseconds: breaker.sleep_window_in_milliseconds,
            circuit_breaker_error_threshold_percentage: breaker.error_threshold_percentage,
            circuit_breaker_force_open: breaker.force_open,
            circuit_breaker_force_closed: breaker.force_closed,
            circuit_breaker_enabled: breaker.enabled,

            // Thread isolation is not used; these mirror the dashboard's defaults.
            execution_isolation_strategy: "THREAD",
            execution_isolation_thread_timeout_in_milliseconds: 0,
            execution_isolation_thread_interrupt_on_timeout: false,
            execution_isolation_thread_pool_key_override: "null",
            execution_isolation_semaphore_max_concurrent_requests: 0,
            fallback_isolation_semaphore_max_concurrent_requests: 0,

            metrics_rolling_statistical_window_in_milliseconds: config
                .metrics
                .rolling_statistical_window_in_milliseconds,

            request_cache_enabled: config.request_cache.enabled,
            request_log_enabled: config.request_log.enabled,

            reporting_hosts: 1,
        }
    }

    /// Record with no live data, used when providers have nothing for the key.
    pub fn empty(command_key: &str, current_time: i64, config: &CommandConfig) -> Self {
        Self::new(command_key, current_time, config, LiveCounts::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_field_order_and_names() {
        let snapshot = CommandSnapshot::empty("OrderCmd", 1_700_000_000_123, &CommandConfig::default());
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(json.starts_with(
            r#"{"type":"HystrixCommand","name":"OrderCmd","group":"OrderCmd","currentTime":1700000000123,"isCircuitBreakerOpen":false,"#
        ));
        assert!(json.ends_with(r#""propertyValue_requestLogEnabled":true,"reportingHosts":1}"#));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_latency_placeholders() {
        let snapshot = CommandSnapshot::empty("A", 0, &CommandConfig::default());
        let value: Value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["latencyTotal_mean"], 15);
        assert_eq!(value["latencyExecute_mean"], 0);
        let execute = value["latencyExecute"].as_object().unwrap();
        let keys: Vec<&str> = execute.keys().map(String::as_str).collect();
        for key in ["0", "25", "50", "75", "90", "95", "99", "99.5", "100"] {
            assert!(keys.contains(&key), "missing percentile {key}");
            assert_eq!(execute[key], 0);
        }
    }

    #[test]
    fn test_config_echoed_as_properties() {
        let mut config = CommandConfig::default();
        config.circuit_breaker.enabled = false;
        config.circuit_breaker.request_volume_threshold = 7;
        config.metrics.rolling_statistical_window_in_milliseconds = 10_000;
        config.request_cache.enabled = false;

        let value = serde_json::to_value(CommandSnapshot::empty("A", 0, &config)).unwrap();
        assert_eq!(value["propertyValue_circuitBreakerEnabled"], false);
        assert_eq!(value["propertyValue_circuitBreakerRequestVolumeThreshold"], 7);
        assert_eq!(
            value["propertyValue_metricsRollingStatisticalWindowInMilliseconds"],
            10_000
        );
        assert_eq!(value["propertyValue_requestCacheEnabled"], false);
        assert_eq!(value["propertyValue_executionIsolationStrategy"], "THREAD");
        assert_eq!(value["propertyValue_executionIsolationThreadPoolKeyOverride"], "null");
    }

    #[test]
    fn test_live_counts_mapped() {
        let live = LiveCounts {
            circuit_open: true,
            health: HealthCounts::new(10, 4),
            success: 6,
            failure: 4,
            short_circuited: 2,
            ..LiveCounts::default()
        };
        let value = serde_json::to_value(CommandSnapshot::new("A", 0, &CommandConfig::default(), live)).unwrap();
        assert_eq!(value["isCircuitBreakerOpen"], true);
        assert_eq!(value["errorPercentage"], 40.0);
        assert_eq!(value["errorCount"], 4);
        assert_eq!(value["requestCount"], 10);
        assert_eq!(value["rollingCountSuccess"], 6);
        assert_eq!(value["rollingCountShortCircuited"], 2);
        assert_eq!(value["rollingCountTimeout"], 0);
        assert_eq!(value["rollingCountThreadPoolRejected"], 0);
    }
}
