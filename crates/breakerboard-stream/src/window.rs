//! Rolling window membership.
//!
//! The store keeps counters much longer than any command's statistical
//! window, so a live entry alone does not make a command "running". A
//! command is admitted once one of its live entries was created inside the
//! command's own rolling window.

use std::collections::HashSet;
use std::sync::Arc;

use breakerboard_core::result::AppResult;

use crate::resolver::ConfigResolver;
use crate::scanner::ScannedCounter;

/// Decides which discovered command keys are inside their rolling window.
#[derive(Debug, Clone)]
pub struct WindowMembershipFilter {
    resolver: Arc<ConfigResolver>,
}

impl WindowMembershipFilter {
    /// Create a filter resolving windows through `resolver`.
    pub fn new(resolver: Arc<ConfigResolver>) -> Self {
        Self { resolver }
    }

    /// Deduplicated command keys running at `now_secs`, in discovery order.
    ///
    /// Stops at the first scan error.
    pub fn commands_running<'a>(
        &self,
        scanned: impl IntoIterator<Item = AppResult<ScannedCounter<'a>>>,
        now_secs: i64,
    ) -> AppResult<Vec<String>> {
        let mut running = Vec::new();
        let mut seen = HashSet::new();

        for item in scanned {
            let ScannedCounter { command_key, entry } = item?;
            if seen.contains(command_key) {
                continue;
            }

            let config = self.resolver.resolve(command_key);
            let window_ms =
                i64::try_from(config.metrics.rolling_statistical_window_in_milliseconds)
                    .unwrap_or(i64::MAX);
            let window_end_ms = entry.creation_time.saturating_mul(1000).saturating_add(window_ms);

            if window_end_ms >= now_secs.saturating_mul(1000) {
                seen.insert(command_key);
                running.push(command_key.to_string());
            }
        }

        Ok(running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use breakerboard_core::error::AppError;
    use breakerboard_core::types::CounterEntry;
    use serde_json::json;

    use crate::scanner::CounterStoreScanner;

    fn filter(window_ms: u64) -> WindowMembershipFilter {
        let mut tree = HashMap::new();
        tree.insert(
            "default".to_string(),
            json!({"metrics": {"rollingStatisticalWindowInMilliseconds": window_ms}}),
        );
        WindowMembershipFilter::new(Arc::new(ConfigResolver::new(&tree).unwrap()))
    }

    fn running(filter: &WindowMembershipFilter, entries: &[CounterEntry], now: i64) -> Vec<String> {
        let scanner = CounterStoreScanner::new("PFX_", false).unwrap();
        filter.commands_running(scanner.scan(entries, now), now).unwrap()
    }

    #[test]
    fn test_inside_window() {
        let entries = vec![CounterEntry::new("PFX_OrderCmd_SUCCESS_3", 1, 1_000, 60)];
        assert_eq!(running(&filter(10_000), &entries, 1_005), vec!["OrderCmd"]);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let entries = vec![CounterEntry::new("PFX_A_1_1", 1, 1_000, 60)];
        assert_eq!(running(&filter(10_000), &entries, 1_010), vec!["A"]);
        assert!(running(&filter(10_000), &entries, 1_011).is_empty());
    }

    #[test]
    fn test_fractional_window() {
        let entries = vec![CounterEntry::new("PFX_A_1_1", 1, 1_000, 60)];
        assert_eq!(running(&filter(1_500), &entries, 1_001), vec!["A"]);
        assert!(running(&filter(1_500), &entries, 1_002).is_empty());
    }

    #[test]
    fn test_window_wider_than_i64_admits() {
        let entries = vec![CounterEntry::new("PFX_A_1_1", 1, 1_000, 60)];
        assert_eq!(running(&filter(u64::MAX), &entries, 5_000_000), vec!["A"]);
    }

    #[test]
    fn test_live_entry_outside_window_excluded() {
        let entries = vec![CounterEntry::new("PFX_OrderCmd_SUCCESS_3", 1, 1_000, 60)];
        assert!(running(&filter(10_000), &entries, 1_030).is_empty());
    }

    #[test]
    fn test_store_expired_entry_excluded() {
        let entries = vec![CounterEntry::new("PFX_OrderCmd_SUCCESS_3", 1, 1_000, 60)];
        assert!(running(&filter(100_000), &entries, 1_065).is_empty());
    }

    #[test]
    fn test_deduplicates_command_keys() {
        let entries = vec![
            CounterEntry::new("PFX_A_1_1", 1, 1_000, 60),
            CounterEntry::new("PFX_A_2_1", 1, 1_000, 60),
            CounterEntry::new("PFX_B_1_1", 1, 1_000, 60),
            CounterEntry::new("PFX_A_1_2", 1, 1_001, 60),
        ];
        assert_eq!(running(&filter(10_000), &entries, 1_002), vec!["A", "B"]);
    }

    #[test]
    fn test_later_entry_can_admit_key() {
        let entries = vec![
            CounterEntry::new("PFX_A_1_1", 1, 900, 600),
            CounterEntry::new("PFX_A_1_2", 1, 1_000, 600),
        ];
        assert_eq!(running(&filter(10_000), &entries, 1_005), vec!["A"]);
    }

    #[test]
    fn test_per_command_window() {
        let mut tree = HashMap::new();
        tree.insert(
            "default".to_string(),
            json!({"metrics": {"rollingStatisticalWindowInMilliseconds": 1_000}}),
        );
        tree.insert(
            "Slow".to_string(),
            json!({"metrics": {"rollingStatisticalWindowInMilliseconds": 60_000}}),
        );
        let filter = WindowMembershipFilter::new(Arc::new(ConfigResolver::new(&tree).unwrap()));
        let entries = vec![
            CounterEntry::new("PFX_Fast_1_1", 1, 1_000, 120),
            CounterEntry::new("PFX_Slow_1_1", 1, 1_000, 120),
        ];
        assert_eq!(running(&filter, &entries, 1_030), vec!["Slow"]);
    }

    #[test]
    fn test_scan_error_propagates() {
        let items = vec![Err(AppError::validation("Invalid counter key: x"))];
        assert!(filter(1_000).commands_running(items, 0).is_err());
    }
}
