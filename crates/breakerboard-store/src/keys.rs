//! Counter store key builders.
//!
//! Writers and readers of the counter store must agree on these layouts.

use breakerboard_core::types::MetricsCounter;

/// Suffix of the marker key written when a circuit opens.
const OPENED_SUFFIX: &str = "opened";

/// Suffix of the marker key guarding the single trial request.
const SINGLE_TEST_BLOCKED_SUFFIX: &str = "single_test_blocked";

/// Key of one rolling bucket: `<prefix><command>_<ordinal>_<bucket>`.
pub fn bucket(prefix: &str, command_key: &str, counter: MetricsCounter, bucket_index: i64) -> String {
    format!(
        "{prefix}{command_key}_{}_{bucket_index}",
        counter.ordinal()
    )
}

/// Key of the circuit-open marker: `<prefix><command>opened`.
///
/// The marker deliberately lacks the `_<counter>_<bucket>` tail, so scans
/// over the prefix never mistake it for a counter.
pub fn circuit_opened(prefix: &str, command_key: &str) -> String {
    format!("{prefix}{command_key}{OPENED_SUFFIX}")
}

/// Key of the single-trial guard: `<prefix><command>single_test_blocked`.
pub fn single_test_blocked(prefix: &str, command_key: &str) -> String {
    format!("{prefix}{command_key}{SINGLE_TEST_BLOCKED_SUFFIX}")
}

/// Whether `key` is one of the circuit state markers rather than a counter.
pub fn is_state_marker(key: &str) -> bool {
    key.ends_with(OPENED_SUFFIX) || key.ends_with(SINGLE_TEST_BLOCKED_SUFFIX)
}
