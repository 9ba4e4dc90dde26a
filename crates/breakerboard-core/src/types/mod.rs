//! Shared value types passed between the store, provider, and stream crates.

pub mod counter;
pub mod health;

pub use counter::{CounterEntry, MetricsCounter};
pub use health::HealthCounts;
