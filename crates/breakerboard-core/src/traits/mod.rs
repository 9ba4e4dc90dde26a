//! Core traits defined in `breakerboard-core` and implemented by other crates.

pub mod circuit_breaker;
pub mod clock;
pub mod counter_store;
pub mod metrics;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerProvider};
pub use clock::{Clock, ManualClock, SystemClock};
pub use counter_store::CounterStore;
pub use metrics::{CommandMetrics, MetricsProvider};
