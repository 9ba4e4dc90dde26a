//! Store-backed metrics and circuit breaker providers.
//!
//! Both read the same counter store the command runners write to and never
//! write anything back.

pub mod breaker;
pub mod rolling;

pub use breaker::{StoreCircuitBreaker, StoreCircuitBreakerProvider};
pub use rolling::{StoreCommandMetrics, StoreMetricsProvider};
