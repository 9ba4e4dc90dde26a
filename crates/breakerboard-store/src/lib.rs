//! # breakerboard-store
//!
//! Counter store backends for Breakerboard. Supports two modes:
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//!   with per-entry expiry
//! - **redis**: Shared store in Redis using the [redis](https://crates.io/crates/redis) crate
//!
//! The backend is selected at runtime based on configuration. Every backend
//! is read through the [`CounterStore`](breakerboard_core::traits::CounterStore)
//! trait.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;
