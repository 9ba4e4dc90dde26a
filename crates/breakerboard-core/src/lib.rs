//! # breakerboard-core
//!
//! Core crate for Breakerboard. Contains configuration schemas, the
//! per-command configuration tree, the seam traits implemented by store and
//! provider crates, shared counter types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Breakerboard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
