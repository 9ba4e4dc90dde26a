//! # breakerboard-api
//!
//! HTTP layer for Breakerboard built on Axum.
//!
//! Serves the metrics event stream, the health endpoints, and maps
//! [`AppError`](breakerboard_core::AppError) to HTTP responses.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
