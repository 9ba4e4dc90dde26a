//! Convenience result type alias for Breakerboard.

use crate::error::AppError;

/// A specialized `Result` type for Breakerboard operations.
pub type AppResult<T> = Result<T, AppError>;
