//! Convenience result type alias for VolunHub.

use crate::error::AppError;

/// A specialized `Result` type for VolunHub operations.
pub type AppResult<T> = Result<T, AppError>;
