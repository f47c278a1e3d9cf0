//! Convenience result type alias for Cumulus.

use crate::error::AppError;

/// A specialized `Result` type for Cumulus operations.
pub type AppResult<T> = Result<T, AppError>;
