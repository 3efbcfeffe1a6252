//! Common Result Type

use super::error::Error;

/// Result type used across the crate.
pub type AppResult<T> = Result<T, Error>;
