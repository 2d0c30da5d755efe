//! Configuration errors
//!
//! The only failure the engine knows about is a bad tuning. It is caught when
//! a game is constructed; every tick and pointer operation after that is total.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no spawn categories configured")]
    NoCategories,

    #[error("category weights must be non-negative and sum to a positive total (got {total})")]
    InvalidWeights { total: f32 },

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },

    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reject zero, negative and NaN values
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
