//! Level detection error types.

use crate::models::levels::LevelSide;
use thiserror::Error;

/// Reasons a level detection request is rejected.
///
/// Every variant is raised before any output is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("No price data available for the requested symbol/period/interval")]
    EmptyData,

    #[error("Invalid {side} range: min {min} must be below max {max}")]
    InvalidRange { side: LevelSide, min: f64, max: f64 },

    #[error("Invalid tick size {0}: must be greater than zero")]
    InvalidTickSize(f64),

    #[error("{side} grid would hold {levels} levels, more than the {max} allowed; widen tick_size or narrow the range")]
    GridTooLarge {
        side: LevelSide,
        levels: usize,
        max: usize,
    },

    #[error("Invalid threshold {0}: must not be negative")]
    InvalidThreshold(f64),

    #[error("Invalid top_k {0}: must be at least 1")]
    InvalidTopK(usize),

    #[error("Malformed input for '{field}': {value}")]
    MalformedInput { field: String, value: String },
}

impl LevelError {
    pub fn malformed(field: impl Into<String>, value: impl ToString) -> Self {
        LevelError::MalformedInput {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Stable machine-readable name for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            LevelError::EmptyData => "empty_data",
            LevelError::InvalidRange { .. } => "invalid_range",
            LevelError::InvalidTickSize(_) => "invalid_tick_size",
            LevelError::GridTooLarge { .. } => "grid_too_large",
            LevelError::InvalidThreshold(_) => "invalid_threshold",
            LevelError::InvalidTopK(_) => "invalid_top_k",
            LevelError::MalformedInput { .. } => "malformed_input",
        }
    }
}
