//! Error types for formatter internals.
//!
//! These never leave the crate's public `format_response` calls; they decide
//! when a formatter drops to its text fallback.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    /// Input is not JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// JSON parsed but matches no known document shape.
    #[error("Unrecognized response shape: {0}")]
    UnknownShape(String),

    /// A nutrient value that cannot be used in calculations.
    #[error("Invalid nutrient value for {field}: {value}")]
    InvalidNutrient { field: &'static str, value: f64 },
}

impl FormatError {
    pub fn unknown_shape(msg: impl Into<String>) -> Self {
        Self::UnknownShape(msg.into())
    }

    pub fn invalid_nutrient(field: &'static str, value: f64) -> Self {
        Self::InvalidNutrient { field, value }
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
