//! Crate-level error type

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by label construction, validation and (de)serialization
#[derive(Debug, Error)]
pub enum LabelError {
    /// Type tag outside the seven known label kinds
    #[error("unknown label type: {0}")]
    UnknownType(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("label serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
