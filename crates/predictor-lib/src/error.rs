//! Error types for feature extraction and model scoring
//!
//! Both are caught by the prediction engine and turned into fallback
//! results; they only surface directly through the lower-level APIs.

use thiserror::Error;

/// A flight query that cannot be turned into features
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed {field} airport code '{value}'")]
    MalformedAirportCode { field: &'static str, value: String },

    #[error("origin and destination are the same airport ({0})")]
    SameOriginDestination(String),

    #[error("invalid scheduled departure '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Failures of the model adapter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("no model loaded and no baseline configured")]
    Unavailable,

    #[error("a model is already loaded (version {version})")]
    AlreadyLoaded { version: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced a non-finite score ({0})")]
    NonFiniteScore(f32),
}

impl ModelError {
    pub fn inference(err: impl std::fmt::Display) -> Self {
        ModelError::Inference(err.to_string())
    }
}
