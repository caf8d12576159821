//! ML prediction engine

mod adapter;
mod airports;
mod artifact;
mod baseline;
mod engine;
mod features;
mod inference;

#[cfg(test)]
mod tests;

pub use adapter::{AdapterState, ModelAdapter, ModelInfo, ModelStatus, Score};
pub use artifact::{
    compute_checksum, load_model_artifact, ArtifactFormat, ArtifactInfo, LoadedArtifact,
    MAX_ARTIFACT_BYTES,
};
pub use baseline::{
    ConstantBaseline, HeuristicBaseline, CONSTANT_BASELINE_VERSION, HEURISTIC_BASELINE_VERSION,
};
pub use engine::{FallbackPolicy, PredictionEngine, DEFAULT_FALLBACK_PROBABILITY};
pub use features::{FeatureExtractor, ValidatedFlight};
pub use inference::{LogisticArtifact, LogisticDelayModel, OnnxDelayModel};

use crate::error::ModelError;
use crate::models::FeatureVector;
use serde::{Deserialize, Serialize};

/// Model family, used for metrics labels and status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Onnx,
    Logistic,
    Baseline,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Onnx => "onnx",
            ModelKind::Logistic => "logistic",
            ModelKind::Baseline => "baseline",
        }
    }
}

/// Trait for delay model implementations
pub trait DelayModel: Send + Sync {
    /// Probability that the flight's arrival delay exceeds 30 minutes
    fn score(&self, features: &FeatureVector) -> Result<f32, ModelError>;

    /// Short model name
    fn name(&self) -> &str;

    /// Get current model version
    fn version(&self) -> &str;

    fn kind(&self) -> ModelKind;
}
