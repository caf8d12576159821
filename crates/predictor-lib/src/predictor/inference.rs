//! Trained model variants
//!
//! - `OnnxDelayModel`: ONNX classifier executed with tract-onnx
//! - `LogisticDelayModel`: logistic regression loaded from a JSON artifact

use super::{DelayModel, ModelKind};
use crate::error::ModelError;
use crate::models::{FeatureVector, FEATURE_NAMES, NUM_FEATURES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning (5ms target)
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based delay classifier using tract for lightweight inference.
///
/// The graph takes a `[1, NUM_FEATURES]` f32 input. Its first output is
/// either a single delay probability or a `[p_on_time, p_delayed]` pair.
pub struct OnnxDelayModel {
    model: TractModel,
    version: String,
}

impl OnnxDelayModel {
    /// Parse and optimize an ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8], version: impl Into<String>) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self {
            model,
            version: version.into(),
        })
    }

    fn features_to_tensor(features: &FeatureVector) -> Result<Tensor, ModelError> {
        let array =
            tract_ndarray::Array2::from_shape_vec((1, NUM_FEATURES), features.to_array().to_vec())
                .map_err(ModelError::inference)?;
        Ok(array.into())
    }
}

impl DelayModel for OnnxDelayModel {
    fn score(&self, features: &FeatureVector) -> Result<f32, ModelError> {
        let start = Instant::now();
        let input = Self::features_to_tensor(features)?;

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(ModelError::inference)?;
        let output = result
            .first()
            .ok_or_else(|| ModelError::Inference("No output from model".to_string()))?;
        let values: Vec<f32> = output
            .to_array_view::<f32>()
            .map_err(ModelError::inference)?
            .iter()
            .copied()
            .collect();

        let probability = match values.as_slice() {
            [p] => *p,
            [_, p_delayed] => *p_delayed,
            other => {
                return Err(ModelError::Inference(format!(
                    "Model output has {} values, expected 1 or 2",
                    other.len()
                )))
            }
        };

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(probability)
    }

    fn name(&self) -> &str {
        "onnx"
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Onnx
    }
}

/// On-disk form of a logistic regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    pub version: String,
    /// When present, must equal the extractor's feature order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub weights: Vec<f32>,
    pub bias: f32,
}

/// Logistic regression over the feature vector: `sigmoid(bias + w·x)`
#[derive(Debug, Clone)]
pub struct LogisticDelayModel {
    weights: [f32; NUM_FEATURES],
    bias: f32,
    version: String,
}

impl LogisticDelayModel {
    pub fn new(weights: [f32; NUM_FEATURES], bias: f32, version: impl Into<String>) -> Self {
        Self {
            weights,
            bias,
            version: version.into(),
        }
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let artifact: LogisticArtifact =
            serde_json::from_slice(bytes).context("Failed to parse logistic model JSON")?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: LogisticArtifact) -> Result<Self> {
        if let Some(names) = &artifact.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES) {
                anyhow::bail!(
                    "Model feature order {:?} does not match extractor order {:?}",
                    names,
                    FEATURE_NAMES
                );
            }
        }

        let weights: [f32; NUM_FEATURES] = artifact.weights.as_slice().try_into().map_err(|_| {
            anyhow::anyhow!(
                "Model has {} weights, expected {}",
                artifact.weights.len(),
                NUM_FEATURES
            )
        })?;

        if !artifact.bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            anyhow::bail!("Model parameters must be finite");
        }

        Ok(Self::new(weights, artifact.bias, artifact.version))
    }
}

impl DelayModel for LogisticDelayModel {
    fn score(&self, features: &FeatureVector) -> Result<f32, ModelError> {
        let logit: f32 = self.bias
            + self
                .weights
                .iter()
                .zip(features.to_array())
                .map(|(w, x)| w * x)
                .sum::<f32>();
        Ok(1.0 / (1.0 + (-logit).exp()))
    }

    fn name(&self) -> &str {
        "logistic"
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Logistic
    }
}
