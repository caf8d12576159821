//! Prediction engine
//!
//! Orchestrates feature extraction and model scoring for a single flight
//! query. Invalid input and a missing or failing model never surface as
//! errors: the engine answers with the configured fallback probability and
//! a quality flag saying why.

use super::{FeatureExtractor, ModelAdapter, ModelStatus};
use crate::error::{ModelError, ValidationError};
use crate::models::{FeatureVector, FlightQuery, PredictionQuality, PredictionResult};
use crate::observability::ServiceMetrics;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Probability returned when no model score is available
pub const DEFAULT_FALLBACK_PROBABILITY: f32 = 0.1;

/// What to answer when a prediction cannot be computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPolicy {
    default_probability: f32,
}

impl FallbackPolicy {
    /// Probability must be within [0, 1]
    pub fn new(default_probability: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&default_probability) {
            anyhow::bail!(
                "Fallback probability must be within [0, 1], got {}",
                default_probability
            );
        }
        Ok(Self {
            default_probability,
        })
    }

    pub fn default_probability(&self) -> f32 {
        self.default_probability
    }

    fn result(&self, quality: PredictionQuality) -> PredictionResult {
        PredictionResult::fallback(self.default_probability, quality)
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            default_probability: DEFAULT_FALLBACK_PROBABILITY,
        }
    }
}

/// Turns flight queries into bounded delay probabilities
pub struct PredictionEngine {
    extractor: FeatureExtractor,
    adapter: Arc<ModelAdapter>,
    policy: FallbackPolicy,
    metrics: ServiceMetrics,
}

impl PredictionEngine {
    pub fn new(adapter: Arc<ModelAdapter>) -> Self {
        Self::with_policy(adapter, FallbackPolicy::default())
    }

    pub fn with_policy(adapter: Arc<ModelAdapter>, policy: FallbackPolicy) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            adapter,
            policy,
            metrics: ServiceMetrics::new(),
        }
    }

    /// Predict the delay probability for a flight
    pub fn predict(&self, query: &FlightQuery) -> PredictionResult {
        let start = Instant::now();
        let result = self.predict_inner(query);
        self.metrics
            .record_prediction(result.quality, start.elapsed().as_secs_f64());

        debug!(
            flight = %query.flight_id,
            probability = result.probability,
            quality = %result.quality,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Prediction completed"
        );
        result
    }

    fn predict_inner(&self, query: &FlightQuery) -> PredictionResult {
        let features = match self.extractor.extract(query) {
            Ok(f) => f,
            Err(e) => {
                debug!(flight = %query.flight_id, error = %e, "Invalid flight query, using fallback");
                return self.policy.result(PredictionQuality::FallbackInvalidInput);
            }
        };

        match self.adapter.score(&features) {
            Ok(score) => PredictionResult {
                probability: score.probability.clamp(0.0, 1.0),
                quality: PredictionQuality::Model,
                model_version: Some(score.version),
            },
            Err(ModelError::Unavailable) => {
                debug!("No model loaded, using fallback");
                self.policy.result(PredictionQuality::FallbackNoModel)
            }
            Err(e) => {
                warn!(flight = %query.flight_id, error = %e, "Inference error, using fallback");
                self.policy.result(PredictionQuality::FallbackModelError)
            }
        }
    }

    /// Feature vector for a query, for debugging and explanation
    pub fn features(&self, query: &FlightQuery) -> Result<FeatureVector, ValidationError> {
        self.extractor.extract(query)
    }

    pub fn model_status(&self) -> ModelStatus {
        self.adapter.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{ConstantBaseline, DelayModel, ModelKind};

    struct FailingModel;

    impl DelayModel for FailingModel {
        fn score(&self, _features: &FeatureVector) -> Result<f32, ModelError> {
            Err(ModelError::Inference("graph exploded".to_string()))
        }
        fn name(&self) -> &str {
            "failing"
        }
        fn version(&self) -> &str {
            "v0"
        }
        fn kind(&self) -> ModelKind {
            ModelKind::Onnx
        }
    }

    /// Returns whatever it was built with, even out of range
    struct RawModel(f32);

    impl DelayModel for RawModel {
        fn score(&self, _features: &FeatureVector) -> Result<f32, ModelError> {
            Ok(self.0)
        }
        fn name(&self) -> &str {
            "raw"
        }
        fn version(&self) -> &str {
            "raw-v1"
        }
        fn kind(&self) -> ModelKind {
            ModelKind::Logistic
        }
    }

    fn query() -> FlightQuery {
        FlightQuery::new("AB123", "JFK", "LAX", "2024-05-01T10:00:00Z")
    }

    #[test]
    fn test_fallback_policy_bounds() {
        assert!(FallbackPolicy::new(0.0).is_ok());
        assert!(FallbackPolicy::new(1.0).is_ok());
        assert!(FallbackPolicy::new(1.01).is_err());
        assert!(FallbackPolicy::new(-0.1).is_err());
        assert!(FallbackPolicy::new(f32::NAN).is_err());
        assert_eq!(FallbackPolicy::default().default_probability(), 0.1);
    }

    #[test]
    fn test_no_model_fallback() {
        let engine = PredictionEngine::new(Arc::new(ModelAdapter::new()));
        let result = engine.predict(&query());
        assert_eq!(result.probability, 0.1);
        assert_eq!(result.quality, PredictionQuality::FallbackNoModel);
        assert!(result.model_version.is_none());
    }

    #[test]
    fn test_invalid_input_uses_configured_probability() {
        let policy = FallbackPolicy::new(0.25).unwrap();
        let adapter = Arc::new(ModelAdapter::with_baseline(Box::new(ConstantBaseline::new(0.42))));
        let engine = PredictionEngine::with_policy(adapter, policy);

        let bad = FlightQuery::new("AB123", "JFK", "JFK", "2024-05-01T10:00:00Z");
        let result = engine.predict(&bad);
        assert_eq!(result.probability, 0.25);
        assert_eq!(result.quality, PredictionQuality::FallbackInvalidInput);
    }

    #[test]
    fn test_model_score_returned() {
        let adapter = Arc::new(ModelAdapter::new());
        adapter.load(Box::new(ConstantBaseline::new(0.42))).unwrap();
        let engine = PredictionEngine::new(adapter);

        let result = engine.predict(&query());
        assert_eq!(result.probability, 0.42);
        assert_eq!(result.quality, PredictionQuality::Model);
        assert_eq!(result.model_version.as_deref(), Some("baseline-constant"));
    }

    #[test]
    fn test_model_error_falls_back() {
        let adapter = Arc::new(ModelAdapter::new());
        adapter.load(Box::new(FailingModel)).unwrap();
        let engine = PredictionEngine::new(adapter);

        let result = engine.predict(&query());
        assert_eq!(result.probability, 0.1);
        assert_eq!(result.quality, PredictionQuality::FallbackModelError);
    }

    #[test]
    fn test_out_of_range_score_clamped() {
        for (raw, expected) in [(1.3, 1.0), (-0.2, 0.0)] {
            let adapter = Arc::new(ModelAdapter::new());
            adapter.load(Box::new(RawModel(raw))).unwrap();
            let engine = PredictionEngine::new(adapter);

            let result = engine.predict(&query());
            assert_eq!(result.probability, expected);
            assert_eq!(result.quality, PredictionQuality::Model);
        }
    }

    #[test]
    fn test_features_exposed_for_debugging() {
        let engine = PredictionEngine::new(Arc::new(ModelAdapter::new()));
        assert!(engine.features(&query()).is_ok());
        assert!(engine
            .features(&FlightQuery::new("AB123", "JFK", "LAX", "not a time"))
            .is_err());
    }
}
