//! Core data models for the prediction engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of features produced by the extractor and expected by every model
pub const NUM_FEATURES: usize = 9;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "hour_of_day",
    "day_of_week",
    "month_of_year",
    "is_weekend",
    "route_distance",
    "route_known",
    "carrier_embedding",
    "origin_embedding",
    "destination_embedding",
];

/// Flight attributes as received from the service boundary.
///
/// Fields are kept raw; well-formedness is checked during feature extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightQuery {
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    /// RFC 3339 timestamp with offset, e.g. `2024-05-01T10:00:00Z`
    pub scheduled_departure: String,
}

impl FlightQuery {
    pub fn new(
        flight_id: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        scheduled_departure: impl Into<String>,
    ) -> Self {
        Self {
            flight_id: flight_id.into(),
            origin: origin.into(),
            destination: destination.into(),
            scheduled_departure: scheduled_departure.into(),
        }
    }
}

/// Feature vector for ML inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub hour_of_day: f32,
    pub day_of_week: f32,
    pub month_of_year: f32,
    pub is_weekend: f32,
    pub route_distance: f32,
    pub route_known: f32,
    pub carrier_embedding: f32,
    pub origin_embedding: f32,
    pub destination_embedding: f32,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f32; NUM_FEATURES] {
        [
            self.hour_of_day,
            self.day_of_week,
            self.month_of_year,
            self.is_weekend,
            self.route_distance,
            self.route_known,
            self.carrier_embedding,
            self.origin_embedding,
            self.destination_embedding,
        ]
    }

    /// (name, value) pairs in model input order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }
}

/// Where a prediction's probability came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredictionQuality {
    /// Scored by the loaded model
    Model,
    /// The query failed validation
    FallbackInvalidInput,
    /// No model was loaded
    FallbackNoModel,
    /// The model was loaded but failed to score
    FallbackModelError,
}

impl PredictionQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionQuality::Model => "model",
            PredictionQuality::FallbackInvalidInput => "fallback-invalid-input",
            PredictionQuality::FallbackNoModel => "fallback-no-model",
            PredictionQuality::FallbackModelError => "fallback-model-error",
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, PredictionQuality::Model)
    }
}

impl fmt::Display for PredictionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delay probability with its quality flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability that arrival delay exceeds 30 minutes, in [0, 1]
    pub probability: f32,
    pub quality: PredictionQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl PredictionResult {
    pub fn fallback(probability: f32, quality: PredictionQuality) -> Self {
        Self {
            probability,
            quality,
            model_version: None,
        }
    }
}
