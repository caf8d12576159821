//! Deterministic baseline models used when no trained model is available

use super::{DelayModel, ModelKind};
use crate::error::ModelError;
use crate::models::FeatureVector;

/// Version reported by the constant baseline
pub const CONSTANT_BASELINE_VERSION: &str = "baseline-constant";

/// Version reported by the heuristic baseline
pub const HEURISTIC_BASELINE_VERSION: &str = "baseline-heuristic-v1";

/// Baseline that returns the same probability for every flight
#[derive(Debug, Clone)]
pub struct ConstantBaseline {
    probability: f32,
}

impl ConstantBaseline {
    /// Probability is clamped into [0, 1]
    pub fn new(probability: f32) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }

    pub fn probability(&self) -> f32 {
        self.probability
    }
}

impl DelayModel for ConstantBaseline {
    fn score(&self, _features: &FeatureVector) -> Result<f32, ModelError> {
        Ok(self.probability)
    }

    fn name(&self) -> &str {
        "constant"
    }

    fn version(&self) -> &str {
        CONSTANT_BASELINE_VERSION
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Baseline
    }
}

/// Simple rule-based baseline over schedule and route features.
///
/// Evening departures, Friday/Sunday travel, peak season and long routes
/// raise the delay probability; early-morning departures lower it.
#[derive(Debug, Clone, Default)]
pub struct HeuristicBaseline;

impl HeuristicBaseline {
    const BASE: f32 = 0.12;
    const MIN: f32 = 0.02;
    const MAX: f32 = 0.90;

    pub fn new() -> Self {
        Self
    }
}

impl DelayModel for HeuristicBaseline {
    fn score(&self, features: &FeatureVector) -> Result<f32, ModelError> {
        let hour = (features.hour_of_day * 24.0).round() as u32;
        let weekday = (features.day_of_week * 7.0).round() as u32;
        let month = (features.month_of_year * 12.0).round() as u32;

        let mut p = Self::BASE;

        // Delays accumulate through the day
        match hour {
            0..=7 => p -= 0.04,
            17..=21 => p += 0.10,
            _ => {}
        }

        // Friday and Sunday peaks
        if weekday == 4 || weekday == 6 {
            p += 0.04;
        }

        // June-August and December
        if (5..=7).contains(&month) || month == 11 {
            p += 0.05;
        }

        p += features.route_distance * 0.08;

        Ok(p.clamp(Self::MIN, Self::MAX))
    }

    fn name(&self) -> &str {
        "heuristic"
    }

    fn version(&self) -> &str {
        HEURISTIC_BASELINE_VERSION
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Baseline
    }
}
