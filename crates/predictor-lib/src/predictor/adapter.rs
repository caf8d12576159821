//! Model adapter: the process-wide model slot
//!
//! Holds at most one trained model, loaded once at startup and read
//! lock-free afterwards, plus an optional baseline that answers while no
//! trained model is loaded. The adapter is injected into the prediction
//! engine so tests can substitute their own `DelayModel` implementations.

use super::{DelayModel, ModelKind};
use crate::error::ModelError;
use crate::models::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::info;

/// Descriptive information about a model held by the adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub kind: ModelKind,
    pub loaded_at: DateTime<Utc>,
}

/// Which model, if any, currently answers `score`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterState {
    /// Nothing to score with
    Unloaded,
    /// No trained model; the configured baseline answers
    Baseline,
    /// A trained model is loaded
    Loaded,
}

impl AdapterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterState::Unloaded => "unloaded",
            AdapterState::Baseline => "baseline",
            AdapterState::Loaded => "loaded",
        }
    }
}

/// Snapshot of the adapter for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub state: AdapterState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ModelInfo>,
}

/// A successful model score
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub probability: f32,
    pub version: String,
}

struct LoadedModel {
    model: Box<dyn DelayModel>,
    info: ModelInfo,
}

impl LoadedModel {
    fn new(model: Box<dyn DelayModel>) -> Self {
        let info = ModelInfo {
            name: model.name().to_string(),
            version: model.version().to_string(),
            kind: model.kind(),
            loaded_at: Utc::now(),
        };
        Self { model, info }
    }
}

impl Drop for LoadedModel {
    fn drop(&mut self) {
        info!(
            model = %self.info.name,
            version = %self.info.version,
            "Model released"
        );
    }
}

/// Uniform `score` front for whichever model is active
#[derive(Default)]
pub struct ModelAdapter {
    loaded: OnceLock<LoadedModel>,
    baseline: Option<LoadedModel>,
}

impl ModelAdapter {
    /// Create an adapter with nothing loaded and no baseline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter whose baseline answers until a model is loaded
    pub fn with_baseline(baseline: Box<dyn DelayModel>) -> Self {
        Self {
            loaded: OnceLock::new(),
            baseline: Some(LoadedModel::new(baseline)),
        }
    }

    /// Load the trained model. Succeeds once; later calls are rejected.
    pub fn load(&self, model: Box<dyn DelayModel>) -> Result<ModelInfo, ModelError> {
        let candidate = LoadedModel::new(model);
        let info = candidate.info.clone();

        match self.loaded.set(candidate) {
            Ok(()) => {
                info!(
                    model = %info.name,
                    version = %info.version,
                    kind = info.kind.as_str(),
                    "Model loaded"
                );
                Ok(info)
            }
            Err(_rejected) => Err(ModelError::AlreadyLoaded {
                version: self
                    .loaded
                    .get()
                    .map(|m| m.info.version.clone())
                    .unwrap_or_default(),
            }),
        }
    }

    pub fn state(&self) -> AdapterState {
        if self.loaded.get().is_some() {
            AdapterState::Loaded
        } else if self.baseline.is_some() {
            AdapterState::Baseline
        } else {
            AdapterState::Unloaded
        }
    }

    /// True when a trained model is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            state: self.state(),
            active: self.active().map(|m| m.info.clone()),
        }
    }

    /// Score features with the active model
    pub fn score(&self, features: &FeatureVector) -> Result<Score, ModelError> {
        let active = self.active().ok_or(ModelError::Unavailable)?;
        let probability = active.model.score(features)?;

        if !probability.is_finite() {
            return Err(ModelError::NonFiniteScore(probability));
        }

        Ok(Score {
            probability,
            version: active.info.version.clone(),
        })
    }

    fn active(&self) -> Option<&LoadedModel> {
        self.loaded.get().or(self.baseline.as_ref())
    }
}
