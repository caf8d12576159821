//! Service configuration

use anyhow::{Context, Result};
use predictor_lib::predictor::{ConstantBaseline, DelayModel, FallbackPolicy, HeuristicBaseline};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "ML_SERVICE_CONFIG";

/// Config file read when `ML_SERVICE_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "ml-service.toml";

/// Model answering while no trained model is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineKind {
    #[default]
    None,
    Constant,
    Heuristic,
}

/// ML service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Name attached to structured log records
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// HTTP port for the prediction API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Trained model artifact (`.onnx` or logistic `.json`)
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Expected SHA-256 of the artifact, hex encoded
    #[serde(default)]
    pub model_checksum: Option<String>,

    #[serde(default)]
    pub baseline: BaselineKind,

    /// Probability returned by the constant baseline
    #[serde(default = "default_baseline_probability")]
    pub baseline_probability: f32,

    /// Probability returned when no score can be computed
    #[serde(default = "default_fallback_probability")]
    pub fallback_probability: f32,

    /// Flight statuses kept in memory before the stalest is evicted
    #[serde(default = "default_max_flights")]
    pub max_flights: usize,
}

fn default_service_name() -> String {
    "ml-service".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_baseline_probability() -> f32 {
    0.42
}

fn default_fallback_probability() -> f32 {
    predictor_lib::predictor::DEFAULT_FALLBACK_PROBABILITY
}

fn default_max_flights() -> usize {
    predictor_lib::flights::DEFAULT_MAX_FLIGHTS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            api_port: default_api_port(),
            model_path: None,
            model_checksum: None,
            baseline: BaselineKind::None,
            baseline_probability: default_baseline_probability(),
            fallback_probability: default_fallback_probability(),
            max_flights: default_max_flights(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the config file and environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load from an optional file; `ML_SERVICE_*` variables take precedence
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(config::Environment::with_prefix("ML_SERVICE").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read configuration from {:?}", path))?;

        let config: ServiceConfig = config
            .try_deserialize()
            .context("Invalid service configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("baseline_probability", self.baseline_probability),
            ("fallback_probability", self.fallback_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        if self.max_flights == 0 {
            anyhow::bail!("max_flights must be at least 1");
        }
        if self.service_name.trim().is_empty() {
            anyhow::bail!("service_name must not be empty");
        }
        Ok(())
    }

    pub fn fallback_policy(&self) -> Result<FallbackPolicy> {
        FallbackPolicy::new(self.fallback_probability)
    }

    /// Baseline model selected by `baseline`, if any
    pub fn baseline_model(&self) -> Option<Box<dyn DelayModel>> {
        match self.baseline {
            BaselineKind::None => None,
            BaselineKind::Constant => Some(Box::new(ConstantBaseline::new(self.baseline_probability))),
            BaselineKind::Heuristic => Some(Box::new(HeuristicBaseline::new())),
        }
    }
}
