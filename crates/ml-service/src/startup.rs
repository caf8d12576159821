//! Model bootstrap: baseline selection, artifact loading and state publishing

use crate::config::ServiceConfig;
use anyhow::Result;
use predictor_lib::{
    health::{components, ComponentHealth, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    predictor::{load_model_artifact, AdapterState, ArtifactInfo, ModelAdapter, PredictionEngine},
};
use std::sync::Arc;

/// Outcome of preparing the prediction engine
pub struct Bootstrap {
    pub engine: PredictionEngine,
    /// Where the loaded model came from
    pub artifact: Option<ArtifactInfo>,
    /// Why the configured artifact could not be loaded
    pub load_error: Option<String>,
}

/// Build the engine described by `config`.
///
/// A missing or broken artifact is not fatal: the failure is logged and the
/// engine answers from the baseline or the fallback policy.
pub fn build_engine(config: &ServiceConfig, logger: &StructuredLogger) -> Result<Bootstrap> {
    let policy = config.fallback_policy()?;

    let adapter = match config.baseline_model() {
        Some(baseline) => ModelAdapter::with_baseline(baseline),
        None => ModelAdapter::new(),
    };

    let mut artifact = None;
    let mut load_error = None;
    if let Some(path) = &config.model_path {
        let loaded = load_model_artifact(path, config.model_checksum.as_deref()).and_then(|loaded| {
            let model = adapter.load(loaded.model)?;
            Ok((loaded.info, model))
        });

        match loaded {
            Ok((info, model)) => {
                logger.log_model_load(&info, &model.version);
                artifact = Some(info);
            }
            Err(err) => {
                let reason = format!("{:#}", err);
                logger.log_model_load_failed(&path.display().to_string(), &reason);
                load_error = Some(reason);
            }
        }
    } else if adapter.state() == AdapterState::Unloaded {
        logger.log_no_model();
    }

    Ok(Bootstrap {
        engine: PredictionEngine::with_policy(Arc::new(adapter), policy),
        artifact,
        load_error,
    })
}

/// Reflect the engine's model state in health and metrics
pub async fn publish_model_state(
    bootstrap: &Bootstrap,
    health_registry: &HealthRegistry,
    metrics: &ServiceMetrics,
) {
    let status = bootstrap.engine.model_status();
    health_registry.report_model(&status).await;

    if let Some(artifact) = &bootstrap.artifact {
        let message = format!(
            "Loaded {} (sha256 {})",
            artifact.path.display(),
            artifact.checksum
        );
        health_registry
            .update(components::MODEL, ComponentHealth::healthy().with_message(message))
            .await;
    }

    if let Some(reason) = &bootstrap.load_error {
        health_registry
            .set_degraded(components::MODEL, format!("Model load failed: {}", reason))
            .await;
    }

    match &status.active {
        Some(info) => metrics.set_model(
            status.state == AdapterState::Loaded,
            &info.version,
            info.kind.as_str(),
        ),
        None => metrics.clear_model(),
    }
}
