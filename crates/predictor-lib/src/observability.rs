//! Observability infrastructure for the ML service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, predictions by quality, model state)
//! - Structured JSON logging with tracing

use crate::models::{PredictionQuality, PredictionResult};
use crate::predictor::ArtifactInfo;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ServiceMetricsInner {
    predictions_total: IntCounterVec,
    prediction_latency_seconds: Histogram,
    model_loaded: IntGauge,
    model_info: GaugeVec,
    flight_status_updates: IntCounter,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            predictions_total: register_int_counter_vec!(
                "ml_service_predictions_total",
                "Predictions served, labelled by quality flag",
                &["quality"]
            )
            .expect("Failed to register predictions_total"),

            prediction_latency_seconds: register_histogram!(
                "ml_service_prediction_latency_seconds",
                "Time spent extracting features and scoring a flight",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            model_loaded: register_int_gauge!(
                "ml_service_model_loaded",
                "1 when a trained model is loaded, 0 otherwise"
            )
            .expect("Failed to register model_loaded"),

            model_info: register_gauge_vec!(
                "ml_service_model_info",
                "Information about the model currently answering predictions",
                &["version", "kind"]
            )
            .expect("Failed to register model_info"),

            flight_status_updates: register_int_counter!(
                "ml_service_flight_status_updates_total",
                "Flight status upserts accepted"
            )
            .expect("Failed to register flight_status_updates"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record a served prediction
    pub fn record_prediction(&self, quality: PredictionQuality, duration_secs: f64) {
        let inner = self.inner();
        inner
            .predictions_total
            .with_label_values(&[quality.as_str()])
            .inc();
        inner.prediction_latency_seconds.observe(duration_secs);
    }

    /// Update model state metrics
    pub fn set_model(&self, loaded: bool, version: &str, kind: &str) {
        let inner = self.inner();
        inner.model_loaded.set(i64::from(loaded));
        inner.model_info.reset();
        inner.model_info.with_label_values(&[version, kind]).set(1.0);
    }

    /// Clear model state metrics (no model answering)
    pub fn clear_model(&self) {
        let inner = self.inner();
        inner.model_loaded.set(0);
        inner.model_info.reset();
    }

    pub fn inc_flight_status_updates(&self) {
        self.inner().flight_status_updates.inc();
    }

    /// Current count of predictions with the given quality
    pub fn predictions_with_quality(&self, quality: PredictionQuality) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[quality.as_str()])
            .get()
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions,
/// model lifecycle, and other significant events.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Log a served prediction
    pub fn log_prediction(&self, flight: &str, origin: &str, destination: &str, result: &PredictionResult) {
        info!(
            event = "prediction_served",
            service = %self.service_name,
            flight = %flight,
            origin = %origin,
            destination = %destination,
            probability = result.probability,
            quality = %result.quality,
            model_version = result.model_version.as_deref().unwrap_or("none"),
            "Served delay prediction"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_version: Option<&str>) {
        info!(
            event = "service_started",
            service = %self.service_name,
            service_version = %version,
            model_version = model_version.unwrap_or("none"),
            "ML service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "ML service shutting down"
        );
    }

    /// Log the artifact a model was loaded from
    pub fn log_model_load(&self, artifact: &ArtifactInfo, version: &str) {
        info!(
            event = "model_loaded",
            service = %self.service_name,
            path = %artifact.path.display(),
            format = artifact.format.as_str(),
            checksum = %artifact.checksum,
            size_bytes = artifact.size_bytes,
            model_version = %version,
            "Delay model loaded"
        );
    }

    /// Log a model artifact that could not be loaded
    pub fn log_model_load_failed(&self, source: &str, reason: &str) {
        error!(
            event = "model_load_failed",
            service = %self.service_name,
            source = %source,
            reason = %reason,
            "Delay model failed to load, serving fallback predictions"
        );
    }

    /// Log that no model is configured
    pub fn log_no_model(&self) {
        warn!(
            event = "model_missing",
            service = %self.service_name,
            "No model or baseline configured, serving fallback predictions"
        );
    }

    /// Log a flight status upsert
    pub fn log_flight_status(&self, flight: &str, status: &str, delay_minutes: Option<u32>) {
        info!(
            event = "flight_status_updated",
            service = %self.service_name,
            flight = %flight,
            status = %status,
            delay_minutes = ?delay_minutes,
            "Flight status updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_metrics_creation() {
        let metrics = ServiceMetrics::new();

        let before = metrics.predictions_with_quality(PredictionQuality::FallbackModelError);
        metrics.record_prediction(PredictionQuality::FallbackModelError, 0.0002);
        assert!(metrics.predictions_with_quality(PredictionQuality::FallbackModelError) > before);

        metrics.set_model(true, "v1.0.0", "logistic");
        metrics.clear_model();
        metrics.inc_flight_status_updates();
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("ml-service");
        assert_eq!(logger.service_name(), "ml-service");
        logger.log_prediction(
            "AB123",
            "JFK",
            "LAX",
            &PredictionResult::fallback(0.1, PredictionQuality::FallbackNoModel),
        );
    }
}
