//! HTTP API: delay predictions, flight status, health checks and Prometheus metrics

use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use predictor_lib::{
    flights::{FlightStatus, GetFlightStatus},
    health::{ComponentStatus, HealthRegistry},
    models::{FlightQuery, PredictionQuality, PredictionResult},
    observability::{ServiceMetrics, StructuredLogger},
    predictor::PredictionEngine,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PredictionEngine>,
    pub flights: GetFlightStatus,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        engine: Arc<PredictionEngine>,
        flights: GetFlightStatus,
        health_registry: HealthRegistry,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            engine,
            flights,
            health_registry,
            metrics,
            logger,
        }
    }
}

/// Body of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub flight: String,
    pub origin: String,
    pub destination: String,
    pub scheduled_dep_iso: String,
}

impl From<PredictRequest> for FlightQuery {
    fn from(req: PredictRequest) -> Self {
        FlightQuery::new(req.flight, req.origin, req.destination, req.scheduled_dep_iso)
    }
}

/// Response of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub probability_delay_over_30min: f32,
    pub quality: PredictionQuality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            probability_delay_over_30min: result.probability,
            quality: result.quality,
            model_version: result.model_version,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LatestFlightParams {
    pub flight: Option<String>,
}

/// Liveness probe, always 200
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still answering predictions
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(anyhow::Error::from)?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let query = FlightQuery::from(request);

    let result = state.engine.predict(&query);
    state
        .logger
        .log_prediction(&query.flight_id, &query.origin, &query.destination, &result);

    Ok(Json(result.into()))
}

async fn latest_flight(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LatestFlightParams>,
) -> Result<Json<FlightStatus>, ApiError> {
    let flight = params.flight.unwrap_or_default();
    let status = state.flights.execute(&flight).await?;
    Ok(Json(status))
}

async fn upsert_flight(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FlightStatus>, JsonRejection>,
) -> Result<Json<FlightStatus>, ApiError> {
    let Json(status) = payload?;
    let stored = state.flights.record(status).await?;

    state.metrics.inc_flight_status_updates();
    state
        .logger
        .log_flight_status(&stored.flight, stored.status.as_str(), stored.delay_minutes);

    Ok(Json(stored))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .route("/api/v1/flights/latest", get(latest_flight))
        .route("/api/v1/flights", put(upsert_flight))
        .with_state(state)
}

/// Start the API server, returning once `shutdown` resolves and in-flight
/// requests have drained
pub async fn serve<F>(port: u16, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
