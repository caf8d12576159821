//! Integration tests for the ml-service API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ml_service::{create_router, AppState};
use predictor_lib::{
    flights::{GetFlightStatus, InMemoryFlightRepository},
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    predictor::{ConstantBaseline, ModelAdapter, PredictionEngine},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn setup_app(adapter: ModelAdapter) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::FLIGHT_STORE).await;

    let engine = PredictionEngine::new(Arc::new(adapter));
    health_registry.report_model(&engine.model_status()).await;

    let state = Arc::new(AppState::new(
        Arc::new(engine),
        GetFlightStatus::new(Arc::new(InMemoryFlightRepository::new())),
        health_registry,
        ServiceMetrics::new(),
        StructuredLogger::new("ml-service-test"),
    ));
    let router = create_router(state.clone());

    (router, state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    setup_app(ModelAdapter::new()).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn predict_body() -> Value {
    json!({
        "flight": "AB123",
        "origin": "JFK",
        "destination": "LAX",
        "scheduled_dep_iso": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_health_is_always_ok() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_predict_without_model_returns_fallback() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = send(app, json_request("POST", "/predict", predict_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["probability_delay_over_30min"].as_f64().unwrap() as f32, 0.1);
    assert_eq!(body["quality"], "fallback-no-model");
    assert!(body.get("model_version").is_none());
}

#[tokio::test]
async fn test_predict_with_loaded_model() {
    let adapter = ModelAdapter::new();
    adapter.load(Box::new(ConstantBaseline::new(0.42))).unwrap();
    let (app, _state) = setup_app(adapter).await;

    let (status, body) = send(app, json_request("POST", "/predict", predict_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["probability_delay_over_30min"].as_f64().unwrap() as f32, 0.42);
    assert_eq!(body["quality"], "model");
    assert_eq!(body["model_version"], "baseline-constant");
}

#[tokio::test]
async fn test_predict_invalid_input_is_answered() {
    let (app, _state) = setup_test_app().await;
    let body = json!({
        "flight": "AB123",
        "origin": "JFK",
        "destination": "JFK",
        "scheduled_dep_iso": "not-a-date"
    });

    let (status, body) = send(app, json_request("POST", "/predict", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quality"], "fallback-invalid-input");
}

#[tokio::test]
async fn test_predict_missing_field_rejected() {
    let (app, _state) = setup_test_app().await;
    let body = json!({ "flight": "AB123", "origin": "JFK" });

    let (status, body) = send(app, json_request("POST", "/predict", body)).await;

    assert!(status.is_client_error());
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_healthz_degraded_without_model_is_ok() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = send(app, get("/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["model"]["status"], "degraded");
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app().await;
    state
        .health_registry
        .set_unhealthy(components::ENGINE, "Misconfigured")
        .await;

    let (status, body) = send(app, get("/healthz")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_returns_503_when_not_ready() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = send(app, get("/readyz")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_readyz_reports_model_loaded() {
    let adapter = ModelAdapter::new();
    adapter.load(Box::new(ConstantBaseline::new(0.42))).unwrap();
    let (app, state) = setup_app(adapter).await;
    state.health_registry.set_ready(true).await;

    let (status, body) = send(app, get("/readyz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["model_state"], "loaded");
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _state) = setup_test_app().await;

    // Serve a prediction so the quality counter has a sample
    let _ = send(app.clone(), json_request("POST", "/predict", predict_body())).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("ml_service_predictions_total"));
}

#[tokio::test]
async fn test_flight_status_roundtrip() {
    let (app, _state) = setup_test_app().await;
    let update = json!({
        "flight": "af22",
        "origin": "CDG",
        "destination": "JFK",
        "status": "DELAYED",
        "delay_minutes": 45
    });

    let (status, stored) = send(app.clone(), json_request("PUT", "/api/v1/flights", update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["flight"], "AF22");

    let (status, latest) = send(app, get("/api/v1/flights/latest?flight=AF22")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["status"], "DELAYED");
    assert_eq!(latest["delay_minutes"], 45);
}

#[tokio::test]
async fn test_unknown_flight_returns_404() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = send(app, get("/api/v1/flights/latest?flight=ZZ999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "FLIGHT_NOT_FOUND");
    assert_eq!(body["details"]["flight"], "ZZ999");
}

#[tokio::test]
async fn test_blank_flight_returns_400() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app.clone(), get("/api/v1/flights/latest")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    let (status, _) = send(app, get("/api/v1/flights/latest?flight=%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_flight_state_rejected() {
    let (app, _state) = setup_test_app().await;
    let update = json!({
        "flight": "AF22",
        "origin": "CDG",
        "destination": "JFK",
        "status": "LOST"
    });

    let (status, body) = send(app, json_request("PUT", "/api/v1/flights", update)).await;
    assert!(status.is_client_error());
    assert_eq!(body["code"], "INVALID_REQUEST");
}
