//! ML service - flight delay probability predictions over HTTP
//!
//! Loads the configured model artifact once at startup and serves
//! predictions, flight status, health and metrics until interrupted.

use anyhow::Result;
use ml_service::{api, config::ServiceConfig, startup};
use predictor_lib::{
    flights::{GetFlightStatus, InMemoryFlightRepository},
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting ml-service");

    let config = ServiceConfig::load()?;
    info!(
        service = %config.service_name,
        port = config.api_port,
        baseline = ?config.baseline,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::FLIGHT_STORE).await;

    let metrics = ServiceMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);

    let bootstrap = startup::build_engine(&config, &logger)?;
    startup::publish_model_state(&bootstrap, &health_registry, &metrics).await;

    let model_version = bootstrap
        .engine
        .model_status()
        .active
        .map(|info| info.version);
    logger.log_startup(SERVICE_VERSION, model_version.as_deref());

    let flights = GetFlightStatus::new(Arc::new(InMemoryFlightRepository::with_max_flights(
        config.max_flights,
    )));
    let app_state = Arc::new(api::AppState::new(
        Arc::new(bootstrap.engine),
        flights,
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    // Mark service as ready after initialization
    health_registry.set_ready(true).await;

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for shutdown signal");
        }
    };

    api::serve(config.api_port, app_state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
