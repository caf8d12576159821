//! Debug and troubleshooting CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use predictor_lib::health::{HealthResponse, ReadinessResponse};
use predictor_lib::models::FeatureVector;
use predictor_lib::predictor::FeatureExtractor;
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::commands::predict::FlightArgs;
use crate::output::{
    color_status, format_timestamp, print_heading, print_info, print_json, print_rows,
    print_warning, OutputFormat,
};

/// Row for features table
#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Row for component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Serialize)]
struct FeatureReport {
    flight_id: String,
    carrier: String,
    origin: String,
    destination: String,
    departure: String,
    features: FeatureVector,
}

#[derive(Serialize)]
struct ServiceHealth {
    health: HealthResponse,
    readiness: ReadinessResponse,
}

/// Show the feature vector the engine would score for a flight
pub fn show_features(args: &FlightArgs, format: OutputFormat) -> Result<()> {
    let extractor = FeatureExtractor::new();
    let flight = extractor
        .validate(&args.query())
        .context("Flight does not pass validation")?;
    let features = extractor.features_for(&flight);

    let report = FeatureReport {
        flight_id: flight.flight_id.clone(),
        carrier: flight.carrier.clone(),
        origin: flight.origin.clone(),
        destination: flight.destination.clone(),
        departure: flight.departure.to_rfc3339(),
        features,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_heading("Feature Vector");
            println!("Flight:     {} (carrier {})", report.flight_id.cyan(), report.carrier);
            println!("Route:      {} → {}", report.origin, report.destination);
            println!("Departure:  {}", format_timestamp(&report.departure));
            println!();

            let rows = features
                .named()
                .map(|(name, value)| FeatureRow {
                    name,
                    value: format!("{:.6}", value),
                })
                .collect();
            print_rows::<FeatureRow>(rows);

            if features.route_known == 0.0 {
                print_warning("Route distance unknown for this airport pair");
            }
        }
    }

    Ok(())
}

/// Show service health and readiness
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let (_, health) = client.health().await?;
    let (_, readiness) = client.readiness().await?;

    match format {
        OutputFormat::Json => print_json(&ServiceHealth { health, readiness })?,
        OutputFormat::Table => {
            print_heading("Service Health");
            println!("Status:       {}", color_status(health.status.as_str()));
            println!(
                "Ready:        {}",
                if readiness.ready { "yes".green() } else { "no".red() }
            );
            println!("Model:        {}", color_status(readiness.model_state.as_str()));
            if let Some(reason) = &readiness.reason {
                print_info(reason);
            }
            println!();

            let mut rows: Vec<ComponentRow> = health
                .components
                .into_iter()
                .map(|(name, component)| ComponentRow {
                    name,
                    status: color_status(component.status.as_str()),
                    message: component.message.unwrap_or_default(),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            print_rows(rows);
        }
    }

    Ok(())
}
