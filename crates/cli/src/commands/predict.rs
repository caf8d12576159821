//! Delay prediction command

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use predictor_lib::models::{FlightQuery, PredictionResult};
use predictor_lib::predictor::{
    load_model_artifact, ConstantBaseline, DelayModel, FallbackPolicy, HeuristicBaseline,
    ModelAdapter, PredictionEngine, DEFAULT_FALLBACK_PROBABILITY,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{ApiClient, PredictRequest, PredictResponse};
use crate::output::{color_probability, color_status, print_heading, print_json, OutputFormat};

/// Flight identification shared by prediction and feature commands
#[derive(Debug, Clone, Args)]
pub struct FlightArgs {
    /// Flight number (e.g. AB123)
    #[arg(long)]
    pub flight: String,

    /// Origin airport code (IATA or ICAO)
    #[arg(long)]
    pub origin: String,

    /// Destination airport code (IATA or ICAO)
    #[arg(long)]
    pub destination: String,

    /// Scheduled departure, RFC 3339 (e.g. 2024-05-01T10:00:00Z)
    #[arg(long)]
    pub departure: String,
}

impl FlightArgs {
    pub fn query(&self) -> FlightQuery {
        FlightQuery::new(&self.flight, &self.origin, &self.destination, &self.departure)
    }
}

/// Baseline used by a local engine when no model answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BaselineChoice {
    #[default]
    None,
    Constant,
    Heuristic,
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub flight: FlightArgs,

    /// Run the prediction engine locally instead of calling the service
    #[arg(long)]
    pub local: bool,

    /// Model artifact for local runs (.onnx or logistic .json)
    #[arg(long, requires = "local")]
    pub model: Option<PathBuf>,

    /// Baseline for local runs
    #[arg(long, value_enum, default_value = "none", requires = "local")]
    pub baseline: BaselineChoice,

    /// Probability of the constant baseline (local runs)
    #[arg(long, default_value_t = 0.42, requires = "local")]
    pub baseline_probability: f32,

    /// Probability answered when no score can be computed (local runs)
    #[arg(long, default_value_t = DEFAULT_FALLBACK_PROBABILITY, requires = "local")]
    pub fallback_probability: f32,
}

/// Prediction as printed by the CLI
#[derive(Debug, Clone, Serialize)]
struct PredictionOutput {
    flight: String,
    origin: String,
    destination: String,
    departure: String,
    #[serde(flatten)]
    response: PredictResponse,
    source: &'static str,
}

/// Build an engine from local artifacts and options
pub fn local_engine(args: &PredictArgs) -> Result<PredictionEngine> {
    let policy = FallbackPolicy::new(args.fallback_probability)?;

    let baseline: Option<Box<dyn DelayModel>> = match args.baseline {
        BaselineChoice::None => None,
        BaselineChoice::Constant => Some(Box::new(ConstantBaseline::new(args.baseline_probability))),
        BaselineChoice::Heuristic => Some(Box::new(HeuristicBaseline::new())),
    };
    let adapter = match baseline {
        Some(baseline) => ModelAdapter::with_baseline(baseline),
        None => ModelAdapter::new(),
    };

    if let Some(path) = &args.model {
        let artifact = load_model_artifact(path, None)
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        adapter.load(artifact.model)?;
    }

    Ok(PredictionEngine::with_policy(Arc::new(adapter), policy))
}

fn from_result(result: PredictionResult) -> PredictResponse {
    PredictResponse {
        probability_delay_over_30min: result.probability,
        quality: result.quality,
        model_version: result.model_version,
    }
}

/// Predict the delay probability of a flight
pub async fn predict(client: &ApiClient, args: &PredictArgs, format: OutputFormat) -> Result<()> {
    let (response, source) = if args.local {
        let engine = local_engine(args)?;
        (from_result(engine.predict(&args.flight.query())), "local")
    } else {
        let request = PredictRequest {
            flight: args.flight.flight.clone(),
            origin: args.flight.origin.clone(),
            destination: args.flight.destination.clone(),
            scheduled_dep_iso: args.flight.departure.clone(),
        };
        (client.predict(&request).await?, "service")
    };

    let output = PredictionOutput {
        flight: args.flight.flight.clone(),
        origin: args.flight.origin.clone(),
        destination: args.flight.destination.clone(),
        departure: args.flight.departure.clone(),
        response,
        source,
    };

    match format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Table => {
            print_heading("Delay Prediction");
            println!(
                "Flight:      {} {} → {}",
                output.flight.cyan(),
                output.origin,
                output.destination
            );
            println!("Departure:   {}", output.departure);
            println!(
                "P(>30 min):  {}",
                color_probability(output.response.probability_delay_over_30min)
            );
            println!(
                "Quality:     {}",
                color_status(output.response.quality.as_str())
            );
            println!(
                "Model:       {}",
                output.response.model_version.as_deref().unwrap_or("-")
            );
            println!("Source:      {}", output.source);
        }
    }

    Ok(())
}
