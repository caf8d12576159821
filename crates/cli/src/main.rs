//! Flight Sentinel CLI
//!
//! A command-line tool for requesting delay predictions, inspecting
//! flight statuses and debugging the ML service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{debug, flights, predict};

/// Flight Sentinel CLI
#[derive(Parser)]
#[command(name = "sentinel")]
#[command(author, version, about = "CLI for the Flight Sentinel delay prediction service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via SENTINEL_API_URL env var)
    #[arg(long, env = "SENTINEL_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, value_enum)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the probability that a flight is delayed by more than 30 minutes
    Predict(predict::PredictArgs),

    /// Flight status commands
    #[command(subcommand)]
    Flights(FlightsCommands),

    /// Show service health and readiness
    Health,

    /// Debug and troubleshooting commands
    #[command(subcommand)]
    Debug(DebugCommands),
}

#[derive(Subcommand)]
pub enum FlightsCommands {
    /// Show the latest known status of a flight
    Latest {
        /// Flight number (e.g. AF22)
        flight: String,
    },

    /// Record a flight status
    Update(flights::UpdateArgs),
}

#[derive(Subcommand)]
pub enum DebugCommands {
    /// Show the feature vector extracted for a flight
    Features(predict::FlightArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let format = config.format(cli.format);

    // Initialize client
    let client = client::ApiClient::new(&config.api_url(cli.api_url))?;

    // Execute command
    let outcome = match cli.command {
        Commands::Predict(args) => predict::predict(&client, &args, format).await,
        Commands::Flights(flights_cmd) => match flights_cmd {
            FlightsCommands::Latest { flight } => flights::latest(&client, &flight, format).await,
            FlightsCommands::Update(args) => flights::update(&client, &args, format).await,
        },
        Commands::Health => debug::show_health(&client, format).await,
        Commands::Debug(debug_cmd) => match debug_cmd {
            DebugCommands::Features(args) => debug::show_features(&args, format),
        },
    };

    if let Err(err) = outcome {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }

    Ok(())
}
