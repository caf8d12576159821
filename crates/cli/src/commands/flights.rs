//! Flight status CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use colored::Colorize;
use predictor_lib::flights::{FlightState, FlightStatus};

use crate::client::{ApiClient, ApiFailure};
use crate::output::{color_status, print_heading, print_json, print_success, print_warning, OutputFormat};

/// Flight state as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    Scheduled,
    OnTime,
    Delayed,
    Departed,
    Arrived,
    Cancelled,
}

impl From<StateArg> for FlightState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Scheduled => FlightState::Scheduled,
            StateArg::OnTime => FlightState::OnTime,
            StateArg::Delayed => FlightState::Delayed,
            StateArg::Departed => FlightState::Departed,
            StateArg::Arrived => FlightState::Arrived,
            StateArg::Cancelled => FlightState::Cancelled,
        }
    }
}

fn print_status(status: &FlightStatus, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(status)?,
        OutputFormat::Table => {
            print_heading("Flight Status");
            println!("Flight:      {}", status.flight.cyan());
            println!("Route:       {} → {}", status.origin, status.destination);
            println!("Status:      {}", color_status(status.status.as_str()));
            match status.delay_minutes {
                Some(minutes) => println!("Delay:       {} min", minutes),
                None => println!("Delay:       -"),
            }
            println!(
                "Updated:     {}",
                status.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }
    Ok(())
}

/// Show the latest known status of a flight
pub async fn latest(client: &ApiClient, flight: &str, format: OutputFormat) -> Result<()> {
    match client.latest_flight(flight).await {
        Ok(status) => print_status(&status, format),
        Err(err) => match err.downcast_ref::<ApiFailure>() {
            Some(failure) if failure.is_not_found() => {
                print_warning(&format!("No status known for flight {}", flight));
                Ok(())
            }
            _ => Err(err),
        },
    }
}

/// Arguments of `flights update`
#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    /// Flight number (e.g. AF22)
    pub flight: String,

    /// Origin airport code
    #[arg(long)]
    pub origin: String,

    /// Destination airport code
    #[arg(long)]
    pub destination: String,

    /// Current flight state
    #[arg(long, value_enum)]
    pub status: StateArg,

    /// Expected or actual delay in minutes
    #[arg(long)]
    pub delay_minutes: Option<u32>,

    /// Observation time, RFC 3339 (defaults to now)
    #[arg(long)]
    pub updated_at: Option<String>,
}

/// Record a flight status
pub async fn update(client: &ApiClient, args: &UpdateArgs, format: OutputFormat) -> Result<()> {
    let updated_at = match &args.updated_at {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .with_context(|| format!("Invalid --updated-at timestamp: {}", ts))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let status = FlightStatus {
        flight: args.flight.clone(),
        origin: args.origin.clone(),
        destination: args.destination.clone(),
        status: args.status.into(),
        delay_minutes: args.delay_minutes,
        updated_at,
    };

    let stored = client.update_flight(&status).await?;

    if format == OutputFormat::Table {
        print_success(&format!("Recorded status for {}", stored.flight));
        if stored.updated_at != updated_at {
            print_warning("A newer status was already stored; it was kept");
        }
    }
    print_status(&stored, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_arg_maps_to_wire_state() {
        assert_eq!(FlightState::from(StateArg::OnTime).as_str(), "ON_TIME");
        assert_eq!(FlightState::from(StateArg::Cancelled), FlightState::Cancelled);
    }
}
