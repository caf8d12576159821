//! Latest flight status tracking
//!
//! A repository port for the most recent known status of each flight, an
//! in-memory implementation, and the lookup use case the API serves.

mod repository;

pub use repository::{InMemoryFlightRepository, DEFAULT_MAX_FLIGHTS};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Operational state of a flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightState {
    Scheduled,
    OnTime,
    Delayed,
    Departed,
    Arrived,
    Cancelled,
}

impl FlightState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightState::Scheduled => "SCHEDULED",
            FlightState::OnTime => "ON_TIME",
            FlightState::Delayed => "DELAYED",
            FlightState::Departed => "DEPARTED",
            FlightState::Arrived => "ARRIVED",
            FlightState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for FlightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known status of a flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStatus {
    pub flight: String,
    pub origin: String,
    pub destination: String,
    pub status: FlightState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_minutes: Option<u32>,
    /// When the status was observed; defaults to receipt time
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Trait for flight status storage implementations
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Most recent status for a flight id
    async fn find_latest(&self, flight: &str) -> Result<Option<FlightStatus>>;

    /// Store a status if it is not older than the one already held.
    /// Returns the status held after the call.
    async fn upsert(&self, status: FlightStatus) -> Result<FlightStatus>;
}

/// Errors from the flight status use case
#[derive(Debug, Error)]
pub enum FlightStatusError {
    #[error("flight id is required")]
    MissingFlightId,

    #[error("no status known for flight {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Upper-cased, trimmed flight id used as the storage key
pub fn normalize_flight_id(flight: &str) -> String {
    flight.trim().to_ascii_uppercase()
}

/// Looks up and records latest flight statuses
#[derive(Clone)]
pub struct GetFlightStatus {
    repository: Arc<dyn FlightRepository>,
}

impl GetFlightStatus {
    pub fn new(repository: Arc<dyn FlightRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, flight: &str) -> Result<FlightStatus, FlightStatusError> {
        let flight = normalize_flight_id(flight);
        if flight.is_empty() {
            return Err(FlightStatusError::MissingFlightId);
        }
        self.repository
            .find_latest(&flight)
            .await?
            .ok_or(FlightStatusError::NotFound(flight))
    }

    pub async fn record(&self, mut status: FlightStatus) -> Result<FlightStatus, FlightStatusError> {
        status.flight = normalize_flight_id(&status.flight);
        if status.flight.is_empty() {
            return Err(FlightStatusError::MissingFlightId);
        }
        status.origin = status.origin.trim().to_ascii_uppercase();
        status.destination = status.destination.trim().to_ascii_uppercase();
        Ok(self.repository.upsert(status).await?)
    }
}
