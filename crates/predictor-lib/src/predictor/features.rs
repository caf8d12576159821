//! Feature extraction for ML inference
//!
//! Validates a raw flight query and derives the fixed-shape feature vector
//! the delay models consume. Features include temporal context taken from
//! the departure's own UTC offset, route distance between known airports,
//! and stable hash embeddings for the carrier and both airports.
//!
//! Extraction is a pure function of the query: no wall clock, no randomness.

use super::airports;
use crate::error::ValidationError;
use crate::models::{FeatureVector, FlightQuery};
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use sha2::{Digest, Sha256};

/// Route distance that maps to a feature value of 1.0 (km)
pub const MAX_ROUTE_KM: f64 = 16_000.0;

/// Carrier recorded for flight ids that carry no recognizable designator
pub const UNKNOWN_CARRIER: &str = "UNKNOWN";

/// A flight query that passed validation, with normalized fields
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFlight {
    /// Upper-cased flight id, e.g. `AB123`
    pub flight_id: String,
    /// Airline designator taken from the flight id, e.g. `AB`, or
    /// `UNKNOWN_CARRIER`
    pub carrier: String,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<FixedOffset>,
}

/// Extracts features from flight queries for ML inference
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Check and normalize a query without computing features
    pub fn validate(&self, query: &FlightQuery) -> Result<ValidatedFlight, ValidationError> {
        let (flight_id, carrier) = parse_flight_id(&query.flight_id);
        let origin = normalize_airport_code("origin", &query.origin)?;
        let destination = normalize_airport_code("destination", &query.destination)?;

        if same_airport(&origin, &destination) {
            return Err(ValidationError::SameOriginDestination(origin));
        }

        let raw_departure = query.scheduled_departure.trim();
        let departure = DateTime::parse_from_rfc3339(raw_departure).map_err(|e| {
            ValidationError::InvalidTimestamp {
                value: raw_departure.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(ValidatedFlight {
            flight_id,
            carrier,
            origin,
            destination,
            departure,
        })
    }

    pub fn extract(&self, query: &FlightQuery) -> Result<FeatureVector, ValidationError> {
        let flight = self.validate(query)?;
        Ok(self.features_for(&flight))
    }

    /// Compute features for an already validated flight
    pub fn features_for(&self, flight: &ValidatedFlight) -> FeatureVector {
        // Local calendar at the offset the timestamp was given in
        let departure = flight.departure;
        let weekday = departure.weekday();
        let (route_distance, route_known) = self.route_features(&flight.origin, &flight.destination);

        FeatureVector {
            hour_of_day: departure.hour() as f32 / 24.0,
            day_of_week: weekday.num_days_from_monday() as f32 / 7.0,
            month_of_year: departure.month0() as f32 / 12.0,
            is_weekend: if matches!(weekday, Weekday::Sat | Weekday::Sun) {
                1.0
            } else {
                0.0
            },
            route_distance,
            route_known,
            carrier_embedding: stable_embedding("carrier", &flight.carrier),
            origin_embedding: stable_embedding("airport", &flight.origin),
            destination_embedding: stable_embedding("airport", &flight.destination),
        }
    }

    fn route_features(&self, origin: &str, destination: &str) -> (f32, f32) {
        match (airports::lookup(origin), airports::lookup(destination)) {
            (Some(from), Some(to)) => {
                let km = airports::distance_km(from, to);
                (((km / MAX_ROUTE_KM) as f32).clamp(0.0, 1.0), 1.0)
            }
            _ => (0.0, 0.0),
        }
    }
}

/// Split a flight id into its normalized form and carrier designator.
///
/// Recognizes a 2-character IATA designator (at least one letter) or a
/// 3-letter ICAO designator, followed by 1-4 digits and an optional
/// operational suffix letter. Ids outside that grammar are still scored,
/// with the carrier set to `UNKNOWN_CARRIER`.
fn parse_flight_id(raw: &str) -> (String, String) {
    let id = raw.trim().to_ascii_uppercase();
    let carrier = carrier_designator(&id).unwrap_or(UNKNOWN_CARRIER).to_string();
    (id, carrier)
}

fn carrier_designator(id: &str) -> Option<&str> {
    if id.len() < 3 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    let designator_len = if id[..3].chars().all(|c| c.is_ascii_alphabetic()) {
        3
    } else {
        2
    };
    let (designator, number) = id.split_at(designator_len);

    if !designator.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let digits = number
        .strip_suffix(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(number);
    if digits.is_empty() || digits.len() > 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(designator)
}

fn normalize_airport_code(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim().to_ascii_uppercase();
    let well_formed =
        matches!(code.len(), 3 | 4) && code.chars().all(|c| c.is_ascii_alphabetic());
    if !well_formed {
        return Err(ValidationError::MalformedAirportCode {
            field,
            value: raw.to_string(),
        });
    }
    Ok(code)
}

/// True when both codes name the same airport, including IATA/ICAO pairs
fn same_airport(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (airports::lookup(a), airports::lookup(b)) {
        (Some(x), Some(y)) => x.iata == y.iata,
        _ => false,
    }
}

/// Map a key to [0, 1] through SHA-256 so embeddings are stable across runs
/// and platforms
fn stable_embedding(namespace: &str, key: &str) -> f32 {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    let bucket = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (bucket as f64 / (u32::MAX as f64 + 1.0)) as f32
}
