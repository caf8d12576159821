//! In-memory flight status repository

use super::{normalize_flight_id, FlightRepository, FlightStatus};
use anyhow::Result;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

/// Flights held before the least recently updated one is evicted
pub const DEFAULT_MAX_FLIGHTS: usize = 10_000;

/// Flight statuses keyed by normalized flight id.
///
/// Holds at most `max_flights` entries; inserting a new flight beyond that
/// evicts the one with the oldest `updated_at`.
#[derive(Debug)]
pub struct InMemoryFlightRepository {
    flights: DashMap<String, FlightStatus>,
    max_flights: usize,
}

impl Default for InMemoryFlightRepository {
    fn default() -> Self {
        Self::with_max_flights(DEFAULT_MAX_FLIGHTS)
    }
}

impl InMemoryFlightRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_flights(max_flights: usize) -> Self {
        Self {
            flights: DashMap::new(),
            max_flights: max_flights.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Drop the stalest flights other than `keep` until within bounds
    fn evict_overflow(&self, keep: &str) {
        while self.flights.len() > self.max_flights {
            let oldest = self
                .flights
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().updated_at)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(flight) => {
                    self.flights.remove(&flight);
                    debug!(flight = %flight, "Evicted stalest flight status");
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn find_latest(&self, flight: &str) -> Result<Option<FlightStatus>> {
        let key = normalize_flight_id(flight);
        Ok(self.flights.get(&key).map(|r| r.clone()))
    }

    async fn upsert(&self, status: FlightStatus) -> Result<FlightStatus> {
        let key = normalize_flight_id(&status.flight);

        let held = match self.flights.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if status.updated_at >= entry.get().updated_at {
                    entry.insert(status);
                } else {
                    debug!(
                        flight = %entry.key(),
                        "Ignoring status older than the stored one"
                    );
                }
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(status).clone(),
        };

        self.evict_overflow(&key);
        Ok(held)
    }
}
