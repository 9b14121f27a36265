use serde::{Deserialize, Serialize};

use super::domain::{Trip, TripId};

/// Repository record pairing a trip with its optimistic-concurrency version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip: Trip,
    pub version: u64,
}

/// Storage abstraction so the engine can be exercised in isolation.
///
/// `update` must compare the record's version against the stored one and
/// reject mismatches with [`RepositoryError::Conflict`]; that check is what
/// gives phase transitions their at-most-once semantics, so two racing
/// start-trip calls cannot both commit.
pub trait TripRepository: Send + Sync {
    fn insert(&self, trip: Trip) -> Result<TripRecord, RepositoryError>;
    fn fetch(&self, id: &TripId) -> Result<Option<TripRecord>, RepositoryError>;
    fn update(&self, record: TripRecord) -> Result<TripRecord, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("trip state changed, reload")]
    Conflict,
    #[error("trip not found")]
    NotFound,
    #[error("trip store unavailable: {0}")]
    Unavailable(String),
}
