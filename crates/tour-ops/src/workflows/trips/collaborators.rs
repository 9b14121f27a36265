//! Interfaces to the external systems the evaluators read.
//!
//! Implementations live outside the engine (the API service wires in-memory
//! ones; production wires real services). Each call is independent blocking
//! I/O with its own failure mode; evaluators degrade a failed sub-check
//! instead of aborting the whole evaluation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{GuideId, TripId};

#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{system} unavailable: {reason}")]
    Unavailable { system: &'static str, reason: String },
    #[error("{system} timed out after {waited_ms} ms")]
    Timeout { system: &'static str, waited_ms: u64 },
}

/// Crew attendance records (check-in before departure, check-out after).
pub trait AttendanceLog: Send + Sync {
    fn crew_checked_in(&self, trip: &TripId) -> Result<bool, CollaboratorError>;
    fn crew_checked_out(&self, trip: &TripId) -> Result<bool, CollaboratorError>;
}

/// External certification registry; the engine consumes a single validity
/// verdict for the trip's active crew.
pub trait CertificationRegistry: Send + Sync {
    fn certifications_valid(&self, guides: &[GuideId]) -> Result<bool, CollaboratorError>;
}

/// Operations-side departure approval.
pub trait ApprovalRegistry: Send + Sync {
    fn departure_approved(&self, trip: &TripId) -> Result<bool, CollaboratorError>;
}

/// Inbound logistics handover state for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverStatus {
    Completed,
    Pending,
    /// The logistics subsystem has no record for this trip.
    NotTracked,
}

pub trait HandoverLog: Send + Sync {
    fn inbound_handover(&self, trip: &TripId) -> Result<HandoverStatus, CollaboratorError>;
}

/// A post-trip obligation tracked by the task system. Only `required` tasks
/// gate completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripTask {
    pub code: String,
    pub name: String,
    pub required: bool,
    pub completed: bool,
}

pub trait TaskBoard: Send + Sync {
    fn tasks_for(&self, trip: &TripId) -> Result<Vec<TripTask>, CollaboratorError>;
}

/// Expense and payment-split state; both signals are soft (warning-only).
pub trait ExpenseLedger: Send + Sync {
    fn expenses_submitted(&self, trip: &TripId) -> Result<bool, CollaboratorError>;
    fn payment_split_calculated(&self, trip: &TripId) -> Result<bool, CollaboratorError>;
}

/// The full set of collaborator handles the engine needs.
#[derive(Clone)]
pub struct Collaborators {
    pub attendance: Arc<dyn AttendanceLog>,
    pub certifications: Arc<dyn CertificationRegistry>,
    pub approvals: Arc<dyn ApprovalRegistry>,
    pub handover: Arc<dyn HandoverLog>,
    pub tasks: Arc<dyn TaskBoard>,
    pub expenses: Arc<dyn ExpenseLedger>,
}
