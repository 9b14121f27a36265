//! Trip lifecycle coordination: the phase state machine, the departure and
//! completion gates, risk scoring, and the crew authorization policy.

pub mod authz;
pub mod collaborators;
pub mod completion;
pub mod domain;
pub mod phase;
pub mod readiness;
pub mod repository;
pub mod risk;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use authz::{ActorRef, ActorRole, AuthorizationError, CrewAction, PassengerView};
pub use collaborators::{
    ApprovalRegistry, AttendanceLog, CertificationRegistry, CollaboratorError, Collaborators,
    ExpenseLedger, HandoverLog, HandoverStatus, TaskBoard, TripTask,
};
pub use completion::{CompletionCheck, CompletionEvaluator, CompletionStatus};
pub use domain::{
    AssignmentStatus, ChecklistConfig, ChecklistItemRef, ChecklistNamespace, ChecklistProgress,
    CrewAssignment, CrewRole, EquipmentItem, FacilityItem, FacilityRequirement, GuideId, Passenger,
    PassengerId, PassengerStatus, Trip, TripError, TripId,
};
pub use phase::{TransitionError, TripPhase};
pub use readiness::{ReadinessCheck, ReadinessEvaluator, ReadinessStatus};
pub use repository::{RepositoryError, TripRecord, TripRepository};
pub use risk::{
    GpsPoint, RiskAssessment, RiskInputError, RiskInputs, RiskLevel, RiskPolicy, RiskScore,
    WeatherCondition,
};
pub use router::trip_router;
pub use service::{TripService, TripServiceError};
