use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::authz::{self, ActorRef, AuthorizationError, CrewAction, PassengerView};
use super::collaborators::Collaborators;
use super::completion::{CompletionEvaluator, CompletionStatus};
use super::domain::{
    AssignmentStatus, ChecklistItemRef, ChecklistProgress, CrewAssignment, CrewRole, GuideId,
    PassengerId, PassengerStatus, Trip, TripError, TripId,
};
use super::phase::{self, TransitionError, TripPhase};
use super::readiness::{ReadinessEvaluator, ReadinessStatus};
use super::repository::{RepositoryError, TripRecord, TripRepository};
use super::risk::{self, RiskAssessment, RiskInputError, RiskInputs, RiskPolicy, RiskScore};

/// Service composing the authorization policy, the repository, and the two
/// gate evaluators. Every mutating operation authorizes first, re-validates
/// its gate at call time, and commits through the repository's versioned
/// update so racing transitions cannot both succeed.
pub struct TripService<R> {
    repository: Arc<R>,
    readiness: ReadinessEvaluator,
    completion: CompletionEvaluator,
    policy: RiskPolicy,
}

impl<R> TripService<R>
where
    R: TripRepository + 'static,
{
    pub fn new(repository: Arc<R>, collaborators: Collaborators, policy: RiskPolicy) -> Self {
        let readiness = ReadinessEvaluator::new(
            collaborators.attendance.clone(),
            collaborators.certifications.clone(),
            collaborators.approvals.clone(),
            policy,
        );
        let completion = CompletionEvaluator::new(
            collaborators.attendance,
            collaborators.handover,
            collaborators.tasks,
            collaborators.expenses,
        );

        Self {
            repository,
            readiness,
            completion,
            policy,
        }
    }

    /// Register a new trip with the engine.
    pub fn create_trip(&self, trip: Trip) -> Result<TripRecord, TripServiceError> {
        Ok(self.repository.insert(trip)?)
    }

    fn load(&self, trip_id: &TripId) -> Result<TripRecord, TripServiceError> {
        Ok(self
            .repository
            .fetch(trip_id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    /// Evaluate the departure gate from current stored state. Read-only.
    pub fn readiness(&self, trip_id: &TripId) -> Result<ReadinessStatus, TripServiceError> {
        let record = self.load(trip_id)?;
        Ok(self.readiness.evaluate(&record.trip))
    }

    /// Evaluate the completion gate from current stored state. Read-only.
    pub fn completion(&self, trip_id: &TripId) -> Result<CompletionStatus, TripServiceError> {
        let record = self.load(trip_id)?;
        Ok(self.completion.evaluate(&record.trip))
    }

    /// Manifest views with personal data masked per the actor's role.
    pub fn manifest(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
    ) -> Result<Vec<PassengerView>, TripServiceError> {
        let record = self.load(trip_id)?;
        Ok(record
            .trip
            .manifest
            .iter()
            .map(|passenger| authz::passenger_view(passenger, actor.role))
            .collect())
    }

    /// Validate and score risk inputs, then persist the snapshot. Validation
    /// failures reject the call before any state change.
    pub fn submit_risk_assessment(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
        inputs: RiskInputs,
    ) -> Result<RiskScore, TripServiceError> {
        authz::authorize(CrewAction::SubmitRiskAssessment, actor)?;

        let score = risk::score(&inputs, &self.policy)?;

        let mut record = self.load(trip_id)?;
        record.trip.assessments.push(RiskAssessment {
            recorded_at: Utc::now(),
            inputs,
            score: score.clone(),
        });
        self.repository.update(record)?;

        Ok(score)
    }

    pub fn set_checklist_item(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
        item: ChecklistItemRef,
        checked: bool,
    ) -> Result<ChecklistProgress, TripServiceError> {
        authz::authorize(CrewAction::EditChecklistItem, actor)?;

        let mut record = self.load(trip_id)?;
        record.trip.set_checklist_item(item, checked)?;
        let progress = match item {
            ChecklistItemRef::Facility(_) => record.trip.facility_progress(),
            ChecklistItemRef::Equipment(_) => record.trip.equipment_progress(),
        };
        self.repository.update(record)?;

        Ok(progress)
    }

    pub fn record_passenger_status(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
        passenger_id: &PassengerId,
        status: PassengerStatus,
    ) -> Result<(), TripServiceError> {
        authz::authorize(CrewAction::RecordPassengerStatus, actor)?;

        let mut record = self.load(trip_id)?;
        record.trip.record_passenger_status(passenger_id, status)?;
        self.repository.update(record)?;

        Ok(())
    }

    /// Accept or reject the actor's own crew assignment. Accepting while the
    /// trip is still in pre-trip moves it to before-departure; rejecting
    /// leaves the phase alone and flags the slot for re-dispatch.
    pub fn respond_to_assignment(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
        accept: bool,
    ) -> Result<TripRecord, TripServiceError> {
        authz::authorize(CrewAction::ConfirmOwnAssignment, actor)?;

        let mut record = self.load(trip_id)?;
        let assignment = record
            .trip
            .assignment_for_mut(&actor.id)
            .ok_or_else(|| TripError::NotAssigned(actor.id.clone()))?;

        if accept {
            assignment.status = AssignmentStatus::Confirmed;
            if record.trip.phase == TripPhase::PreTrip {
                phase::advance(record.trip.phase, TripPhase::BeforeDeparture)?;
                record.trip.phase = TripPhase::BeforeDeparture;
            }
            info!(trip = %record.trip.id, guide = %actor.id, "crew assignment confirmed");
        } else {
            assignment.status = AssignmentStatus::Rejected;
            info!(
                trip = %record.trip.id,
                guide = %actor.id,
                "crew assignment rejected, awaiting re-dispatch"
            );
        }

        Ok(self.repository.update(record)?)
    }

    pub fn assign_crew(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
        guide_id: GuideId,
        role: CrewRole,
    ) -> Result<TripRecord, TripServiceError> {
        authz::authorize(CrewAction::ManageCrew, actor)?;

        let mut record = self.load(trip_id)?;
        if record.trip.assignment_for(&guide_id).is_some() {
            return Err(TripError::AlreadyAssigned(guide_id).into());
        }
        record.trip.crew.push(CrewAssignment {
            guide_id,
            role,
            status: AssignmentStatus::Assigned,
        });

        Ok(self.repository.update(record)?)
    }

    /// Assignments are never deleted; removal transitions the assignment to
    /// rejected so the history stays intact.
    pub fn remove_crew(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
        guide_id: &GuideId,
    ) -> Result<TripRecord, TripServiceError> {
        authz::authorize(CrewAction::ManageCrew, actor)?;

        let mut record = self.load(trip_id)?;
        let assignment = record
            .trip
            .assignment_for_mut(guide_id)
            .ok_or_else(|| TripError::NotAssigned(guide_id.clone()))?;
        assignment.status = AssignmentStatus::Rejected;

        Ok(self.repository.update(record)?)
    }

    /// Move the trip to during-trip. The departure gate is re-evaluated at
    /// the moment of the call (including a fresh risk scoring of the latest
    /// assessment's inputs) and the phase change commits through the
    /// versioned update, so of two racing calls exactly one succeeds.
    pub fn start_trip(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
    ) -> Result<TripRecord, TripServiceError> {
        authz::authorize(CrewAction::TriggerStart, actor)?;

        let mut record = self.load(trip_id)?;
        require_confirmed_lead(&record.trip, actor)?;
        phase::advance(record.trip.phase, TripPhase::DuringTrip)?;

        let status = self.readiness.evaluate(&record.trip);
        if !status.can_start {
            return Err(TripServiceError::NotReady(status));
        }

        record.trip.phase = TripPhase::DuringTrip;
        let record = self.repository.update(record)?;
        info!(trip = %record.trip.id, lead = %actor.id, "trip started");

        Ok(record)
    }

    /// Move the trip to post-trip. Irreversible within the engine, so the
    /// caller must confirm explicitly (the completion read is step one of
    /// the two-step flow).
    pub fn end_trip(
        &self,
        trip_id: &TripId,
        actor: &ActorRef,
        confirmed: bool,
    ) -> Result<TripRecord, TripServiceError> {
        authz::authorize(CrewAction::TriggerEnd, actor)?;

        let mut record = self.load(trip_id)?;
        require_confirmed_lead(&record.trip, actor)?;

        if !confirmed {
            return Err(TripServiceError::ConfirmationRequired);
        }
        phase::advance(record.trip.phase, TripPhase::PostTrip)?;

        let status = self.completion.evaluate(&record.trip);
        if !status.can_complete {
            return Err(TripServiceError::Incomplete(status));
        }

        record.trip.phase = TripPhase::PostTrip;
        let record = self.repository.update(record)?;
        info!(trip = %record.trip.id, lead = %actor.id, "trip completed");

        Ok(record)
    }
}

fn require_confirmed_lead(trip: &Trip, actor: &ActorRef) -> Result<(), AuthorizationError> {
    match trip.confirmed_lead() {
        Some(lead) if lead.guide_id == actor.id => Ok(()),
        _ => Err(AuthorizationError::NotConfirmedLead {
            guide: actor.id.clone(),
        }),
    }
}

/// Error raised by the trip service. Gate failures carry the full itemized
/// status so callers always see the outstanding list, never a bare boolean.
#[derive(Debug, thiserror::Error)]
pub enum TripServiceError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    InvalidRiskInputs(#[from] RiskInputError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Trip(#[from] TripError),
    #[error("trip is not ready to start")]
    NotReady(ReadinessStatus),
    #[error("trip completion requirements are not met")]
    Incomplete(CompletionStatus),
    #[error("ending a trip requires explicit confirmation")]
    ConfirmationRequired,
}
