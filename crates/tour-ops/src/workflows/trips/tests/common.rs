use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::trips::authz::{ActorRef, ActorRole};
use crate::workflows::trips::collaborators::{
    ApprovalRegistry, AttendanceLog, CertificationRegistry, CollaboratorError, Collaborators,
    ExpenseLedger, HandoverLog, HandoverStatus, TaskBoard, TripTask,
};
use crate::workflows::trips::domain::{
    AssignmentStatus, ChecklistConfig, CrewAssignment, CrewRole, EquipmentItem, FacilityItem,
    FacilityRequirement, GuideId, Passenger, PassengerId, PassengerStatus, Trip, TripId,
};
use crate::workflows::trips::phase::TripPhase;
use crate::workflows::trips::repository::{RepositoryError, TripRecord, TripRepository};
use crate::workflows::trips::risk::{RiskInputs, RiskPolicy, WeatherCondition};
use crate::workflows::trips::service::TripService;

pub(super) const LEAD_GUIDE: &str = "guide-lena";
pub(super) const SUPPORT_GUIDE: &str = "guide-marco";

pub(super) fn lead_actor() -> ActorRef {
    ActorRef::new(LEAD_GUIDE, Some(ActorRole::Lead))
}

pub(super) fn support_actor() -> ActorRef {
    ActorRef::new(SUPPORT_GUIDE, Some(ActorRole::Support))
}

pub(super) fn admin_actor() -> ActorRef {
    ActorRef::new("ops-desk", Some(ActorRole::OpsAdmin))
}

pub(super) fn checklist_config() -> ChecklistConfig {
    ChecklistConfig {
        facility: vec![
            FacilityRequirement {
                item: FacilityItem::DockGate,
                included: true,
            },
            FacilityRequirement {
                item: FacilityItem::BriefingArea,
                included: true,
            },
            // Not part of this trip's package; informational only.
            FacilityRequirement {
                item: FacilityItem::ColdStorage,
                included: false,
            },
        ],
        equipment: vec![
            EquipmentItem::LifeJackets,
            EquipmentItem::Radio,
            EquipmentItem::FirstAidKit,
        ],
    }
}

pub(super) fn passenger(id: &str, name: &str) -> Passenger {
    Passenger {
        id: PassengerId(id.to_string()),
        full_name: name.to_string(),
        phone: Some("+45 555 0101".to_string()),
        notes: Some("prefers the bow seat".to_string()),
        status: PassengerStatus::Pending,
    }
}

/// A trip in before-departure with confirmed crew and nothing checked yet.
pub(super) fn trip(id: &str) -> Trip {
    Trip {
        id: TripId(id.to_string()),
        title: "Fjord morning tour".to_string(),
        scheduled_on: NaiveDate::from_ymd_opt(2025, 6, 14).expect("valid date"),
        phase: TripPhase::BeforeDeparture,
        crew: vec![
            CrewAssignment {
                guide_id: GuideId(LEAD_GUIDE.to_string()),
                role: CrewRole::Lead,
                status: AssignmentStatus::Confirmed,
            },
            CrewAssignment {
                guide_id: GuideId(SUPPORT_GUIDE.to_string()),
                role: CrewRole::Support,
                status: AssignmentStatus::Confirmed,
            },
        ],
        manifest: vec![
            passenger("pax-1", "Astrid Holm"),
            passenger("pax-2", "Jonas Berg"),
        ],
        checklist: checklist_config(),
        facility_checked: BTreeSet::new(),
        equipment_checked: BTreeSet::new(),
        assessments: Vec::new(),
        documentation_url: None,
        logistics_tracked: true,
        passenger_tracking: true,
    }
}

pub(super) fn calm_inputs() -> RiskInputs {
    RiskInputs {
        wave_height_m: Some(0.5),
        wind_speed_kmh: Some(15.0),
        weather: Some(WeatherCondition::Clear),
        crew_ready: true,
        equipment_complete: true,
        gps: None,
    }
}

pub(super) fn storm_inputs() -> RiskInputs {
    RiskInputs {
        wave_height_m: None,
        wind_speed_kmh: Some(80.0),
        weather: Some(WeatherCondition::Stormy),
        crew_ready: true,
        equipment_complete: true,
        gps: None,
    }
}

/// A trip with every departure requirement satisfied locally: full
/// checklists and a calm latest assessment.
pub(super) fn ready_trip(id: &str) -> Trip {
    let mut trip = trip(id);
    trip.facility_checked.insert(FacilityItem::DockGate);
    trip.facility_checked.insert(FacilityItem::BriefingArea);
    trip.equipment_checked.insert(EquipmentItem::LifeJackets);
    trip.equipment_checked.insert(EquipmentItem::Radio);
    trip.equipment_checked.insert(EquipmentItem::FirstAidKit);
    trip.assessments.push(
        crate::workflows::trips::risk::RiskAssessment::record(
            calm_inputs(),
            &RiskPolicy::default(),
            chrono::Utc::now(),
        )
        .expect("calm inputs are valid"),
    );
    trip
}

#[derive(Default)]
pub(super) struct MemoryTripRepository {
    records: Mutex<HashMap<TripId, TripRecord>>,
}

impl TripRepository for MemoryTripRepository {
    fn insert(&self, trip: Trip) -> Result<TripRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&trip.id) {
            return Err(RepositoryError::Conflict);
        }
        let record = TripRecord { trip, version: 1 };
        guard.insert(record.trip.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &TripId) -> Result<Option<TripRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, record: TripRecord) -> Result<TripRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get(&record.trip.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != record.version {
            return Err(RepositoryError::Conflict);
        }
        let updated = TripRecord {
            trip: record.trip,
            version: record.version + 1,
        };
        guard.insert(updated.trip.id.clone(), updated.clone());
        Ok(updated)
    }
}

/// Scriptable stand-in for every collaborator the evaluators consult.
pub(super) struct ScriptedOps {
    pub(super) checked_in: Mutex<bool>,
    pub(super) checked_out: Mutex<bool>,
    pub(super) certifications_valid: Mutex<bool>,
    pub(super) departure_approved: Mutex<bool>,
    pub(super) handover: Mutex<HandoverStatus>,
    pub(super) tasks: Mutex<Vec<TripTask>>,
    pub(super) expenses_submitted: Mutex<bool>,
    pub(super) payment_split_calculated: Mutex<bool>,
}

impl ScriptedOps {
    /// Everything green: departure and completion gates both pass.
    pub(super) fn all_good() -> Arc<Self> {
        Arc::new(Self {
            checked_in: Mutex::new(true),
            checked_out: Mutex::new(true),
            certifications_valid: Mutex::new(true),
            departure_approved: Mutex::new(true),
            handover: Mutex::new(HandoverStatus::Completed),
            tasks: Mutex::new(vec![TripTask {
                code: "gear-washdown".to_string(),
                name: "Gear wash-down".to_string(),
                required: true,
                completed: true,
            }]),
            expenses_submitted: Mutex::new(true),
            payment_split_calculated: Mutex::new(true),
        })
    }

    pub(super) fn set_checked_in(&self, value: bool) {
        *self.checked_in.lock().expect("ops mutex poisoned") = value;
    }

    pub(super) fn set_checked_out(&self, value: bool) {
        *self.checked_out.lock().expect("ops mutex poisoned") = value;
    }

    pub(super) fn set_certifications_valid(&self, value: bool) {
        *self.certifications_valid.lock().expect("ops mutex poisoned") = value;
    }

    pub(super) fn set_departure_approved(&self, value: bool) {
        *self.departure_approved.lock().expect("ops mutex poisoned") = value;
    }

    pub(super) fn set_handover(&self, value: HandoverStatus) {
        *self.handover.lock().expect("ops mutex poisoned") = value;
    }

    pub(super) fn set_tasks(&self, value: Vec<TripTask>) {
        *self.tasks.lock().expect("ops mutex poisoned") = value;
    }

    pub(super) fn set_expenses_submitted(&self, value: bool) {
        *self.expenses_submitted.lock().expect("ops mutex poisoned") = value;
    }

    pub(super) fn set_payment_split_calculated(&self, value: bool) {
        *self.payment_split_calculated.lock().expect("ops mutex poisoned") = value;
    }
}

impl AttendanceLog for ScriptedOps {
    fn crew_checked_in(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.checked_in.lock().expect("ops mutex poisoned"))
    }

    fn crew_checked_out(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.checked_out.lock().expect("ops mutex poisoned"))
    }
}

impl CertificationRegistry for ScriptedOps {
    fn certifications_valid(&self, _guides: &[GuideId]) -> Result<bool, CollaboratorError> {
        Ok(*self.certifications_valid.lock().expect("ops mutex poisoned"))
    }
}

impl ApprovalRegistry for ScriptedOps {
    fn departure_approved(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.departure_approved.lock().expect("ops mutex poisoned"))
    }
}

impl HandoverLog for ScriptedOps {
    fn inbound_handover(&self, _trip: &TripId) -> Result<HandoverStatus, CollaboratorError> {
        Ok(*self.handover.lock().expect("ops mutex poisoned"))
    }
}

impl TaskBoard for ScriptedOps {
    fn tasks_for(&self, _trip: &TripId) -> Result<Vec<TripTask>, CollaboratorError> {
        Ok(self.tasks.lock().expect("ops mutex poisoned").clone())
    }
}

impl ExpenseLedger for ScriptedOps {
    fn expenses_submitted(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.expenses_submitted.lock().expect("ops mutex poisoned"))
    }

    fn payment_split_calculated(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.payment_split_calculated.lock().expect("ops mutex poisoned"))
    }
}

/// Collaborator that always fails, for degrade-path tests.
pub(super) struct UnreachableOps;

fn unreachable(system: &'static str) -> CollaboratorError {
    CollaboratorError::Unavailable {
        system,
        reason: "connection refused".to_string(),
    }
}

impl AttendanceLog for UnreachableOps {
    fn crew_checked_in(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Err(unreachable("attendance log"))
    }

    fn crew_checked_out(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Err(unreachable("attendance log"))
    }
}

impl CertificationRegistry for UnreachableOps {
    fn certifications_valid(&self, _guides: &[GuideId]) -> Result<bool, CollaboratorError> {
        Err(unreachable("certification registry"))
    }
}

impl ApprovalRegistry for UnreachableOps {
    fn departure_approved(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Err(unreachable("approval registry"))
    }
}

impl HandoverLog for UnreachableOps {
    fn inbound_handover(&self, _trip: &TripId) -> Result<HandoverStatus, CollaboratorError> {
        Err(unreachable("logistics handover log"))
    }
}

impl TaskBoard for UnreachableOps {
    fn tasks_for(&self, _trip: &TripId) -> Result<Vec<TripTask>, CollaboratorError> {
        Err(unreachable("task board"))
    }
}

impl ExpenseLedger for UnreachableOps {
    fn expenses_submitted(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Err(unreachable("expense ledger"))
    }

    fn payment_split_calculated(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Err(unreachable("expense ledger"))
    }
}

pub(super) fn collaborators_from(ops: &Arc<ScriptedOps>) -> Collaborators {
    Collaborators {
        attendance: ops.clone(),
        certifications: ops.clone(),
        approvals: ops.clone(),
        handover: ops.clone(),
        tasks: ops.clone(),
        expenses: ops.clone(),
    }
}

pub(super) fn build_service() -> (
    Arc<TripService<MemoryTripRepository>>,
    Arc<MemoryTripRepository>,
    Arc<ScriptedOps>,
) {
    let repository = Arc::new(MemoryTripRepository::default());
    let ops = ScriptedOps::all_good();
    let service = Arc::new(TripService::new(
        repository.clone(),
        collaborators_from(&ops),
        RiskPolicy::default(),
    ));
    (service, repository, ops)
}
