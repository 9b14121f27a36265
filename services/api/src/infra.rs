use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tour_ops::workflows::trips::{
    ApprovalRegistry, AssignmentStatus, AttendanceLog, CertificationRegistry, ChecklistConfig,
    CollaboratorError, Collaborators, CrewAssignment, CrewRole, EquipmentItem, ExpenseLedger,
    FacilityItem, FacilityRequirement, GuideId, HandoverLog, HandoverStatus, Passenger,
    PassengerId, PassengerStatus, RepositoryError, RiskPolicy, TaskBoard, Trip, TripId,
    TripPhase, TripRecord, TripRepository, TripTask,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryTripRepository {
    records: Mutex<HashMap<TripId, TripRecord>>,
}

impl TripRepository for InMemoryTripRepository {
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

/// In-memory stand-in for the attendance, certification, approval, handover,
/// task, and expense systems the engine consults. The demo command scripts
/// it; a deployment replaces it with real adapters.
pub(crate) struct InMemoryOperationsHub {
    checked_in: Mutex<bool>,
    checked_out: Mutex<bool>,
    certifications_valid: Mutex<bool>,
    departure_approved: Mutex<bool>,
    handover: Mutex<HandoverStatus>,
    tasks: Mutex<Vec<TripTask>>,
    expenses_submitted: Mutex<bool>,
    payment_split_calculated: Mutex<bool>,
}

impl Default for InMemoryOperationsHub {
    fn default() -> Self {
        Self {
            checked_in: Mutex::new(false),
            checked_out: Mutex::new(false),
            certifications_valid: Mutex::new(true),
            departure_approved: Mutex::new(false),
            handover: Mutex::new(HandoverStatus::Pending),
            tasks: Mutex::new(vec![
                TripTask {
                    code: "gear-washdown".to_string(),
                    name: "Gear wash-down".to_string(),
                    required: true,
                    completed: false,
                },
                TripTask {
                    code: "guest-survey".to_string(),
                    name: "Send guest survey".to_string(),
                    required: false,
                    completed: false,
                },
            ]),
            expenses_submitted: Mutex::new(false),
            payment_split_calculated: Mutex::new(true),
        }
    }
}

impl InMemoryOperationsHub {
    pub(crate) fn set_checked_in(&self, value: bool) {
        *self.checked_in.lock().expect("hub mutex poisoned") = value;
    }

    pub(crate) fn set_checked_out(&self, value: bool) {
        *self.checked_out.lock().expect("hub mutex poisoned") = value;
    }

    pub(crate) fn set_departure_approved(&self, value: bool) {
        *self.departure_approved.lock().expect("hub mutex poisoned") = value;
    }

    pub(crate) fn set_handover(&self, value: HandoverStatus) {
        *self.handover.lock().expect("hub mutex poisoned") = value;
    }

    pub(crate) fn complete_required_tasks(&self) {
        let mut guard = self.tasks.lock().expect("hub mutex poisoned");
        for task in guard.iter_mut().filter(|task| task.required) {
            task.completed = true;
        }
    }
}

impl AttendanceLog for InMemoryOperationsHub {
    fn crew_checked_in(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.checked_in.lock().expect("hub mutex poisoned"))
    }

    fn crew_checked_out(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.checked_out.lock().expect("hub mutex poisoned"))
    }
}

impl CertificationRegistry for InMemoryOperationsHub {
    fn certifications_valid(&self, _guides: &[GuideId]) -> Result<bool, CollaboratorError> {
        Ok(*self.certifications_valid.lock().expect("hub mutex poisoned"))
    }
}

impl ApprovalRegistry for InMemoryOperationsHub {
    fn departure_approved(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.departure_approved.lock().expect("hub mutex poisoned"))
    }
}

impl HandoverLog for InMemoryOperationsHub {
    fn inbound_handover(&self, _trip: &TripId) -> Result<HandoverStatus, CollaboratorError> {
        Ok(*self.handover.lock().expect("hub mutex poisoned"))
    }
}

impl TaskBoard for InMemoryOperationsHub {
    fn tasks_for(&self, _trip: &TripId) -> Result<Vec<TripTask>, CollaboratorError> {
        Ok(self.tasks.lock().expect("hub mutex poisoned").clone())
    }
}

impl ExpenseLedger for InMemoryOperationsHub {
    fn expenses_submitted(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.expenses_submitted.lock().expect("hub mutex poisoned"))
    }

    fn payment_split_calculated(&self, _trip: &TripId) -> Result<bool, CollaboratorError> {
        Ok(*self.payment_split_calculated.lock().expect("hub mutex poisoned"))
    }
}

pub(crate) fn collaborators_from(hub: &Arc<InMemoryOperationsHub>) -> Collaborators {
    Collaborators {
        attendance: hub.clone(),
        certifications: hub.clone(),
        approvals: hub.clone(),
        handover: hub.clone(),
        tasks: hub.clone(),
        expenses: hub.clone(),
    }
}

pub(crate) fn default_risk_policy() -> RiskPolicy {
    RiskPolicy::default()
}

/// Sample trip seeded at startup so the API is explorable out of the box.
pub(crate) fn sample_trip(id: &str, scheduled_on: NaiveDate) -> Trip {
    Trip {
        id: TripId(id.to_string()),
        title: "Skerry coast full-day tour".to_string(),
        scheduled_on,
        phase: TripPhase::PreTrip,
        crew: vec![
            CrewAssignment {
                guide_id: GuideId("guide-lena".to_string()),
                role: CrewRole::Lead,
                status: AssignmentStatus::Assigned,
            },
            CrewAssignment {
                guide_id: GuideId("guide-marco".to_string()),
                role: CrewRole::Support,
                status: AssignmentStatus::Assigned,
            },
        ],
        manifest: vec![
            Passenger {
                id: PassengerId("pax-1".to_string()),
                full_name: "Astrid Holm".to_string(),
                phone: Some("+45 555 0101".to_string()),
                notes: Some("prefers the bow seat".to_string()),
                status: PassengerStatus::Pending,
            },
            Passenger {
                id: PassengerId("pax-2".to_string()),
                full_name: "Jonas Berg".to_string(),
                phone: Some("+45 555 0102".to_string()),
                notes: None,
                status: PassengerStatus::Pending,
            },
            Passenger {
                id: PassengerId("pax-3".to_string()),
                full_name: "Mette Friis".to_string(),
                phone: None,
                notes: Some("vegetarian lunch".to_string()),
                status: PassengerStatus::Pending,
            },
        ],
        checklist: ChecklistConfig {
            facility: vec![
                FacilityRequirement {
                    item: FacilityItem::DockGate,
                    included: true,
                },
                FacilityRequirement {
                    item: FacilityItem::BriefingArea,
                    included: true,
                },
                FacilityRequirement {
                    item: FacilityItem::ColdStorage,
                    included: false,
                },
            ],
            equipment: vec![
                EquipmentItem::LifeJackets,
                EquipmentItem::Radio,
                EquipmentItem::FirstAidKit,
                EquipmentItem::FlareKit,
            ],
        },
        facility_checked: BTreeSet::new(),
        equipment_checked: BTreeSet::new(),
        assessments: Vec::new(),
        documentation_url: None,
        logistics_tracked: true,
        passenger_tracking: true,
    }
}
