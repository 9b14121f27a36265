use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::phase::TripPhase;
use super::risk::RiskAssessment;

/// Identifier wrapper for trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId(pub String);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for guides (crew members).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuideId(pub String);

impl fmt::Display for GuideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for manifest passengers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassengerId(pub String);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operational role a guide holds on a specific trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewRole {
    Lead,
    Support,
}

impl CrewRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lead => "lead guide",
            Self::Support => "support guide",
        }
    }
}

/// Assignments are never deleted, only status-transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Confirmed,
    Rejected,
}

impl AssignmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewAssignment {
    pub guide_id: GuideId,
    pub role: CrewRole,
    pub status: AssignmentStatus,
}

/// Manifest status, forward-only: pending -> boarded -> returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerStatus {
    Pending,
    Boarded,
    Returned,
}

impl PassengerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Boarded => "boarded",
            Self::Returned => "returned",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Boarded => 1,
            Self::Returned => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: PassengerId,
    pub full_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: PassengerStatus,
}

/// Facility checklist item codes. A distinct enum from [`EquipmentItem`] so a
/// facility code can never be checked off in the equipment namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityItem {
    DockGate,
    BriefingArea,
    FuelStation,
    FirstAidStation,
    ColdStorage,
    WashdownBay,
}

impl FacilityItem {
    pub const fn code(self) -> &'static str {
        match self {
            Self::DockGate => "dock_gate",
            Self::BriefingArea => "briefing_area",
            Self::FuelStation => "fuel_station",
            Self::FirstAidStation => "first_aid_station",
            Self::ColdStorage => "cold_storage",
            Self::WashdownBay => "washdown_bay",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "dock_gate" => Some(Self::DockGate),
            "briefing_area" => Some(Self::BriefingArea),
            "fuel_station" => Some(Self::FuelStation),
            "first_aid_station" => Some(Self::FirstAidStation),
            "cold_storage" => Some(Self::ColdStorage),
            "washdown_bay" => Some(Self::WashdownBay),
            _ => None,
        }
    }
}

/// Equipment checklist item codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentItem {
    LifeJackets,
    Radio,
    FirstAidKit,
    FlareKit,
    TowLine,
    GpsUnit,
}

impl EquipmentItem {
    pub const fn code(self) -> &'static str {
        match self {
            Self::LifeJackets => "life_jackets",
            Self::Radio => "radio",
            Self::FirstAidKit => "first_aid_kit",
            Self::FlareKit => "flare_kit",
            Self::TowLine => "tow_line",
            Self::GpsUnit => "gps_unit",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "life_jackets" => Some(Self::LifeJackets),
            "radio" => Some(Self::Radio),
            "first_aid_kit" => Some(Self::FirstAidKit),
            "flare_kit" => Some(Self::FlareKit),
            "tow_line" => Some(Self::TowLine),
            "gps_unit" => Some(Self::GpsUnit),
            _ => None,
        }
    }
}

/// The two disjoint checklist namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistNamespace {
    Facility,
    Equipment,
}

impl ChecklistNamespace {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Facility => "facility",
            Self::Equipment => "equipment",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "facility" => Some(Self::Facility),
            "equipment" => Some(Self::Equipment),
            _ => None,
        }
    }
}

/// A typed reference into one of the two namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistItemRef {
    Facility(FacilityItem),
    Equipment(EquipmentItem),
}

/// Facility requirements carry an inclusion flag: items excluded from the
/// trip's package are informational only and never count toward completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRequirement {
    pub item: FacilityItem,
    pub included: bool,
}

/// Checklist item sets are configured by operations per trip/package and
/// snapshotted onto the trip at creation time, so historical readiness
/// evaluations stay reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistConfig {
    pub facility: Vec<FacilityRequirement>,
    pub equipment: Vec<EquipmentItem>,
}

impl ChecklistConfig {
    pub fn has_facility(&self, item: FacilityItem) -> bool {
        self.facility.iter().any(|req| req.item == item)
    }

    pub fn has_equipment(&self, item: EquipmentItem) -> bool {
        self.equipment.contains(&item)
    }

    fn included_facility(&self) -> impl Iterator<Item = FacilityItem> + '_ {
        self.facility
            .iter()
            .filter(|req| req.included)
            .map(|req| req.item)
    }
}

/// Checked-versus-total counts for one checklist namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub checked: usize,
    pub total: usize,
}

impl ChecklistProgress {
    pub const fn complete(self) -> bool {
        self.checked >= self.total
    }
}

/// A trip as the engine sees it. The phase field is the single source of
/// truth for lifecycle position; there is no separate completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    pub scheduled_on: NaiveDate,
    pub phase: TripPhase,
    pub crew: Vec<CrewAssignment>,
    pub manifest: Vec<Passenger>,
    pub checklist: ChecklistConfig,
    pub facility_checked: BTreeSet<FacilityItem>,
    pub equipment_checked: BTreeSet<EquipmentItem>,
    pub assessments: Vec<RiskAssessment>,
    pub documentation_url: Option<String>,
    pub logistics_tracked: bool,
    pub passenger_tracking: bool,
}

impl Trip {
    /// The confirmed lead, if any. Absence is a valid, flagged state.
    pub fn confirmed_lead(&self) -> Option<&CrewAssignment> {
        self.crew.iter().find(|assignment| {
            assignment.role == CrewRole::Lead && assignment.status == AssignmentStatus::Confirmed
        })
    }

    /// The actor's non-rejected assignment on this trip, if any.
    pub fn assignment_for(&self, guide: &GuideId) -> Option<&CrewAssignment> {
        self.crew.iter().find(|assignment| {
            &assignment.guide_id == guide && assignment.status != AssignmentStatus::Rejected
        })
    }

    pub fn assignment_for_mut(&mut self, guide: &GuideId) -> Option<&mut CrewAssignment> {
        self.crew.iter_mut().find(|assignment| {
            &assignment.guide_id == guide && assignment.status != AssignmentStatus::Rejected
        })
    }

    /// Guides currently attached to the trip (assigned or confirmed).
    pub fn active_guides(&self) -> Vec<GuideId> {
        self.crew
            .iter()
            .filter(|assignment| assignment.status != AssignmentStatus::Rejected)
            .map(|assignment| assignment.guide_id.clone())
            .collect()
    }

    pub fn latest_assessment(&self) -> Option<&RiskAssessment> {
        self.assessments.last()
    }

    /// Included facility items only; excluded ones never enter the counts.
    pub fn facility_progress(&self) -> ChecklistProgress {
        let mut checked = 0;
        let mut total = 0;
        for item in self.checklist.included_facility() {
            total += 1;
            if self.facility_checked.contains(&item) {
                checked += 1;
            }
        }
        ChecklistProgress { checked, total }
    }

    pub fn equipment_progress(&self) -> ChecklistProgress {
        let checked = self
            .checklist
            .equipment
            .iter()
            .filter(|item| self.equipment_checked.contains(item))
            .count();
        ChecklistProgress {
            checked,
            total: self.checklist.equipment.len(),
        }
    }

    /// Toggle a configured checklist item. Items outside the trip's
    /// configured set are rejected; excluded facility items may still be
    /// toggled (they are informational) but never affect the counts.
    pub fn set_checklist_item(
        &mut self,
        item: ChecklistItemRef,
        checked: bool,
    ) -> Result<(), TripError> {
        match item {
            ChecklistItemRef::Facility(item) => {
                if !self.checklist.has_facility(item) {
                    return Err(TripError::ItemNotConfigured {
                        namespace: ChecklistNamespace::Facility,
                        code: item.code(),
                    });
                }
                if checked {
                    self.facility_checked.insert(item);
                } else {
                    self.facility_checked.remove(&item);
                }
            }
            ChecklistItemRef::Equipment(item) => {
                if !self.checklist.has_equipment(item) {
                    return Err(TripError::ItemNotConfigured {
                        namespace: ChecklistNamespace::Equipment,
                        code: item.code(),
                    });
                }
                if checked {
                    self.equipment_checked.insert(item);
                } else {
                    self.equipment_checked.remove(&item);
                }
            }
        }
        Ok(())
    }

    /// Move a passenger forward through the manifest lifecycle. Backward and
    /// repeated transitions are rejected.
    pub fn record_passenger_status(
        &mut self,
        passenger_id: &PassengerId,
        status: PassengerStatus,
    ) -> Result<(), TripError> {
        let passenger = self
            .manifest
            .iter_mut()
            .find(|passenger| &passenger.id == passenger_id)
            .ok_or_else(|| TripError::PassengerNotFound(passenger_id.clone()))?;

        if status.rank() <= passenger.status.rank() {
            return Err(TripError::PassengerStatusRegression {
                passenger: passenger_id.clone(),
                from: passenger.status,
                to: status,
            });
        }

        passenger.status = status;
        Ok(())
    }

    pub fn returned_count(&self) -> usize {
        self.manifest
            .iter()
            .filter(|passenger| passenger.status == PassengerStatus::Returned)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TripError {
    #[error("{} item '{code}' is not configured for this trip", .namespace.code())]
    ItemNotConfigured {
        namespace: ChecklistNamespace,
        code: &'static str,
    },
    #[error("passenger {0} is not on this trip's manifest")]
    PassengerNotFound(PassengerId),
    #[error(
        "passenger {passenger} cannot move from {} to {}",
        .from.label(),
        .to.label()
    )]
    PassengerStatusRegression {
        passenger: PassengerId,
        from: PassengerStatus,
        to: PassengerStatus,
    },
    #[error("guide {0} already holds an active assignment on this trip")]
    AlreadyAssigned(GuideId),
    #[error("guide {0} has no active assignment on this trip")]
    NotAssigned(GuideId),
}
