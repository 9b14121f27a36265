//! The departure gate.
//!
//! Six required sub-checks, evaluated independently in a fixed order so the
//! caller always receives the complete, stable remediation list. Evaluation
//! never mutates anything and is safe to re-run on any cadence.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::collaborators::{ApprovalRegistry, AttendanceLog, CertificationRegistry};
use super::domain::Trip;
use super::risk::{self, RiskPolicy};

/// The required departure sub-checks, in evaluation (and presentation) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessCheck {
    CrewAttendance,
    FacilityChecklist,
    EquipmentChecklist,
    RiskAssessment,
    Certifications,
    AdminApproval,
}

impl ReadinessCheck {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::CrewAttendance,
            Self::FacilityChecklist,
            Self::EquipmentChecklist,
            Self::RiskAssessment,
            Self::Certifications,
            Self::AdminApproval,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CrewAttendance => "crew attendance",
            Self::FacilityChecklist => "facility checklist",
            Self::EquipmentChecklist => "equipment checklist",
            Self::RiskAssessment => "risk assessment",
            Self::Certifications => "crew certifications",
            Self::AdminApproval => "admin approval",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessCheckOutcome {
    pub check: ReadinessCheck,
    pub satisfied: bool,
    pub detail: String,
}

/// Computed snapshot, never persisted. `can_start` is true iff every
/// required sub-check passed; `missing` lists failing checks' reasons in
/// evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessStatus {
    pub can_start: bool,
    pub checks: Vec<ReadinessCheckOutcome>,
    pub missing: Vec<String>,
}

pub struct ReadinessEvaluator {
    attendance: Arc<dyn AttendanceLog>,
    certifications: Arc<dyn CertificationRegistry>,
    approvals: Arc<dyn ApprovalRegistry>,
    policy: RiskPolicy,
}

impl ReadinessEvaluator {
    pub fn new(
        attendance: Arc<dyn AttendanceLog>,
        certifications: Arc<dyn CertificationRegistry>,
        approvals: Arc<dyn ApprovalRegistry>,
        policy: RiskPolicy,
    ) -> Self {
        Self {
            attendance,
            certifications,
            approvals,
            policy,
        }
    }

    pub fn evaluate(&self, trip: &Trip) -> ReadinessStatus {
        let mut checks = Vec::with_capacity(6);

        for check in ReadinessCheck::ordered() {
            let (satisfied, detail) = match check {
                ReadinessCheck::CrewAttendance => self.crew_attendance(trip),
                ReadinessCheck::FacilityChecklist => facility_checklist(trip),
                ReadinessCheck::EquipmentChecklist => equipment_checklist(trip),
                ReadinessCheck::RiskAssessment => self.risk_assessment(trip),
                ReadinessCheck::Certifications => self.certifications(trip),
                ReadinessCheck::AdminApproval => self.admin_approval(trip),
            };
            checks.push(ReadinessCheckOutcome {
                check,
                satisfied,
                detail,
            });
        }

        let missing: Vec<String> = checks
            .iter()
            .filter(|outcome| !outcome.satisfied)
            .map(|outcome| outcome.detail.clone())
            .collect();

        ReadinessStatus {
            can_start: missing.is_empty(),
            checks,
            missing,
        }
    }

    fn crew_attendance(&self, trip: &Trip) -> (bool, String) {
        match self.attendance.crew_checked_in(&trip.id) {
            Ok(true) => (true, "crew checked in".to_string()),
            Ok(false) => (false, "crew not checked in".to_string()),
            Err(err) => degraded(&trip.id, ReadinessCheck::CrewAttendance, &err),
        }
    }

    fn risk_assessment(&self, trip: &Trip) -> (bool, String) {
        let Some(assessment) = trip.latest_assessment() else {
            return (false, "no risk assessment recorded".to_string());
        };

        // Point-in-time: re-score from the stored inputs rather than trusting
        // the score persisted when the assessment was submitted.
        match risk::score(&assessment.inputs, &self.policy) {
            Ok(score) if score.blocked => (
                false,
                format!(
                    "risk score {} exceeds the departure block threshold {}",
                    score.score, self.policy.block_threshold
                ),
            ),
            Ok(score) => (
                true,
                format!("risk score {} ({})", score.score, score.level.label()),
            ),
            Err(err) => (
                false,
                format!("latest risk assessment inputs are invalid: {err}"),
            ),
        }
    }

    fn certifications(&self, trip: &Trip) -> (bool, String) {
        let guides = trip.active_guides();
        match self.certifications.certifications_valid(&guides) {
            Ok(true) => (true, "crew certifications valid".to_string()),
            Ok(false) => (false, "crew certifications missing or expired".to_string()),
            Err(err) => degraded(&trip.id, ReadinessCheck::Certifications, &err),
        }
    }

    fn admin_approval(&self, trip: &Trip) -> (bool, String) {
        match self.approvals.departure_approved(&trip.id) {
            Ok(true) => (true, "departure approved".to_string()),
            Ok(false) => (false, "departure approval outstanding".to_string()),
            Err(err) => degraded(&trip.id, ReadinessCheck::AdminApproval, &err),
        }
    }
}

fn facility_checklist(trip: &Trip) -> (bool, String) {
    let progress = trip.facility_progress();
    (
        progress.complete(),
        format!(
            "facility checklist {}/{} complete",
            progress.checked, progress.total
        ),
    )
}

fn equipment_checklist(trip: &Trip) -> (bool, String) {
    let progress = trip.equipment_progress();
    (
        progress.complete(),
        format!(
            "equipment checklist {}/{} complete",
            progress.checked, progress.total
        ),
    )
}

/// A collaborator failure fails the sub-check closed rather than aborting the
/// rest of the evaluation.
fn degraded(
    trip: &super::domain::TripId,
    check: ReadinessCheck,
    err: &super::collaborators::CollaboratorError,
) -> (bool, String) {
    warn!(%trip, check = check.label(), error = %err, "readiness sub-check degraded");
    (false, format!("{} could not be verified: {err}", check.label()))
}
