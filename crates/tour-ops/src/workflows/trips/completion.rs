//! The completion gate.
//!
//! Required sub-checks block; soft sub-checks (expenses, payment split) only
//! ever surface as warnings. A sub-check that does not apply to the trip is
//! excluded from the progress denominator instead of counting as failing,
//! and an unavailable handover subsystem degrades to not-applicable so a
//! missing collaborator cannot permanently block completion.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::collaborators::{AttendanceLog, ExpenseLedger, HandoverLog, HandoverStatus, TaskBoard};
use super::domain::Trip;

/// The required completion sub-checks, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCheck {
    ManifestReturned,
    Documentation,
    LogisticsHandover,
    AttendanceCheckout,
    RequiredTasks,
}

impl CompletionCheck {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::ManifestReturned,
            Self::Documentation,
            Self::LogisticsHandover,
            Self::AttendanceCheckout,
            Self::RequiredTasks,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ManifestReturned => "manifest returned",
            Self::Documentation => "trip documentation",
            Self::LogisticsHandover => "logistics handover",
            Self::AttendanceCheckout => "crew checkout",
            Self::RequiredTasks => "required tasks",
        }
    }
}

/// Not-applicable is a first-class outcome, not an error: such checks leave
/// both sides of the progress ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckDisposition {
    Satisfied,
    Missing,
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionCheckOutcome {
    pub check: CompletionCheck,
    pub disposition: CheckDisposition,
    pub detail: String,
}

/// Computed snapshot, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionStatus {
    pub can_complete: bool,
    /// Completed applicable required checks over all applicable required
    /// checks, as a percentage.
    pub progress: u8,
    pub checks: Vec<CompletionCheckOutcome>,
    pub missing_items: Vec<String>,
    pub warnings: Vec<String>,
}

pub struct CompletionEvaluator {
    attendance: Arc<dyn AttendanceLog>,
    handover: Arc<dyn HandoverLog>,
    tasks: Arc<dyn TaskBoard>,
    expenses: Arc<dyn ExpenseLedger>,
}

impl CompletionEvaluator {
    pub fn new(
        attendance: Arc<dyn AttendanceLog>,
        handover: Arc<dyn HandoverLog>,
        tasks: Arc<dyn TaskBoard>,
        expenses: Arc<dyn ExpenseLedger>,
    ) -> Self {
        Self {
            attendance,
            handover,
            tasks,
            expenses,
        }
    }

    pub fn evaluate(&self, trip: &Trip) -> CompletionStatus {
        let mut checks = Vec::with_capacity(5);

        for check in CompletionCheck::ordered() {
            let (disposition, detail) = match check {
                CompletionCheck::ManifestReturned => manifest_returned(trip),
                CompletionCheck::Documentation => documentation(trip),
                CompletionCheck::LogisticsHandover => self.logistics_handover(trip),
                CompletionCheck::AttendanceCheckout => self.attendance_checkout(trip),
                CompletionCheck::RequiredTasks => self.required_tasks(trip),
            };
            checks.push(CompletionCheckOutcome {
                check,
                disposition,
                detail,
            });
        }

        let missing_items: Vec<String> = checks
            .iter()
            .filter(|outcome| outcome.disposition == CheckDisposition::Missing)
            .map(|outcome| outcome.detail.clone())
            .collect();

        let applicable = checks
            .iter()
            .filter(|outcome| outcome.disposition != CheckDisposition::NotApplicable)
            .count();
        let satisfied = checks
            .iter()
            .filter(|outcome| outcome.disposition == CheckDisposition::Satisfied)
            .count();
        let progress = if applicable == 0 {
            100
        } else {
            ((satisfied * 100) / applicable) as u8
        };

        CompletionStatus {
            can_complete: missing_items.is_empty(),
            progress,
            checks,
            missing_items,
            warnings: self.soft_warnings(trip),
        }
    }

    fn logistics_handover(&self, trip: &Trip) -> (CheckDisposition, String) {
        if !trip.logistics_tracked {
            return (
                CheckDisposition::NotApplicable,
                "logistics tracking not enabled for this trip".to_string(),
            );
        }

        match self.handover.inbound_handover(&trip.id) {
            Ok(HandoverStatus::Completed) => (
                CheckDisposition::Satisfied,
                "inbound logistics handover completed".to_string(),
            ),
            Ok(HandoverStatus::Pending) => (
                CheckDisposition::Missing,
                "inbound logistics handover outstanding".to_string(),
            ),
            Ok(HandoverStatus::NotTracked) => (
                CheckDisposition::NotApplicable,
                "no logistics handover recorded for this trip".to_string(),
            ),
            Err(err) => {
                warn!(trip = %trip.id, error = %err, "handover lookup degraded to not-applicable");
                (
                    CheckDisposition::NotApplicable,
                    format!("logistics handover unavailable: {err}"),
                )
            }
        }
    }

    fn attendance_checkout(&self, trip: &Trip) -> (CheckDisposition, String) {
        match self.attendance.crew_checked_out(&trip.id) {
            Ok(true) => (
                CheckDisposition::Satisfied,
                "crew checked out".to_string(),
            ),
            Ok(false) => (
                CheckDisposition::Missing,
                "crew not checked out".to_string(),
            ),
            Err(err) => {
                warn!(trip = %trip.id, error = %err, "checkout sub-check degraded");
                (
                    CheckDisposition::Missing,
                    format!("crew checkout could not be verified: {err}"),
                )
            }
        }
    }

    fn required_tasks(&self, trip: &Trip) -> (CheckDisposition, String) {
        match self.tasks.tasks_for(&trip.id) {
            Ok(tasks) => {
                let open: Vec<&str> = tasks
                    .iter()
                    .filter(|task| task.required && !task.completed)
                    .map(|task| task.name.as_str())
                    .collect();
                if open.is_empty() {
                    (
                        CheckDisposition::Satisfied,
                        "all required tasks completed".to_string(),
                    )
                } else {
                    (
                        CheckDisposition::Missing,
                        format!("required tasks open: {}", open.join(", ")),
                    )
                }
            }
            Err(err) => {
                warn!(trip = %trip.id, error = %err, "task sub-check degraded");
                (
                    CheckDisposition::Missing,
                    format!("required tasks could not be verified: {err}"),
                )
            }
        }
    }

    fn soft_warnings(&self, trip: &Trip) -> Vec<String> {
        let mut warnings = Vec::new();

        match self.expenses.expenses_submitted(&trip.id) {
            Ok(true) => {}
            Ok(false) => warnings.push("expenses not yet submitted".to_string()),
            Err(err) => warnings.push(format!("expense status unavailable: {err}")),
        }

        match self.expenses.payment_split_calculated(&trip.id) {
            Ok(true) => {}
            Ok(false) => warnings.push("payment split not yet calculated".to_string()),
            Err(err) => warnings.push(format!("payment split status unavailable: {err}")),
        }

        warnings
    }
}

fn manifest_returned(trip: &Trip) -> (CheckDisposition, String) {
    if !trip.passenger_tracking {
        return (
            CheckDisposition::NotApplicable,
            "passenger tracking not enabled for this trip".to_string(),
        );
    }

    let total = trip.manifest.len();
    let returned = trip.returned_count();
    if returned == total {
        (
            CheckDisposition::Satisfied,
            format!("all {total} passengers returned"),
        )
    } else {
        (
            CheckDisposition::Missing,
            format!("{returned} of {total} passengers returned"),
        )
    }
}

fn documentation(trip: &Trip) -> (CheckDisposition, String) {
    match &trip.documentation_url {
        Some(url) => (
            CheckDisposition::Satisfied,
            format!("documentation uploaded ({url})"),
        ),
        None => (
            CheckDisposition::Missing,
            "trip documentation not uploaded".to_string(),
        ),
    }
}
