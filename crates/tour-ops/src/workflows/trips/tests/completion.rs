use std::sync::Arc;

use super::common::{ready_trip, ScriptedOps, UnreachableOps};
use crate::workflows::trips::collaborators::{HandoverStatus, TripTask};
use crate::workflows::trips::completion::{
    CheckDisposition, CompletionCheck, CompletionEvaluator,
};
use crate::workflows::trips::domain::{PassengerStatus, Trip};

fn evaluator(ops: &Arc<ScriptedOps>) -> CompletionEvaluator {
    CompletionEvaluator::new(ops.clone(), ops.clone(), ops.clone(), ops.clone())
}

/// A trip whose post-trip obligations are all satisfied locally.
fn finished_trip(id: &str) -> Trip {
    let mut trip = ready_trip(id);
    trip.phase = crate::workflows::trips::phase::TripPhase::DuringTrip;
    for passenger in &mut trip.manifest {
        passenger.status = PassengerStatus::Returned;
    }
    trip.documentation_url = Some("https://docs.example.com/trips/trip-1".to_string());
    trip
}

#[test]
fn can_complete_when_every_required_check_passes() {
    let ops = ScriptedOps::all_good();
    let evaluator = evaluator(&ops);

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(status.can_complete);
    assert!(status.missing_items.is_empty());
    assert!(status.warnings.is_empty());
    assert_eq!(status.progress, 100);
}

#[test]
fn partial_manifest_blocks_completion() {
    let ops = ScriptedOps::all_good();
    let evaluator = evaluator(&ops);

    let mut trip = finished_trip("trip-1");
    trip.manifest.push(super::common::passenger("pax-3", "Mette Friis"));
    trip.manifest
        .iter_mut()
        .last()
        .expect("manifest not empty")
        .status = PassengerStatus::Boarded;

    let status = evaluator.evaluate(&trip);
    assert!(!status.can_complete);
    assert_eq!(status.missing_items.len(), 1);
    assert_eq!(status.missing_items[0], "2 of 3 passengers returned");
}

#[test]
fn soft_checks_warn_but_never_block() {
    let ops = ScriptedOps::all_good();
    ops.set_expenses_submitted(false);
    ops.set_payment_split_calculated(false);
    let evaluator = evaluator(&ops);

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(status.can_complete);
    assert_eq!(
        status.warnings,
        vec![
            "expenses not yet submitted".to_string(),
            "payment split not yet calculated".to_string(),
        ]
    );
    assert!(status.missing_items.is_empty());
}

#[test]
fn toggling_a_soft_check_never_changes_can_complete() {
    let ops = ScriptedOps::all_good();
    let evaluator = evaluator(&ops);
    let trip = finished_trip("trip-1");

    let before = evaluator.evaluate(&trip);
    ops.set_expenses_submitted(false);
    let after = evaluator.evaluate(&trip);

    assert_eq!(before.can_complete, after.can_complete);
    assert_eq!(before.progress, after.progress);
}

#[test]
fn not_applicable_checks_leave_the_progress_denominator() {
    let ops = ScriptedOps::all_good();
    let evaluator = evaluator(&ops);

    let mut trip = finished_trip("trip-1");
    trip.logistics_tracked = false;
    trip.documentation_url = None;

    let status = evaluator.evaluate(&trip);
    let handover = status
        .checks
        .iter()
        .find(|outcome| outcome.check == CompletionCheck::LogisticsHandover)
        .expect("handover outcome present");
    assert_eq!(handover.disposition, CheckDisposition::NotApplicable);

    // Four applicable checks, three satisfied: 75%, not 60%.
    assert_eq!(status.progress, 75);
    assert!(!status.can_complete);
}

#[test]
fn untracked_passenger_manifest_is_not_applicable() {
    let ops = ScriptedOps::all_good();
    let evaluator = evaluator(&ops);

    let mut trip = finished_trip("trip-1");
    trip.passenger_tracking = false;
    for passenger in &mut trip.manifest {
        passenger.status = PassengerStatus::Pending;
    }

    let status = evaluator.evaluate(&trip);
    assert!(status.can_complete);
    let manifest = &status.checks[0];
    assert_eq!(manifest.disposition, CheckDisposition::NotApplicable);
}

#[test]
fn optional_tasks_never_block() {
    let ops = ScriptedOps::all_good();
    ops.set_tasks(vec![
        TripTask {
            code: "gear-washdown".to_string(),
            name: "Gear wash-down".to_string(),
            required: true,
            completed: true,
        },
        TripTask {
            code: "guest-survey".to_string(),
            name: "Send guest survey".to_string(),
            required: false,
            completed: false,
        },
    ]);
    let evaluator = evaluator(&ops);

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(status.can_complete);
}

#[test]
fn open_required_tasks_block_with_their_names() {
    let ops = ScriptedOps::all_good();
    ops.set_tasks(vec![TripTask {
        code: "gear-washdown".to_string(),
        name: "Gear wash-down".to_string(),
        required: true,
        completed: false,
    }]);
    let evaluator = evaluator(&ops);

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(!status.can_complete);
    assert_eq!(
        status.missing_items,
        vec!["required tasks open: Gear wash-down".to_string()]
    );
}

#[test]
fn missing_checkout_blocks_completion() {
    let ops = ScriptedOps::all_good();
    ops.set_checked_out(false);
    let evaluator = evaluator(&ops);

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(!status.can_complete);
    assert_eq!(
        status.missing_items,
        vec!["crew not checked out".to_string()]
    );
}

#[test]
fn pending_handover_blocks_when_logistics_is_tracked() {
    let ops = ScriptedOps::all_good();
    ops.set_handover(HandoverStatus::Pending);
    let evaluator = evaluator(&ops);

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(!status.can_complete);
    assert_eq!(
        status.missing_items,
        vec!["inbound logistics handover outstanding".to_string()]
    );
}

#[test]
fn unavailable_handover_degrades_to_not_applicable() {
    let ops = ScriptedOps::all_good();
    let evaluator = CompletionEvaluator::new(
        ops.clone(),
        Arc::new(UnreachableOps),
        ops.clone(),
        ops.clone(),
    );

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(status.can_complete);
    let handover = status
        .checks
        .iter()
        .find(|outcome| outcome.check == CompletionCheck::LogisticsHandover)
        .expect("handover outcome present");
    assert_eq!(handover.disposition, CheckDisposition::NotApplicable);
}

#[test]
fn unavailable_task_board_fails_closed() {
    let ops = ScriptedOps::all_good();
    let evaluator = CompletionEvaluator::new(
        ops.clone(),
        ops.clone(),
        Arc::new(UnreachableOps),
        ops.clone(),
    );

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(!status.can_complete);
    assert!(status.missing_items[0].contains("could not be verified"));
}

#[test]
fn unavailable_expense_ledger_only_warns() {
    let ops = ScriptedOps::all_good();
    let evaluator = CompletionEvaluator::new(
        ops.clone(),
        ops.clone(),
        ops.clone(),
        Arc::new(UnreachableOps),
    );

    let status = evaluator.evaluate(&finished_trip("trip-1"));
    assert!(status.can_complete);
    assert_eq!(status.warnings.len(), 2);
}
