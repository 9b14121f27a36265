use super::common::passenger;
use crate::workflows::trips::authz::{allows, passenger_view, ActorRole, CrewAction};

#[test]
fn only_leads_trigger_phase_transitions() {
    for action in [CrewAction::TriggerStart, CrewAction::TriggerEnd] {
        assert!(allows(action, Some(ActorRole::Lead)));
        assert!(!allows(action, Some(ActorRole::Support)));
        assert!(!allows(action, Some(ActorRole::OpsAdmin)));
        assert!(!allows(action, None));
    }
}

#[test]
fn leads_and_support_edit_operational_data() {
    for action in [
        CrewAction::EditChecklistItem,
        CrewAction::RecordPassengerStatus,
        CrewAction::SubmitRiskAssessment,
        CrewAction::ConfirmOwnAssignment,
    ] {
        assert!(allows(action, Some(ActorRole::Lead)));
        assert!(allows(action, Some(ActorRole::Support)));
        assert!(!allows(action, None));
    }
}

#[test]
fn only_ops_admin_manages_crew() {
    assert!(allows(CrewAction::ManageCrew, Some(ActorRole::OpsAdmin)));
    assert!(!allows(CrewAction::ManageCrew, Some(ActorRole::Lead)));
    assert!(!allows(CrewAction::ManageCrew, Some(ActorRole::Support)));
    assert!(!allows(CrewAction::ManageCrew, None));
}

#[test]
fn passenger_data_is_masked_below_the_visibility_tier() {
    let pax = passenger("pax-1", "Astrid Holm");

    let unmasked = passenger_view(&pax, Some(ActorRole::Lead));
    assert!(!unmasked.masked);
    assert_eq!(unmasked.full_name, "Astrid Holm");
    assert!(unmasked.phone.is_some());
    assert!(unmasked.notes.is_some());

    let admin = passenger_view(&pax, Some(ActorRole::OpsAdmin));
    assert!(!admin.masked);

    let masked = passenger_view(&pax, Some(ActorRole::Support));
    assert!(masked.masked);
    assert_eq!(masked.full_name, "A***");
    assert!(masked.phone.is_none());
    assert!(masked.notes.is_none());

    let none = passenger_view(&pax, None);
    assert!(none.masked);
}

#[test]
fn masking_preserves_operational_status() {
    let mut pax = passenger("pax-1", "Astrid Holm");
    pax.status = crate::workflows::trips::domain::PassengerStatus::Boarded;

    let masked = passenger_view(&pax, Some(ActorRole::Support));
    assert_eq!(masked.status_label, "boarded");
}
