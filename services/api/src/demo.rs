use crate::infra::{
    collaborators_from, default_risk_policy, sample_trip, InMemoryOperationsHub,
    InMemoryTripRepository,
};
use chrono::Local;
use clap::Args;
use std::sync::Arc;
use tour_ops::error::AppError;
use tour_ops::workflows::trips::{
    ActorRef, ActorRole, ChecklistItemRef, CompletionStatus, EquipmentItem, FacilityItem,
    HandoverStatus, PassengerId, PassengerStatus, ReadinessStatus, RepositoryError, RiskInputs,
    TripRepository, TripService, TripServiceError, WeatherCondition,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print full gate payloads as JSON
    #[arg(long)]
    pub(crate) verbose: bool,
}

/// Walk one trip through the whole lifecycle, including a blocked storm
/// departure, so stakeholders can watch every gate decide.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryTripRepository::default());
    let hub = Arc::new(InMemoryOperationsHub::default());
    let service = TripService::new(
        repository.clone(),
        collaborators_from(&hub),
        default_risk_policy(),
    );

    let trip = sample_trip("trip-demo-001", Local::now().date_naive());
    let trip_id = trip.id.clone();
    let passenger_ids: Vec<PassengerId> = trip
        .manifest
        .iter()
        .map(|passenger| passenger.id.clone())
        .collect();
    service.create_trip(trip)?;

    let lead = ActorRef::new("guide-lena", Some(ActorRole::Lead));
    let support = ActorRef::new("guide-marco", Some(ActorRole::Support));

    println!("== Crew confirmation ==");
    let record = service.respond_to_assignment(&trip_id, &lead, true)?;
    println!("lead confirmed; phase is now {}", record.trip.phase.label());
    service.respond_to_assignment(&trip_id, &support, true)?;
    println!("support confirmed");

    println!("\n== Departure readiness (before preparation) ==");
    print_readiness(&service.readiness(&trip_id)?, args.verbose);

    println!("\n== Preparation ==");
    hub.set_checked_in(true);
    hub.set_departure_approved(true);
    for item in [FacilityItem::DockGate, FacilityItem::BriefingArea] {
        service.set_checklist_item(&trip_id, &support, ChecklistItemRef::Facility(item), true)?;
    }
    for item in [
        EquipmentItem::LifeJackets,
        EquipmentItem::Radio,
        EquipmentItem::FirstAidKit,
        EquipmentItem::FlareKit,
    ] {
        service.set_checklist_item(&trip_id, &lead, ChecklistItemRef::Equipment(item), true)?;
    }
    println!("crew checked in, departure approved, checklists complete");

    println!("\n== Storm front moves in ==");
    let score = service.submit_risk_assessment(
        &trip_id,
        &lead,
        RiskInputs {
            wave_height_m: Some(2.8),
            wind_speed_kmh: Some(80.0),
            weather: Some(WeatherCondition::Stormy),
            crew_ready: true,
            equipment_complete: true,
            gps: None,
        },
    )?;
    println!(
        "assessment scored {} ({}), blocked: {}",
        score.score,
        score.level.label(),
        score.blocked
    );
    match service.start_trip(&trip_id, &lead) {
        Err(TripServiceError::NotReady(status)) => {
            println!("departure refused:");
            for reason in &status.missing {
                println!("  - {reason}");
            }
        }
        Ok(_) => println!("unexpected: departure allowed in a storm"),
        Err(other) => return Err(other.into()),
    }

    println!("\n== Conditions clear ==");
    let score = service.submit_risk_assessment(
        &trip_id,
        &lead,
        RiskInputs {
            wave_height_m: Some(0.4),
            wind_speed_kmh: Some(12.0),
            weather: Some(WeatherCondition::Clear),
            crew_ready: true,
            equipment_complete: true,
            gps: None,
        },
    )?;
    println!(
        "fresh assessment scored {} ({})",
        score.score,
        score.level.label()
    );
    let record = service.start_trip(&trip_id, &lead)?;
    println!("trip started; phase is now {}", record.trip.phase.label());

    println!("\n== Underway ==");
    for passenger in &passenger_ids {
        service.record_passenger_status(&trip_id, &support, passenger, PassengerStatus::Boarded)?;
    }
    println!("{} passengers boarded", passenger_ids.len());
    for passenger in &passenger_ids {
        service.record_passenger_status(
            &trip_id,
            &support,
            passenger,
            PassengerStatus::Returned,
        )?;
    }
    println!("{} passengers returned", passenger_ids.len());

    println!("\n== Post-trip obligations ==");
    // The surrounding operations system records these outside the engine.
    let mut record = repository
        .fetch(&trip_id)
        .and_then(|record| record.ok_or(RepositoryError::NotFound))
        .map_err(TripServiceError::from)?;
    record.trip.documentation_url =
        Some("https://docs.example.com/trips/trip-demo-001/report.pdf".to_string());
    repository.update(record).map_err(TripServiceError::from)?;
    hub.set_checked_out(true);
    hub.set_handover(HandoverStatus::Completed);
    hub.complete_required_tasks();
    println!("documentation uploaded, crew checked out, handover done, tasks closed");

    println!("\n== Completion gate ==");
    let completion = service.completion(&trip_id)?;
    print_completion(&completion, args.verbose);

    match service.end_trip(&trip_id, &lead, false) {
        Err(TripServiceError::ConfirmationRequired) => {
            println!("end without confirmation refused, asking the lead to confirm");
        }
        Ok(_) => println!("unexpected: trip ended without confirmation"),
        Err(other) => return Err(other.into()),
    }
    let record = service.end_trip(&trip_id, &lead, true)?;
    println!("trip ended; phase is now {}", record.trip.phase.label());

    Ok(())
}

fn print_readiness(status: &ReadinessStatus, verbose: bool) {
    println!("can_start: {}", status.can_start);
    for reason in &status.missing {
        println!("  - {reason}");
    }
    if verbose {
        println!(
            "{}",
            serde_json::to_string_pretty(status).unwrap_or_default()
        );
    }
}

fn print_completion(status: &CompletionStatus, verbose: bool) {
    println!(
        "can_complete: {} (progress {}%)",
        status.can_complete, status.progress
    );
    for item in &status.missing_items {
        println!("  missing: {item}");
    }
    for warning in &status.warnings {
        println!("  warning: {warning}");
    }
    if verbose {
        println!(
            "{}",
            serde_json::to_string_pretty(status).unwrap_or_default()
        );
    }
}
