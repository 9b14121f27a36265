use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::authz::{ActorRef, ActorRole};
use super::domain::{
    ChecklistItemRef, ChecklistNamespace, EquipmentItem, FacilityItem, PassengerId,
    PassengerStatus, TripId,
};
use super::repository::{RepositoryError, TripRepository};
use super::risk::{GpsPoint, RiskInputs, WeatherCondition};
use super::service::{TripService, TripServiceError};

/// Router builder exposing the engine's operations over HTTP.
pub fn trip_router<R>(service: Arc<TripService<R>>) -> Router
where
    R: TripRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/trips/:trip_id/readiness",
            get(readiness_handler::<R>),
        )
        .route(
            "/api/v1/trips/:trip_id/completion",
            get(completion_handler::<R>),
        )
        .route(
            "/api/v1/trips/:trip_id/manifest",
            get(manifest_handler::<R>),
        )
        .route(
            "/api/v1/trips/:trip_id/risk-assessments",
            post(risk_assessment_handler::<R>),
        )
        .route("/api/v1/trips/:trip_id/start", post(start_handler::<R>))
        .route("/api/v1/trips/:trip_id/end", post(end_handler::<R>))
        .route(
            "/api/v1/trips/:trip_id/checklist/:namespace/:item",
            put(checklist_handler::<R>),
        )
        .route(
            "/api/v1/trips/:trip_id/assignment",
            put(assignment_handler::<R>),
        )
        .route(
            "/api/v1/trips/:trip_id/passengers/:passenger_id",
            put(passenger_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActorParams {
    pub(crate) actor_id: String,
    #[serde(default)]
    pub(crate) role: Option<ActorRole>,
}

impl ActorParams {
    fn actor(&self) -> ActorRef {
        ActorRef::new(self.actor_id.clone(), self.role)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RiskAssessmentRequest {
    pub(crate) actor_id: String,
    #[serde(default)]
    pub(crate) role: Option<ActorRole>,
    pub(crate) wave_height_m: Option<f32>,
    pub(crate) wind_speed_kmh: Option<f32>,
    pub(crate) weather: Option<WeatherCondition>,
    pub(crate) crew_ready: bool,
    pub(crate) equipment_complete: bool,
    #[serde(default)]
    pub(crate) gps: Option<GpsPoint>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) actor_id: String,
    #[serde(default)]
    pub(crate) role: Option<ActorRole>,
    #[serde(default)]
    pub(crate) confirmed: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChecklistUpdateRequest {
    pub(crate) actor_id: String,
    #[serde(default)]
    pub(crate) role: Option<ActorRole>,
    pub(crate) checked: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentResponseRequest {
    pub(crate) actor_id: String,
    #[serde(default)]
    pub(crate) role: Option<ActorRole>,
    pub(crate) accept: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PassengerStatusRequest {
    pub(crate) actor_id: String,
    #[serde(default)]
    pub(crate) role: Option<ActorRole>,
    pub(crate) status: PassengerStatus,
}

pub(crate) async fn readiness_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path(trip_id): Path<String>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.readiness(&TripId(trip_id)) {
        Ok(status) => (StatusCode::OK, axum::Json(status)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn completion_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path(trip_id): Path<String>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.completion(&TripId(trip_id)) {
        Ok(status) => (StatusCode::OK, axum::Json(status)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn manifest_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path(trip_id): Path<String>,
    Query(params): Query<ActorParams>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.manifest(&TripId(trip_id), &params.actor()) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn risk_assessment_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path(trip_id): Path<String>,
    axum::Json(request): axum::Json<RiskAssessmentRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    let actor = ActorRef::new(request.actor_id.clone(), request.role);
    let inputs = RiskInputs {
        wave_height_m: request.wave_height_m,
        wind_speed_kmh: request.wind_speed_kmh,
        weather: request.weather,
        crew_ready: request.crew_ready,
        equipment_complete: request.equipment_complete,
        gps: request.gps,
    };

    match service.submit_risk_assessment(&TripId(trip_id), &actor, inputs) {
        Ok(score) => (StatusCode::CREATED, axum::Json(score)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path(trip_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    let actor = ActorRef::new(request.actor_id.clone(), request.role);
    match service.start_trip(&TripId(trip_id), &actor) {
        Ok(record) => transition_ok(record.trip.phase.label()),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn end_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path(trip_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    let actor = ActorRef::new(request.actor_id.clone(), request.role);
    match service.end_trip(&TripId(trip_id), &actor, request.confirmed) {
        Ok(record) => transition_ok(record.trip.phase.label()),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn checklist_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path((trip_id, namespace, item)): Path<(String, String, String)>,
    axum::Json(request): axum::Json<ChecklistUpdateRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    let Some(item) = parse_checklist_item(&namespace, &item) else {
        let payload = json!({
            "error": format!("unknown checklist item '{namespace}/{item}'"),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    };

    let actor = ActorRef::new(request.actor_id.clone(), request.role);
    match service.set_checklist_item(&TripId(trip_id), &actor, item, request.checked) {
        Ok(progress) => (StatusCode::OK, axum::Json(progress)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn assignment_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path(trip_id): Path<String>,
    axum::Json(request): axum::Json<AssignmentResponseRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    let actor = ActorRef::new(request.actor_id.clone(), request.role);
    match service.respond_to_assignment(&TripId(trip_id), &actor, request.accept) {
        Ok(record) => {
            let status = record
                .trip
                .crew
                .iter()
                .find(|assignment| assignment.guide_id == actor.id)
                .map(|assignment| assignment.status.label())
                .unwrap_or("unknown");
            let payload = json!({
                "phase": record.trip.phase.label(),
                "assignment_status": status,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn passenger_handler<R>(
    State(service): State<Arc<TripService<R>>>,
    Path((trip_id, passenger_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<PassengerStatusRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    let actor = ActorRef::new(request.actor_id.clone(), request.role);
    match service.record_passenger_status(
        &TripId(trip_id),
        &actor,
        &PassengerId(passenger_id),
        request.status,
    ) {
        Ok(()) => {
            let payload = json!({ "status": request.status.label() });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn parse_checklist_item(namespace: &str, item: &str) -> Option<ChecklistItemRef> {
    match ChecklistNamespace::from_code(namespace)? {
        ChecklistNamespace::Facility => FacilityItem::from_code(item).map(ChecklistItemRef::Facility),
        ChecklistNamespace::Equipment => {
            EquipmentItem::from_code(item).map(ChecklistItemRef::Equipment)
        }
    }
}

fn transition_ok(phase: &str) -> Response {
    let payload = json!({ "ok": true, "phase": phase });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn error_response(err: TripServiceError) -> Response {
    match err {
        TripServiceError::Authorization(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        TripServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "trip not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        TripServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "trip state changed, reload" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        TripServiceError::Repository(RepositoryError::Unavailable(reason)) => {
            let payload = json!({ "error": format!("trip store unavailable: {reason}") });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        TripServiceError::InvalidRiskInputs(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        TripServiceError::Trip(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        TripServiceError::Transition(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        TripServiceError::NotReady(status) => {
            let payload = json!({ "ok": false, "reasons": status.missing });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        TripServiceError::Incomplete(status) => {
            let payload = json!({
                "ok": false,
                "reasons": status.missing_items,
                "warnings": status.warnings,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        TripServiceError::ConfirmationRequired => {
            let payload = json!({
                "ok": false,
                "reasons": ["ending a trip requires explicit confirmation"],
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
    }
}
