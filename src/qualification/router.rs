use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::staffing::{check_staffing, RequirementMap, StaffingError, StationSlot};

use super::domain::{ControllerRef, MultiAirportQualification, Qualification};
use super::position::StationGroup;
use super::provider::TrainingRecordProvider;
use super::service::{QualificationError, QualificationService, SignupSnapshot};

/// Router builder exposing the engine's call contracts and the cache
/// invalidation hooks. JSON shaping happens here; the rule modules stay
/// wire-format free.
pub fn qualification_router<P>(service: Arc<QualificationService<P>>) -> Router
where
    P: TrainingRecordProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/qualifications/evaluate",
            post(evaluate_handler::<P>),
        )
        .route(
            "/api/v1/qualifications/evaluate-multi",
            post(evaluate_multi_handler::<P>),
        )
        .route(
            "/api/v1/qualifications/assignments/validate",
            post(validate_assignment_handler::<P>),
        )
        .route("/api/v1/staffing/check", post(staffing_check_handler))
        .route(
            "/api/v1/occurrences/:occurrence/signups",
            post(signup_snapshot_handler::<P>),
        )
        .route(
            "/api/v1/occurrences/:occurrence/signups/invalidate",
            post(invalidate_handler::<P>),
        )
        .route(
            "/api/v1/occurrences/:occurrence/signups/last-update",
            get(last_update_handler::<P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct SingleEventScope {
    airport: String,
    #[serde(default)]
    fir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MultiEventScope {
    airports: Vec<String>,
    #[serde(default)]
    fir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    controller: ControllerRef,
    event: SingleEventScope,
}

#[derive(Debug, Deserialize)]
struct EvaluateMultiRequest {
    controller: ControllerRef,
    event: MultiEventScope,
}

#[derive(Debug, Deserialize)]
struct AssignmentRequest {
    controller: ControllerRef,
    station: StationSlot,
    event: SingleEventScope,
}

#[derive(Debug, Deserialize)]
struct StaffingCheckRequest {
    requirements: RequirementMap,
    booked_callsigns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SignupSnapshotRequest {
    roster: Vec<ControllerRef>,
    event: MultiEventScope,
}

#[derive(Debug, Serialize)]
struct QualificationView {
    group: Option<&'static str>,
    restrictions: Vec<String>,
    endorsements: Vec<String>,
    familiarizations: Vec<String>,
}

impl From<Qualification> for QualificationView {
    fn from(qualification: Qualification) -> Self {
        Self {
            group: qualification.group.map(StationGroup::label),
            restrictions: qualification.restriction_summaries(),
            endorsements: qualification.evidence.endorsements,
            familiarizations: qualification.evidence.familiarizations,
        }
    }
}

#[derive(Debug, Serialize)]
struct AirportQualificationView {
    airport: String,
    can_control: bool,
    group: Option<&'static str>,
    restrictions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MultiQualificationView {
    airports: Vec<AirportQualificationView>,
    highest_group: Option<&'static str>,
    endorsements: Vec<String>,
    familiarizations: Vec<String>,
}

impl From<MultiAirportQualification> for MultiQualificationView {
    fn from(result: MultiAirportQualification) -> Self {
        Self {
            airports: result
                .airports
                .into_iter()
                .map(|airport| AirportQualificationView {
                    airport: airport.airport,
                    can_control: airport.can_control,
                    group: airport.group.map(StationGroup::label),
                    restrictions: airport
                        .restrictions
                        .iter()
                        .map(|restriction| restriction.summary())
                        .collect(),
                })
                .collect(),
            highest_group: result.highest_group.map(StationGroup::label),
            endorsements: result.evidence.endorsements,
            familiarizations: result.evidence.familiarizations,
        }
    }
}

#[derive(Debug, Serialize)]
struct SignupEntryView {
    controller: String,
    rating: &'static str,
    qualification: MultiQualificationView,
}

#[derive(Debug, Serialize)]
struct SignupSnapshotView {
    occurrence: String,
    computed_at: DateTime<Utc>,
    entries: Vec<SignupEntryView>,
}

impl From<SignupSnapshot> for SignupSnapshotView {
    fn from(snapshot: SignupSnapshot) -> Self {
        Self {
            occurrence: snapshot.occurrence,
            computed_at: snapshot.computed_at,
            entries: snapshot
                .entries
                .into_iter()
                .map(|entry| SignupEntryView {
                    controller: entry.controller.0,
                    rating: entry.rating.label(),
                    qualification: entry.qualification.into(),
                })
                .collect(),
        }
    }
}

async fn evaluate_handler<P>(
    State(service): State<Arc<QualificationService<P>>>,
    Json(request): Json<EvaluateRequest>,
) -> Response
where
    P: TrainingRecordProvider + 'static,
{
    match service
        .evaluate(
            &request.controller,
            &request.event.airport,
            request.event.fir.as_deref(),
        )
        .await
    {
        Ok(qualification) => {
            (StatusCode::OK, Json(QualificationView::from(qualification))).into_response()
        }
        Err(error) => upstream_failure(error),
    }
}

async fn evaluate_multi_handler<P>(
    State(service): State<Arc<QualificationService<P>>>,
    Json(request): Json<EvaluateMultiRequest>,
) -> Response
where
    P: TrainingRecordProvider + 'static,
{
    match service
        .evaluate_multi(
            &request.controller,
            &request.event.airports,
            request.event.fir.as_deref(),
        )
        .await
    {
        Ok(result) => (StatusCode::OK, Json(MultiQualificationView::from(result))).into_response(),
        Err(error) => upstream_failure(error),
    }
}

async fn validate_assignment_handler<P>(
    State(service): State<Arc<QualificationService<P>>>,
    Json(request): Json<AssignmentRequest>,
) -> Response
where
    P: TrainingRecordProvider + 'static,
{
    match service
        .validate_assignment(
            &request.controller,
            &request.station,
            &request.event.airport,
            request.event.fir.as_deref(),
        )
        .await
    {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(error) => upstream_failure(error),
    }
}

async fn staffing_check_handler(Json(request): Json<StaffingCheckRequest>) -> Response {
    match check_staffing(&request.requirements, &request.booked_callsigns) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error @ StaffingError::InvalidPattern { .. }) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}

async fn signup_snapshot_handler<P>(
    State(service): State<Arc<QualificationService<P>>>,
    Path(occurrence): Path<String>,
    Json(request): Json<SignupSnapshotRequest>,
) -> Response
where
    P: TrainingRecordProvider + 'static,
{
    match service
        .signup_snapshot(
            &occurrence,
            &request.roster,
            &request.event.airports,
            request.event.fir.as_deref(),
        )
        .await
    {
        Ok(snapshot) => {
            (StatusCode::OK, Json(SignupSnapshotView::from(snapshot))).into_response()
        }
        Err(error) => upstream_failure(error),
    }
}

async fn invalidate_handler<P>(
    State(service): State<Arc<QualificationService<P>>>,
    Path(occurrence): Path<String>,
) -> Response
where
    P: TrainingRecordProvider + 'static,
{
    let stamp = service.invalidate_signups(&occurrence);
    let payload = json!({ "occurrence": occurrence, "last_update": stamp });
    (StatusCode::OK, Json(payload)).into_response()
}

async fn last_update_handler<P>(
    State(service): State<Arc<QualificationService<P>>>,
    Path(occurrence): Path<String>,
) -> Response
where
    P: TrainingRecordProvider + 'static,
{
    let payload = json!({
        "occurrence": occurrence,
        "last_update": service.last_update(&occurrence),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

/// Upstream data errors are hard failures; the portal must never read a
/// missing answer as "authorized".
fn upstream_failure(error: QualificationError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
}
