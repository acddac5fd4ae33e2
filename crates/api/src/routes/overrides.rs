//! Admin override routes.
//!
//! Nullable fields travel as a value plus a `clear_*` flag, so "leave as is"
//! (both absent) and "set to null" (flag set) stay distinguishable on the
//! wire. Every body carries the mandatory `reason`.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use warden_core::occupants::OccupantStatus;
use warden_core::overrides::{
    CleaningAssignmentOverride, CleaningRestLevelOverride, EntryOwnerOverride,
    EvaluationScoreOverride, EventDeadlineOverride, EventOverride, FieldPatch, FineOverride,
    OccupantOverride, RestoreEntryInput,
};

use super::ledger::ReasonRequest;
use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the override routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/overrides/occupants/{occupant_id}", post(override_occupant))
        .route("/overrides/fines/{fine_id}", post(override_fine))
        .route(
            "/overrides/ledger-entries/{entry_id}/owner",
            post(override_entry_owner),
        )
        .route(
            "/overrides/ledger-entries/{entry_id}/restore",
            post(restore_entry),
        )
        .route("/overrides/events/{event_id}", post(override_event))
        .route(
            "/overrides/events/{event_id}/deadline",
            post(override_event_deadline),
        )
        .route(
            "/overrides/cleaning-assignments/{assignment_id}",
            post(override_cleaning_assignment),
        )
        .route(
            "/overrides/cleaning-weeks/{week_id}/rest-level",
            post(override_rest_level),
        )
        .route(
            "/overrides/evaluation-scores/{score_id}",
            post(override_evaluation_score),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for an occupant override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OccupantOverrideRequest {
    /// New display name.
    pub display_name: Option<String>,
    /// New student number.
    pub student_id: Option<String>,
    /// Clear the student number.
    pub clear_student_id: bool,
    /// New email.
    pub email: Option<String>,
    /// Clear the email.
    pub clear_email: bool,
    /// New residency status.
    pub status: Option<OccupantStatus>,
    /// Why the override is made.
    pub reason: String,
}

/// Body for a fine override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FineOverrideRequest {
    /// New peso amount.
    pub pesos: Option<Decimal>,
    /// New demerit points.
    pub points: Option<i32>,
    /// New note.
    pub note: Option<String>,
    /// Clear the note.
    pub clear_note: bool,
    /// New rule.
    pub rule_id: Option<Uuid>,
    /// Detach the rule.
    pub clear_rule_id: bool,
    /// Reactivate the fine if voided.
    pub restore_if_voided: bool,
    /// Why the override is made.
    pub reason: String,
}

/// Body for moving an entry to another occupant.
#[derive(Debug, Deserialize)]
pub struct EntryOwnerRequest {
    /// New owner.
    pub occupant_id: Uuid,
    /// Why the override is made.
    #[serde(default)]
    pub reason: String,
}

/// Body for an event override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventOverrideRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Clear the description.
    pub clear_description: bool,
    /// New start time.
    pub starts_at: Option<DateTime<Utc>>,
    /// New venue.
    pub location: Option<String>,
    /// Clear the venue.
    pub clear_location: bool,
    /// Why the override is made.
    pub reason: String,
}

/// Body for an event deadline override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventDeadlineRequest {
    /// New payable deadline.
    pub deadline: Option<NaiveDate>,
    /// Remove the deadline.
    pub clear_deadline: bool,
    /// Why the override is made.
    pub reason: String,
}

/// Body for a cleaning assignment override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CleaningAssignmentRequest {
    /// New assignee.
    pub occupant_id: Option<Uuid>,
    /// New area.
    pub area: Option<String>,
    /// Why the override is made.
    pub reason: String,
}

/// Body for a rest level override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RestLevelRequest {
    /// New rest level.
    pub rest_level: Option<i32>,
    /// No floor rests this week.
    pub clear_rest_level: bool,
    /// Why the override is made.
    pub reason: String,
}

/// Body for an evaluation score override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EvaluationScoreRequest {
    /// New score.
    pub score: Option<Decimal>,
    /// New comment.
    pub comment: Option<String>,
    /// Clear the comment.
    pub clear_comment: bool,
    /// Why the override is made.
    pub reason: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn override_occupant(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(occupant_id): Path<Uuid>,
    Json(req): Json<OccupantOverrideRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = OccupantOverride {
        occupant_id: occupant_id.into(),
        display_name: req.display_name,
        student_id: FieldPatch::from_parts(req.student_id, req.clear_student_id, "student_id")?,
        email: FieldPatch::from_parts(req.email, req.clear_email, "email")?,
        status: req.status,
        reason: req.reason,
    };
    Ok(Json(state.engine.override_occupant(&actor, input).await?))
}

async fn override_fine(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(fine_id): Path<Uuid>,
    Json(req): Json<FineOverrideRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = FineOverride {
        fine_id: fine_id.into(),
        pesos: req.pesos,
        points: req.points,
        note: FieldPatch::from_parts(req.note, req.clear_note, "note")?,
        rule_id: FieldPatch::from_parts(req.rule_id.map(Into::into), req.clear_rule_id, "rule_id")?,
        restore_if_voided: req.restore_if_voided,
        reason: req.reason,
    };
    Ok(Json(state.engine.override_fine(&actor, input).await?))
}

async fn override_entry_owner(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<EntryOwnerRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = EntryOwnerOverride {
        entry_id: entry_id.into(),
        occupant_id: req.occupant_id.into(),
        reason: req.reason,
    };
    Ok(Json(state.engine.override_ledger_entry_owner(&actor, input).await?))
}

async fn restore_entry(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<ReasonRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = RestoreEntryInput {
        entry_id: entry_id.into(),
        reason: req.reason,
    };
    Ok(Json(state.engine.restore_ledger_entry(&actor, input).await?))
}

async fn override_event(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(event_id): Path<Uuid>,
    Json(req): Json<EventOverrideRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = EventOverride {
        event_id: event_id.into(),
        title: req.title,
        description: FieldPatch::from_parts(req.description, req.clear_description, "description")?,
        starts_at: req.starts_at,
        location: FieldPatch::from_parts(req.location, req.clear_location, "location")?,
        reason: req.reason,
    };
    Ok(Json(state.engine.override_event(&actor, input).await?))
}

async fn override_event_deadline(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(event_id): Path<Uuid>,
    Json(req): Json<EventDeadlineRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = EventDeadlineOverride {
        event_id: event_id.into(),
        deadline: FieldPatch::from_parts(req.deadline, req.clear_deadline, "deadline")?,
        reason: req.reason,
    };
    Ok(Json(state.engine.override_event_deadline(&actor, input).await?))
}

async fn override_cleaning_assignment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(assignment_id): Path<Uuid>,
    Json(req): Json<CleaningAssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CleaningAssignmentOverride {
        assignment_id: assignment_id.into(),
        occupant_id: req.occupant_id.map(Into::into),
        area: req.area,
        reason: req.reason,
    };
    Ok(Json(state.engine.override_cleaning_assignment(&actor, input).await?))
}

async fn override_rest_level(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(week_id): Path<Uuid>,
    Json(req): Json<RestLevelRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CleaningRestLevelOverride {
        week_id: week_id.into(),
        rest_level: FieldPatch::from_parts(req.rest_level, req.clear_rest_level, "rest_level")?,
        reason: req.reason,
    };
    Ok(Json(state.engine.override_cleaning_rest_level(&actor, input).await?))
}

async fn override_evaluation_score(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(score_id): Path<Uuid>,
    Json(req): Json<EvaluationScoreRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = EvaluationScoreOverride {
        score_id: score_id.into(),
        score: req.score,
        comment: FieldPatch::from_parts(req.comment, req.clear_comment, "comment")?,
        reason: req.reason,
    };
    Ok(Json(state.engine.override_evaluation_score(&actor, input).await?))
}
