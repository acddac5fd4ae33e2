//! Fine and fine rule routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use uuid::Uuid;
use warden_core::fines::{CreateFineRuleInput, FineFilter, IssueFineInput, UpdateFineRuleInput};

use super::ledger::ReasonRequest;
use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the fine routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fines", get(list_fines).post(issue_fine))
        .route("/fines/reconcile", post(reconcile_fines))
        .route("/fines/{fine_id}/void", post(void_fine))
        .route("/fine-rules", get(list_fine_rules).post(create_fine_rule))
        .route(
            "/fine-rules/{rule_id}",
            patch(update_fine_rule).delete(deactivate_fine_rule),
        )
}

/// Query parameters for listing fines.
#[derive(Debug, Default, Deserialize)]
pub struct ListFinesQuery {
    /// Only this occupant's fines.
    pub occupant_id: Option<Uuid>,
    /// Only fines of this term.
    pub term_id: Option<Uuid>,
    /// Include voided fines.
    #[serde(default)]
    pub include_voided: bool,
    /// Only fines awaiting reconciliation.
    #[serde(default)]
    pub needs_reconciliation: bool,
}

/// Body for a reconciliation run.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileRequest {
    /// Check every active fine, not only flagged ones.
    #[serde(default)]
    pub all: bool,
}

/// Query parameters for listing rules.
#[derive(Debug, Default, Deserialize)]
pub struct ListRulesQuery {
    /// Include deactivated rules.
    #[serde(default)]
    pub include_inactive: bool,
}

async fn issue_fine(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(input): Json<IssueFineInput>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.engine.issue_fine(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn list_fines(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<ListFinesQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = FineFilter {
        occupant_id: query.occupant_id.map(Into::into),
        term_id: query.term_id.map(Into::into),
        include_voided: query.include_voided,
        needs_reconciliation: query.needs_reconciliation,
    };
    let fines = state.engine.list_fines(&actor, &filter).await?;
    Ok(Json(fines))
}

async fn void_fine(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(fine_id): Path<Uuid>,
    Json(req): Json<ReasonRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .engine
        .void_fine(&actor, fine_id.into(), &req.reason)
        .await?;
    Ok(Json(outcome))
}

/// Repairs fines whose ledger charge drifted from the fine.
async fn reconcile_fines(
    State(state): State<AppState>,
    Actor(actor): Actor,
    body: Option<Json<ReconcileRequest>>,
) -> ApiResult<impl IntoResponse> {
    let all = body.is_some_and(|Json(req)| req.all);
    let report = state.engine.reconcile_fines(&actor, all).await?;
    Ok(Json(report))
}

async fn list_fine_rules(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<ListRulesQuery>,
) -> ApiResult<impl IntoResponse> {
    let rules = state
        .engine
        .list_fine_rules(&actor, query.include_inactive)
        .await?;
    Ok(Json(rules))
}

async fn create_fine_rule(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(input): Json<CreateFineRuleInput>,
) -> ApiResult<impl IntoResponse> {
    let rule = state.engine.create_fine_rule(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

async fn update_fine_rule(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(rule_id): Path<Uuid>,
    Json(input): Json<UpdateFineRuleInput>,
) -> ApiResult<impl IntoResponse> {
    let rule = state
        .engine
        .update_fine_rule(&actor, rule_id.into(), input)
        .await?;
    Ok(Json(rule))
}

/// Rules are never deleted; existing fines keep pointing at them.
async fn deactivate_fine_rule(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(rule_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let rule = state
        .engine
        .deactivate_fine_rule(&actor, rule_id.into())
        .await?;
    Ok(Json(rule))
}
