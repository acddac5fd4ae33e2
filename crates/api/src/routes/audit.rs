//! Audit trail routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use warden_core::audit::AuditFilter;

use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit", get(list_audit_events))
}

async fn list_audit_events(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(filter): Query<AuditFilter>,
) -> ApiResult<impl IntoResponse> {
    let events = state.engine.audit_log(&actor, filter).await?;
    Ok(Json(events))
}
