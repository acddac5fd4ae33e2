//! Dashboard and clearance routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use warden_core::clearance::ClearanceOrder;

use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the dashboard and clearance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/clearance", get(get_clearance_list))
}

/// Query parameters for the clearance list.
#[derive(Debug, Default, Deserialize)]
pub struct ClearanceQuery {
    /// `worst_first` (default) or `natural`.
    pub order: Option<String>,
}

async fn get_dashboard(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<impl IntoResponse> {
    let stats = state.engine.dashboard_stats(&actor).await?;
    Ok(Json(stats))
}

async fn get_clearance_list(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<ClearanceQuery>,
) -> ApiResult<impl IntoResponse> {
    let order = match query.order.as_deref() {
        Some("natural") => ClearanceOrder::Natural,
        _ => ClearanceOrder::WorstFirst,
    };
    let rows = state.engine.clearance_list(&actor, order).await?;
    Ok(Json(rows))
}
