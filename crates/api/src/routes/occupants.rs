//! Occupant routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;
use warden_core::occupants::EnrollOccupantInput;

use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the occupant routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/occupants", get(list_occupants).post(enroll_occupant))
        .route("/occupants/{occupant_id}/report", get(get_occupant_report))
}

async fn list_occupants(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<impl IntoResponse> {
    let occupants = state.engine.list_occupants(&actor).await?;
    Ok(Json(occupants))
}

async fn enroll_occupant(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(input): Json<EnrollOccupantInput>,
) -> ApiResult<impl IntoResponse> {
    let occupant = state.engine.enroll_occupant(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(occupant)))
}

/// Balances, category breakdown, and fines for one occupant.
async fn get_occupant_report(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(occupant_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let report = state
        .engine
        .occupant_report(&actor, occupant_id.into())
        .await?;
    Ok(Json(report))
}
