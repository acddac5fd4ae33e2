//! Term routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};

use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the term routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/terms/active", get(get_active_term))
}

/// Returns the active term, creating it when the dorm allows.
async fn get_active_term(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<impl IntoResponse> {
    let term = state.engine.ensure_active_term(&actor).await?;
    Ok(Json(term))
}
