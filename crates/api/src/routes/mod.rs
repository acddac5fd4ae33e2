//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod audit;
pub mod clearance;
pub mod fines;
pub mod health;
pub mod ledger;
pub mod occupants;
pub mod overrides;
pub mod reports;
pub mod terms;

/// Creates the API router; everything but the health check requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(terms::routes())
        .merge(occupants::routes())
        .merge(ledger::routes())
        .merge(fines::routes())
        .merge(clearance::routes())
        .merge(overrides::routes())
        .merge(reports::routes())
        .merge(audit::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
