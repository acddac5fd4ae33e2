//! Health check endpoint.
//!
//! Also surfaces the count of audit writes that failed since start-up, so a
//! silently degrading audit trail shows up in monitoring.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` once an audit write has failed.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Audit writes dropped since start-up.
    pub audit_write_failures: u64,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let audit_write_failures = state.engine.audit_failures();
    Json(HealthResponse {
        status: if audit_write_failures == 0 { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        audit_write_failures,
    })
}

/// Creates the health check route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
