//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes exposing every engine operation
//! - Bearer-token middleware and the actor extractor
//! - JSON error rendering with stable codes

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use warden_core::Engine;
use warden_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger and clearance engine.
    pub engine: Arc<Engine>,
    /// JWT service for decoding access tokens.
    pub jwt_service: Arc<JwtService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
