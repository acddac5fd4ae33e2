//! Authentication middleware for protected routes.
//!
//! Role resolution happens upstream: the access token already names the
//! actor, their dorm, and their role. This layer only verifies it and turns
//! the claims into an [`ActorContext`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use warden_core::{ActorContext, EngineError, Role};
use warden_shared::Claims;
use warden_shared::types::{DormId, UserId};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Validates the bearer token and stores its claims in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError(EngineError::Unauthorized).into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected access token");
            ApiError(EngineError::Unauthorized).into_response()
        }
    }
}

/// The authenticated actor of a request.
///
/// ```ignore
/// async fn handler(Actor(actor): Actor) -> impl IntoResponse {
///     // actor.dorm_id scopes every engine call
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub ActorContext);

impl TryFrom<&Claims> for Actor {
    type Error = EngineError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let role = Role::parse(&claims.role).ok_or(EngineError::Unauthorized)?;
        Ok(Self(ActorContext::new(
            UserId::from_uuid(claims.user_id()),
            DormId::from_uuid(claims.dorm_id()),
            role,
        )))
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or(EngineError::Unauthorized)?;
        Ok(Self::try_from(claims)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    #[test]
    fn test_bearer_prefix_variants() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_claims_become_actor() {
        let claims = Claims::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "student_assistant",
            Utc::now() + Duration::hours(1),
        );
        let Actor(actor) = Actor::try_from(&claims).unwrap();
        assert_eq!(actor.role, Role::StudentAssistant);
        assert_eq!(actor.dorm_id.into_inner(), claims.dorm_id());
    }

    #[test]
    fn test_unknown_role_is_unauthorized() {
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), "janitor", Utc::now());
        assert!(matches!(Actor::try_from(&claims), Err(EngineError::Unauthorized)));
    }
}
