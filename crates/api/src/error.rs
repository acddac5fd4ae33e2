//! Error rendering.
//!
//! Every failure leaves the API as `{ "error": message, "code": CODE }` with
//! the status the engine assigns to the variant.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use warden_core::EngineError;
use warden_core::reports::ReportError;

/// An engine error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if self.0.is_internal() {
            tracing::error!(error = %self.0, "request failed in the store");
            "an internal error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": message,
                "code": self.0.error_code(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use warden_core::StoreError;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_input_renders_message_and_code() {
        let response = ApiError(EngineError::invalid("amount must be greater than zero")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["error"], "amount must be greater than zero");
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_store_errors_hide_details() {
        let err = EngineError::Store(StoreError::Database("relation fines does not exist".into()));
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["code"], "STORE_ERROR");
        assert_eq!(body["error"], "an internal error occurred");
    }
}
