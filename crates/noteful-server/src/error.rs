//! API error types with JSON responses.
//!
//! Every error renders as `{"error":{"message":"..."}}`. Client errors carry
//! their message verbatim. Server errors always render the generic
//! [`SERVER_ERROR_MESSAGE`] and attach the underlying detail as a
//! [`FailureDetail`] response extension for the error-handling middleware.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use noteful_store::StoreError;
use serde::{Deserialize, Serialize};

/// Message returned for every 500 in production.
pub const SERVER_ERROR_MESSAGE: &str = "server error";

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("{0}")]
    BadRequest(String),

    /// Not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error (500).
    #[error("{0}")]
    Internal(String),

    /// Store error (500).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a failure the client did not cause.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetails {
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                message: message.into(),
            },
        }
    }
}

/// Underlying cause of a 500, carried on the response for the error handler.
#[derive(Debug, Clone)]
pub struct FailureDetail(pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_server_error() {
            let mut response =
                (status, Json(ErrorResponse::new(SERVER_ERROR_MESSAGE))).into_response();
            response
                .extensions_mut()
                .insert(FailureDetail(self.to_string()));
            return response;
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Store(StoreError::ConfigError("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_client_error_message_is_verbatim() {
        let response = ApiError::NotFound("Bookmark doesn't exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<FailureDetail>().is_none());
        assert_eq!(
            body_of(response).await,
            ErrorResponse::new("Bookmark doesn't exist")
        );
    }

    #[tokio::test]
    async fn test_server_error_is_masked_and_detail_attached() {
        let error = ApiError::Store(StoreError::MigrationError("boom".into()));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<FailureDetail>().cloned().unwrap();
        assert_eq!(detail.0, "storage error: migration error: boom");
        assert_eq!(body_of(response).await, ErrorResponse::new(SERVER_ERROR_MESSAGE));
    }

    #[test]
    fn test_error_envelope_shape() {
        let json = serde_json::to_value(ErrorResponse::new("Missing 'title' in request body")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": { "message": "Missing 'title' in request body" } })
        );
    }
}
