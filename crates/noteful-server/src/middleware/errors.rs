//! Central handler for server failures.
//!
//! Handlers turn persistence failures into a 500 carrying a [`FailureDetail`]
//! extension. This middleware logs that detail and decides what the client
//! sees: the generic message in production, the detail text elsewhere.
//! Responses without a detail pass through unchanged.

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{ErrorResponse, FailureDetail};
use crate::state::AppState;

/// Log and render failures reported through [`FailureDetail`].
pub async fn handle_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    let Some(FailureDetail(detail)) = response.extensions_mut().remove::<FailureDetail>() else {
        return response;
    };

    tracing::error!(%method, %path, error = %detail, "Request failed");

    if state.config().environment.is_production() {
        return response;
    }

    (response.status(), Json(ErrorResponse::new(detail))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, ServerConfig};
    use crate::error::{ApiError, SERVER_ERROR_MESSAGE};
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use noteful_store::{MemoryStore, StoreError};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn failing() -> Result<(), ApiError> {
        Err(StoreError::ConfigError("pool closed".into()).into())
    }

    async fn missing() -> Result<(), ApiError> {
        Err(ApiError::NotFound("Folder doesn't exist".into()))
    }

    async fn call(environment: Environment, path: &str) -> (StatusCode, ErrorResponse) {
        let config = ServerConfig::new("t").with_environment(environment);
        let state = AppState::new(Arc::new(MemoryStore::new()), config);
        let app = Router::new()
            .route("/fail", get(failing))
            .route("/missing", get(missing))
            .layer(middleware::from_fn_with_state(state, handle_errors));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        assert!(response.extensions().get::<FailureDetail>().is_none());
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_production_masks_detail() {
        let (status, body) = call(Environment::Production, "/fail").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, ErrorResponse::new(SERVER_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_development_exposes_detail() {
        let (status, body) = call(Environment::Development, "/fail").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            ErrorResponse::new("storage error: configuration error: pool closed")
        );
    }

    #[tokio::test]
    async fn test_client_errors_pass_through() {
        for environment in [Environment::Production, Environment::Development] {
            let (status, body) = call(environment, "/missing").await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, ErrorResponse::new("Folder doesn't exist"));
        }
    }
}
