//! Authentication: a single shared-secret bearer token gate.
//!
//! The gate runs before routing to any resource. A request without
//! `Authorization: Bearer <token>`, or with a token different from the
//! configured `API_TOKEN`, is answered with 401 and never reaches a router
//! or the database.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Message for every authentication failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized request";

/// Token presented in the `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            tracing::debug!(path = %parts.uri.path(), "Missing Authorization header");
            return Err(unauthorized());
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                tracing::debug!(path = %parts.uri.path(), "Authorization header is not Bearer <token>");
                unauthorized()
            })?;

        Ok(Self(token.to_string()))
    }
}

/// Middleware rejecting requests whose bearer token does not match `API_TOKEN`.
pub async fn require_api_token(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if !constant_time_eq(token.as_bytes(), state.config().api_token.as_bytes()) {
        tracing::warn!(path = %request.uri().path(), "Rejected request with invalid bearer token");
        return Err(unauthorized());
    }

    Ok(next.run(request).await)
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
