//! Route definitions for the HTTP API.

pub mod resource;

use axum::{Router, middleware::from_fn_with_state};

use crate::auth;
use crate::error::ApiError;
use crate::middleware::errors::handle_errors;
use crate::state::AppState;

/// Message for requests that match no route.
pub const NO_ROUTE_MESSAGE: &str = "Not found";

/// Build the complete router with all routes.
///
/// Every resource is mounted under `/api`. The bearer token gate wraps all
/// routes, unmatched paths included, and the error handler wraps the gate.
pub fn build_router(state: AppState) -> Router {
    let api = state
        .services()
        .iter()
        .fold(Router::new(), |router, service| {
            router.merge(resource::routes(service.clone()))
        });

    Router::new()
        .nest("/api", api)
        .fallback(no_route)
        .layer(from_fn_with_state(state.clone(), auth::require_api_token))
        .layer(from_fn_with_state(state, handle_errors))
}

async fn no_route() -> ApiError {
    ApiError::NotFound(NO_ROUTE_MESSAGE.to_string())
}
