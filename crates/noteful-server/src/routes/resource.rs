//! CRUD routes shared by every resource.
//!
//! For a resource named `things` this mounts:
//! - GET /things - List every row
//! - POST /things - Create a row
//! - GET /things/{id} - Read one row
//! - DELETE /things/{id} - Delete one row
//! - PATCH /things/{id} - Update some fields of one row
//!
//! The `{id}` routes first run an existence check that loads the row into
//! the request extensions, so a missing row is a 404 before the body is
//! looked at.

use axum::{
    Extension, Json, Router,
    extract::{OriginalUri, Path, Request, State},
    http::{StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::get,
};
use noteful_core::{Record, ResourceId};
use noteful_store::ResourceService;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;

/// Row loaded by the existence check.
#[derive(Debug, Clone)]
pub struct Existing {
    pub id: ResourceId,
    pub row: Record,
}

/// Routes for the resource bound to `service`.
pub fn routes(service: ResourceService) -> Router {
    let name = service.resource().name;

    let item = Router::new()
        .route(
            &format!("/{name}/{{id}}"),
            get(read_one).delete(delete_one).patch(update_one),
        )
        .route_layer(from_fn_with_state(service.clone(), load_existing));

    Router::new()
        .route(&format!("/{name}"), get(list).post(create))
        .merge(item)
        .with_state(service)
}

// ============================================================================
// Existence Check
// ============================================================================

/// Load the addressed row or answer 404 with the resource's message.
///
/// An id that is not an integer cannot name a row and is treated as absent.
async fn load_existing(
    State(service): State<ResourceService>,
    Path(raw_id): Path<String>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let resource = service.resource();
    let not_found = || ApiError::NotFound(resource.not_found_message.to_string());

    let id: ResourceId = raw_id.parse().map_err(|_| {
        tracing::debug!(resource = resource.name, id = %raw_id, "Non-numeric id");
        not_found()
    })?;

    let Some(row) = service.get_by_id(id).await? else {
        tracing::debug!(resource = resource.name, id, "Row not found");
        return Err(not_found());
    };

    request.extensions_mut().insert(Existing { id, row });
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /{resource}
async fn list(State(service): State<ResourceService>) -> ApiResult<Json<Vec<Value>>> {
    let resource = service.resource();
    let rows = service.get_all().await?;
    Ok(Json(rows.iter().map(|row| resource.serialize(row)).collect()))
}

/// POST /{resource}
async fn create(
    State(service): State<ResourceService>,
    OriginalUri(uri): OriginalUri,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let resource = service.resource();

    if let Some(field) = resource.first_missing_required(&body) {
        tracing::debug!(resource = resource.name, field, "Create rejected");
        return Err(ApiError::BadRequest(format!(
            "Missing '{field}' in request body"
        )));
    }

    let row = service.insert(&resource.new_entity(&body)).await?;
    let id = row
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| ApiError::Internal(format!("{} insert returned no id", resource.table)))?;

    tracing::info!(resource = resource.name, id, "Created {}", resource.label());

    let location = format!("{}/{id}", uri.path().trim_end_matches('/'));
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(resource.serialize(&row)),
    ))
}

/// GET /{resource}/{id}
async fn read_one(
    State(service): State<ResourceService>,
    Extension(existing): Extension<Existing>,
) -> Json<Value> {
    Json(service.resource().serialize(&existing.row))
}

/// DELETE /{resource}/{id}
async fn delete_one(
    State(service): State<ResourceService>,
    Extension(existing): Extension<Existing>,
) -> ApiResult<StatusCode> {
    let resource = service.resource();
    service.delete(existing.id).await?;
    tracing::info!(resource = resource.name, id = existing.id, "Deleted {}", resource.label());
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /{resource}/{id}
async fn update_one(
    State(service): State<ResourceService>,
    Extension(existing): Extension<Existing>,
    JsonBody(body): JsonBody,
) -> ApiResult<StatusCode> {
    let resource = service.resource();

    let Some(patch) = resource.patch_fields(&body) else {
        return Err(ApiError::BadRequest(
            resource.empty_patch_message.to_string(),
        ));
    };

    service.update(existing.id, &patch).await?;
    tracing::info!(resource = resource.name, id = existing.id, "Updated {}", resource.label());
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use noteful_core::{FOLDERS, NOTES};
    use noteful_store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn folders() -> (Router, ResourceService) {
        let service = ResourceService::new(&FOLDERS, Arc::new(MemoryStore::new()));
        (routes(service.clone()), service)
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> axum::http::Request<Body> {
        let builder = axum::http::Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_sets_location_from_request_path() {
        let (app, _) = folders();
        let response = app
            .oneshot(request("POST", "/folders", Some(json!({ "title": "Work" }))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/folders/1");
    }

    #[tokio::test]
    async fn test_existence_check_runs_before_body_validation() {
        let (app, _) = folders();
        let response = app
            .oneshot(request("PATCH", "/folders/42", Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let (app, _) = folders();
        let response = app
            .oneshot(request("GET", "/folders/abc", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let (app, service) = folders();
        service
            .insert(json!({ "title": "Old" }).as_object().unwrap())
            .await
            .unwrap();

        let response = app
            .oneshot(request("DELETE", "/folders/1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(service.get_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_patch_ignores_folderid_on_notes() {
        let service = ResourceService::new(&NOTES, Arc::new(MemoryStore::new()));
        service
            .insert(
                json!({ "title": "a", "content": "b", "modified": "c", "folderid": 1 })
                    .as_object()
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = routes(service.clone())
            .oneshot(request("PATCH", "/notes/1", Some(json!({ "folderid": 9 }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let row = service.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(row["folderid"], json!(1));
    }
}
