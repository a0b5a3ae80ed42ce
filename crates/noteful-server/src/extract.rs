//! Request body extraction.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use noteful_core::Record;
use serde_json::Value;

use crate::error::ApiError;

/// A request body parsed as a JSON object.
///
/// Mirrors a JSON body parser mounted in front of the routes: a request that
/// does not declare a JSON content type, or has no body, parses as `{}` and
/// is then judged by field validation. A declared JSON body that is malformed
/// or not an object is a 400 with the standard error envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Record);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let declares_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_json_content_type);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if !declares_json || bytes.is_empty() {
            return Ok(Self(Record::new()));
        }

        let Json(value) = Json::<Value>::from_bytes(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "Rejected malformed JSON body");
            ApiError::BadRequest(e.body_text())
        })?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
