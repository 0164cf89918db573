//! Mapping from [`LinkSorterError`] to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use linksorter_shared::LinkSorterError;

/// Body text for any failure to obtain page text.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch content";

/// Error wrapper returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub LinkSorterError);

impl From<LinkSorterError> for ApiError {
    fn from(err: LinkSorterError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            LinkSorterError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            LinkSorterError::Fetch(_) | LinkSorterError::Extraction(_) => {
                (StatusCode::BAD_REQUEST, FETCH_FAILED_MESSAGE.to_string())
            }
            err @ LinkSorterError::MalformedAction { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to parse LLM output: {err}"),
            ),
            LinkSorterError::Oracle(msg) => {
                (StatusCode::BAD_GATEWAY, format!("LLM request failed: {msg}"))
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(%status, error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
