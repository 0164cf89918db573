//! Axum handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::Value;
use tracing::{debug, info};

use linksorter_core::INVALID_URL_MESSAGE;
use linksorter_shared::{CategoryMap, LinkSorterError};

use crate::AppState;
use crate::error::ApiError;

const WELCOME: &str =
    "Welcome to the Link Categorization App. Use the API to categorize your links.";

/// GET /
pub(crate) async fn root() -> &'static str {
    WELCOME
}

/// GET /categories
pub(crate) async fn categories(State(state): State<AppState>) -> Json<CategoryMap> {
    Json(state.categorizer.store().snapshot().await)
}

/// POST /add_link
///
/// Anything other than a JSON object with a string `url` is rejected with
/// the same message as a URL that does not start with `http`.
pub(crate) async fn add_link(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CategoryMap>, ApiError> {
    let url = match &body {
        Ok(Json(value)) => value.get("url").and_then(Value::as_str),
        Err(rejection) => {
            debug!(error = %rejection, "rejected add_link body");
            None
        }
    };

    let Some(url) = url else {
        return Err(LinkSorterError::validation(INVALID_URL_MESSAGE).into());
    };

    info!(%url, "add_link");
    let map = state.categorizer.add_link(url).await?;
    Ok(Json(map))
}
