//! Turning controller results into HTTP responses
//!
//! - View → `200` with `{ "view": name, "model": model }`
//! - Redirect → `303 See Other` to the action's route
//! - NotFound → `404` error body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use super::middleware::ApiError;
use crate::controllers::{ActionOutcome, ActionResult, ViewModel};

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: &'static str,
    pub model: ViewModel,
}

/// Route of `action` on the controller mounted at `base`
pub fn action_path(base: &str, action: &str) -> String {
    let base = base.trim_end_matches('/');
    if action == "Index" {
        if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        }
    } else {
        format!("{}/{}", base, action.to_lowercase())
    }
}

/// Render an action result for the controller mounted at `base`
pub fn render(base: &str, result: ActionResult) -> Response {
    match result {
        ActionResult::View { name, model } => {
            (StatusCode::OK, Json(ViewResponse { view: name, model })).into_response()
        }
        ActionResult::Redirect { action } => Redirect::to(&action_path(base, action)).into_response(),
        ActionResult::NotFound => ApiError::not_found("Resource not found").into_response(),
    }
}

/// Render an action outcome, mapping controller failures to `500`
pub fn respond(base: &str, outcome: ActionOutcome) -> Result<Response, ApiError> {
    Ok(render(base, outcome?))
}
