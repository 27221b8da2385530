//! Newsletter signup
//!
//! - GET /newsletter - Signup form
//! - POST /newsletter/subscribe - Register an address

use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Json, Router,
};

use super::middleware::{ApiError, AppState};
use super::responses::{render, respond};
use crate::models::SubscriberForm;

pub const BASE: &str = "/newsletter";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/subscribe", post(subscribe))
}

async fn index(State(state): State<AppState>) -> Response {
    render(BASE, state.newsletter().index())
}

async fn subscribe(
    State(state): State<AppState>,
    Json(form): Json<SubscriberForm>,
) -> Result<Response, ApiError> {
    respond(BASE, state.newsletter().subscribe(form).await)
}
