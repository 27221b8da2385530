//! Article administration and newsletter composition
//!
//! Form posts carry JSON bodies. Successful creates, edits and deletes
//! redirect back to `/admin`. An edit body may omit its id; a body id that
//! differs from the path id is rejected.

use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::middleware::{ApiError, AppState};
use super::responses::{render, respond};
use crate::models::{ArticleForm, NewsLetterForm};

pub const BASE: &str = "/admin";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/details/{id}", get(details))
        .route("/create", get(create).post(create_post))
        .route("/edit/{id}", get(edit).post(edit_post))
        .route("/delete/{id}", get(delete).post(delete_confirmed))
        .route("/newsletter", get(create_newsletter).post(create_newsletter_post))
}

async fn index(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(BASE, state.admin().index().await)
}

async fn details(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, ApiError> {
    respond(BASE, state.admin().details(id).await)
}

async fn create(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(BASE, state.admin().create().await)
}

async fn create_post(
    State(state): State<AppState>,
    Json(form): Json<ArticleForm>,
) -> Result<Response, ApiError> {
    respond(BASE, state.admin().create_post(form).await)
}

async fn edit(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, ApiError> {
    respond(BASE, state.admin().edit(id).await)
}

async fn edit_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<ArticleForm>,
) -> Result<Response, ApiError> {
    if form.id != 0 && form.id != id {
        return Err(ApiError::validation_error("Article id does not match the URL")
            .with_details(json!({ "path_id": id, "body_id": form.id })));
    }
    respond(BASE, state.admin().edit_post(id, form).await)
}

async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, ApiError> {
    respond(BASE, state.admin().delete(id).await)
}

async fn delete_confirmed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    respond(BASE, state.admin().delete_confirmed(id).await)
}

async fn create_newsletter(State(state): State<AppState>) -> Response {
    render(BASE, state.admin().create_newsletter())
}

async fn create_newsletter_post(
    State(state): State<AppState>,
    Json(form): Json<NewsLetterForm>,
) -> Result<Response, ApiError> {
    respond(BASE, state.admin().create_newsletter_post(form).await)
}
