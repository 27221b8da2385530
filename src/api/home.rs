//! Public pages
//!
//! - GET / - Newest articles first
//! - GET /home/about, GET /home/contact - Static pages
//! - GET /home/articles/{id} - Single article
//! - GET /home/summary?searchTerm= - Articles in a category
//! - GET /home/archive - Articles grouped by year

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::middleware::{ApiError, AppState};
use super::responses::{render, respond};

pub const BASE: &str = "/home";

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(rename = "searchTerm")]
    pub search_term: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/articles/{id}", get(article_details))
        .route("/summary", get(article_summary))
        .route("/archive", get(archive))
}

pub async fn index(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(BASE, state.home().index().await)
}

async fn about(State(state): State<AppState>) -> Response {
    render(BASE, state.home().about())
}

async fn contact(State(state): State<AppState>) -> Response {
    render(BASE, state.home().contact())
}

async fn article_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    respond(BASE, state.home().article_details(id).await)
}

async fn article_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    respond(
        BASE,
        state.home().article_summary(query.search_term.as_deref()).await,
    )
}

async fn archive(State(state): State<AppState>) -> Result<Response, ApiError> {
    respond(BASE, state.home().archive().await)
}
