//! API layer - HTTP handlers and routing
//!
//! Thin handlers that build a controller for the request, run one action and
//! render its [`ActionResult`](crate::controllers::ActionResult):
//! - Home pages under `/` and `/home`
//! - Article administration under `/admin`
//! - Newsletter signup under `/newsletter`

pub mod admin;
pub mod home;
pub mod middleware;
pub mod newsletter;
pub mod responses;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState};
pub use responses::ViewResponse;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .nest(home::BASE, home::router())
        .nest(admin::BASE, admin::router())
        .nest(newsletter::BASE, newsletter::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
