//! Shared application state and error responses
//!
//! Every request gets its own data context from the factory in [`AppState`];
//! the repositories behind one request's controller share that context.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::controllers::{AdminController, ControllerError, HomeController, NewsletterController};
use crate::db::repositories::{
    DbArticleRepository, DbCategoryRepository, DbNewsLetterRepository, DbSubscriberRepository,
};
use crate::db::DataContextFactory;
use crate::services::{EmailSettings, NewsletterDispatcher, Notifier};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub contexts: Arc<dyn DataContextFactory>,
    pub notifier: Arc<dyn Notifier>,
    pub email: Arc<EmailSettings>,
}

impl AppState {
    pub fn new(
        contexts: Arc<dyn DataContextFactory>,
        notifier: Arc<dyn Notifier>,
        email: EmailSettings,
    ) -> Self {
        Self {
            contexts,
            notifier,
            email: Arc::new(email),
        }
    }

    fn dispatcher(&self) -> NewsletterDispatcher {
        NewsletterDispatcher::new(self.notifier.clone(), (*self.email).clone())
    }

    pub fn home(&self) -> HomeController {
        HomeController::new(DbArticleRepository::boxed(self.contexts.create()))
    }

    pub fn admin(&self) -> AdminController {
        let context = self.contexts.create();
        AdminController::new(
            DbArticleRepository::boxed(context.clone()),
            DbCategoryRepository::boxed(context.clone()),
            DbNewsLetterRepository::boxed(context.clone()),
            DbSubscriberRepository::boxed(context),
            self.dispatcher(),
        )
    }

    pub fn newsletter(&self) -> NewsletterController {
        NewsletterController::new(
            DbSubscriberRepository::boxed(self.contexts.create()),
            self.dispatcher(),
        )
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ControllerError> for ApiError {
    fn from(err: ControllerError) -> Self {
        tracing::error!("Request failed: {}", err);
        ApiError::internal_error(err.to_string())
    }
}
