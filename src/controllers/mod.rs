//! Controllers
//!
//! Request workflows independent of the HTTP layer. Each action returns an
//! [`ActionResult`]: a view with its model, a redirect to another action, or
//! not-found. Storage failures propagate as [`ControllerError`].
//!
//! Controllers receive their repositories and services through their
//! constructors.

pub mod admin;
pub mod home;
pub mod newsletter;

pub use admin::AdminController;
pub use home::HomeController;
pub use newsletter::NewsletterController;

use serde::Serialize;

use crate::db::StorageError;
use crate::models::{
    Article, ArticleForm, Category, NewsLetter, NewsLetterForm, Subscriber, SubscriberForm,
    ValidationErrors, YearGroup,
};
use crate::services::DispatchReport;

/// Data rendered by a view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewModel {
    /// Static page
    Empty,
    Articles(Vec<Article>),
    Article(Article),
    Archive(Vec<YearGroup>),
    ArticleForm {
        form: ArticleForm,
        categories: Vec<Category>,
        errors: ValidationErrors,
    },
    NewsLetterForm {
        form: NewsLetterForm,
        errors: ValidationErrors,
    },
    NewsletterSent {
        newsletter: NewsLetter,
        report: DispatchReport,
    },
    SubscriberForm {
        form: SubscriberForm,
        errors: ValidationErrors,
    },
    Subscribed {
        subscriber: Subscriber,
        owner_notified: bool,
    },
}

/// Outcome of a controller action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    View { name: &'static str, model: ViewModel },
    Redirect { action: &'static str },
    NotFound,
}

impl ActionResult {
    pub fn view(name: &'static str, model: ViewModel) -> Self {
        ActionResult::View { name, model }
    }

    pub fn redirect(action: &'static str) -> Self {
        ActionResult::Redirect { action }
    }

    pub fn view_name(&self) -> Option<&'static str> {
        match self {
            ActionResult::View { name, .. } => Some(*name),
            _ => None,
        }
    }

    pub fn model(&self) -> Option<&ViewModel> {
        match self {
            ActionResult::View { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn redirect_action(&self) -> Option<&'static str> {
        match self {
            ActionResult::Redirect { action } => Some(*action),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ActionResult::NotFound)
    }
}

/// Controller failures
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ActionOutcome = Result<ActionResult, ControllerError>;
