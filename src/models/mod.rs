//! Data models
//!
//! This module contains the data structures used throughout the article site:
//! - Entities (Article, Category, Subscriber, NewsLetter)
//! - Form types submitted by the admin and visitor workflows
//! - Field-level validation results

mod article;
mod category;
mod newsletter;
mod subscriber;
mod validation;

pub use article::{Article, ArticleForm, YearGroup, TITLE_MAX_LENGTH};
pub use category::{Category, CategoryRef};
pub use newsletter::{NewsLetter, NewsLetterForm, SUBJECT_MAX_LENGTH};
pub use subscriber::{Subscriber, SubscriberForm};
pub use validation::{is_valid_email, ValidationErrors};
