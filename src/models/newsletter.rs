//! Newsletter model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;

/// Maximum number of characters in a newsletter subject
pub const SUBJECT_MAX_LENGTH: usize = 255;

/// A composed newsletter, stored once it has been sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsLetter {
    /// Unique identifier (0 until persisted)
    pub id: i64,
    pub subject: String,
    pub body: String,
    /// When the newsletter was dispatched
    pub sent_at: DateTime<Utc>,
}

impl NewsLetter {
    pub fn new(subject: impl Into<String>, body: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            subject: subject.into(),
            body: body.into(),
            sent_at,
        }
    }
}

/// Newsletter composition form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsLetterForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl NewsLetterForm {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("subject", "Subject", &self.subject);
        errors.max_length("subject", "Subject", &self.subject, SUBJECT_MAX_LENGTH);
        errors.require("body", "Body", &self.body);
        errors
    }

    /// Stamp the form as a newsletter sent at `sent_at`
    pub fn into_newsletter(self, sent_at: DateTime<Utc>) -> NewsLetter {
        NewsLetter::new(self.subject, self.body, sent_at)
    }
}
