//! Subscriber model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{is_valid_email, ValidationErrors};

/// Newsletter subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Unique identifier (0 until persisted)
    pub id: i64,
    /// Delivery address
    pub email: String,
    /// When the visitor signed up
    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn new(email: impl Into<String>, subscribed_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            email: email.into(),
            subscribed_at,
        }
    }
}

/// Newsletter signup form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberForm {
    #[serde(default)]
    pub email: String,
}

impl SubscriberForm {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("email", "Email", &self.email);
        if !self.email.trim().is_empty() && !is_valid_email(&self.email) {
            errors.add("email", "Email is not a valid address");
        }
        errors
    }

    /// The submitted address, trimmed
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_string()
    }
}
