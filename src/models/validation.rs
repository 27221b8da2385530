//! Field-level validation results
//!
//! Validation is a pure predicate over a submitted form. The result keeps one
//! list of messages per field so a form can be re-rendered next to its errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// True when no field has a message
    pub fn is_valid(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages for one field (empty when the field is valid)
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Names of the invalid fields, sorted
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Require a non-blank value
    pub fn require(&mut self, field: &str, label: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{} is required", label));
        }
    }

    /// Limit a value to `max` characters
    pub fn max_length(&mut self, field: &str, label: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(
                field,
                format!("{} must be at most {} characters", label, max),
            );
        }
    }
}

/// Check that a string is a well-formed mailbox address (`user@domain`)
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && lettre::Address::from_str(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_errors_are_valid() {
        let errors = ValidationErrors::new();
        assert!(errors.is_valid());
        assert!(errors.field("title").is_empty());
    }

    #[test]
    fn test_require_rejects_blank_values() {
        let mut errors = ValidationErrors::new();
        errors.require("title", "Title", "   \t");
        errors.require("content", "Content", "body");

        assert!(!errors.is_valid());
        assert_eq!(errors.field("title"), ["Title is required".to_string()]);
        assert!(!errors.has_field("content"));
    }

    #[test]
    fn test_max_length_counts_characters() {
        let mut errors = ValidationErrors::new();
        errors.max_length("title", "Title", "ééé", 3);
        assert!(errors.is_valid());

        errors.max_length("title", "Title", "éééé", 3);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email("  reader@example.com "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("reader"));
        assert!(!is_valid_email("reader@"));
        assert!(!is_valid_email("@example.com"));
    }
}
