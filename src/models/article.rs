//! Article model
//!
//! This module provides:
//! - `Article` entity representing a published article
//! - `ArticleForm`, the candidate article submitted by the admin forms
//! - `YearGroup`, one bucket of the archive view

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::category::CategoryRef;
use super::validation::ValidationErrors;

/// Maximum number of characters in an article title
pub const TITLE_MAX_LENGTH: usize = 255;

/// Article entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier (0 until persisted)
    pub id: i64,
    /// Article title
    pub title: String,
    /// Article body
    pub content: String,
    /// Publication timestamp
    pub date_published: DateTime<Utc>,
    /// Associated categories
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

impl Article {
    /// Create a new, not yet persisted article without categories
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        date_published: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            content: content.into(),
            date_published,
            categories: Vec::new(),
        }
    }

    /// Replace the associated categories
    pub fn with_categories(mut self, categories: Vec<CategoryRef>) -> Self {
        self.categories = categories;
        self
    }

    /// Year component of the publication date
    pub fn year(&self) -> i32 {
        self.date_published.year()
    }

    /// True when one of the article's categories has the given name
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.matches_name(name))
    }

    pub fn category_ids(&self) -> Vec<i64> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// Candidate article submitted by the create and edit forms
///
/// Every field is optional on the wire so an incomplete submission reaches
/// validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleForm {
    /// Id of the edited article (0 on create)
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub date_published: Option<DateTime<Utc>>,
    /// Selected category ids
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl ArticleForm {
    /// Populate a form from a stored article
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            content: article.content.clone(),
            date_published: Some(article.date_published),
            category_ids: article.category_ids(),
        }
    }

    /// Check the required fields: title (bounded length), content, publication date
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("title", "Title", &self.title);
        errors.max_length("title", "Title", &self.title, TITLE_MAX_LENGTH);
        errors.require("content", "Content", &self.content);
        if self.date_published.is_none() {
            errors.add("date_published", "Date published is required");
        }
        errors
    }

    /// Build the article this form describes
    ///
    /// Returns the validation errors instead when the form is invalid.
    pub fn into_article(self, categories: Vec<CategoryRef>) -> Result<Article, ValidationErrors> {
        let errors = self.validate();
        match self.date_published {
            Some(date_published) if errors.is_valid() => Ok(Article {
                id: self.id,
                title: self.title,
                content: self.content,
                date_published,
                categories,
            }),
            _ => Err(errors),
        }
    }
}

/// Articles published in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearGroup {
    pub year: i32,
    pub articles: Vec<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn published() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 14, 9, 30, 0).unwrap()
    }

    fn valid_form() -> ArticleForm {
        ArticleForm {
            id: 0,
            title: "Valid Title".to_string(),
            content: "Valid Content".to_string(),
            date_published: Some(published()),
            category_ids: vec![2],
        }
    }

    #[test]
    fn test_new_article_is_unsaved() {
        let article = Article::new("Title", "Body", published());
        assert_eq!(article.id, 0);
        assert_eq!(article.year(), 2021);
        assert!(article.categories.is_empty());
    }

    #[test]
    fn test_has_category_is_case_insensitive() {
        let article = Article::new("Title", "Body", published()).with_categories(vec![
            CategoryRef { id: 1, name: "Rust".to_string() },
            CategoryRef { id: 2, name: "Databases".to_string() },
        ]);

        assert!(article.has_category("rust"));
        assert!(article.has_category("DATABASES"));
        assert!(!article.has_category("Go"));
        assert_eq!(article.category_ids(), vec![1, 2]);
    }

    #[test]
    fn test_valid_form() {
        assert!(valid_form().validate().is_valid());
    }

    #[test]
    fn test_form_missing_title_and_date() {
        let form = ArticleForm {
            content: "Test Content".to_string(),
            ..ArticleForm::default()
        };

        let errors = form.validate();
        assert!(errors.has_field("title"));
        assert!(errors.has_field("date_published"));
        assert!(!errors.has_field("content"));
    }

    #[test]
    fn test_form_whitespace_content_is_invalid() {
        let form = ArticleForm {
            content: " \n\t".to_string(),
            ..valid_form()
        };

        assert!(form.validate().has_field("content"));
    }

    #[test]
    fn test_form_title_too_long() {
        let form = ArticleForm {
            title: "x".repeat(TITLE_MAX_LENGTH + 1),
            ..valid_form()
        };

        assert!(form.validate().has_field("title"));
    }

    #[test]
    fn test_into_article_keeps_fields() {
        let categories = vec![CategoryRef { id: 2, name: "Rust".to_string() }];
        let article = valid_form().into_article(categories.clone()).unwrap();

        assert_eq!(article.title, "Valid Title");
        assert_eq!(article.content, "Valid Content");
        assert_eq!(article.date_published, published());
        assert_eq!(article.categories, categories);
    }

    #[test]
    fn test_into_article_rejects_invalid_form() {
        let errors = ArticleForm::default().into_article(Vec::new()).unwrap_err();
        assert!(!errors.is_valid());
    }

    #[test]
    fn test_form_round_trips_article() {
        let article = valid_form()
            .into_article(vec![CategoryRef { id: 2, name: "Rust".to_string() }])
            .unwrap();
        let form = ArticleForm::from_article(&article);

        assert_eq!(form, valid_form());
    }

    #[test]
    fn test_form_deserializes_with_missing_fields() {
        let form: ArticleForm = serde_json::from_str(r#"{"content":"Body"}"#).unwrap();
        assert_eq!(form.title, "");
        assert!(form.date_published.is_none());
        assert!(form.category_ids.is_empty());
    }
}
