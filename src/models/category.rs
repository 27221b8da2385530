//! Category model
//!
//! Categories tag articles through the `ArticleCategory` join table. Both sides
//! of the relation are read from that table, so an article's categories and a
//! category's articles always agree.

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier (0 until persisted)
    pub id: i64,
    /// Display name
    pub name: String,
    /// Ids of the articles tagged with this category
    #[serde(default)]
    pub article_ids: Vec<i64>,
}

impl Category {
    /// Create a new, not yet persisted category
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            article_ids: Vec::new(),
        }
    }

    /// The article-side view of this category
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// A category as seen from an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

impl CategoryRef {
    /// Case-insensitive name comparison, ignoring surrounding whitespace
    pub fn matches_name(&self, term: &str) -> bool {
        self.name.trim().to_lowercase() == term.trim().to_lowercase()
    }
}
