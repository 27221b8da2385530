//! Article repository
//!
//! Queries and writes for articles over a shared data context.
//!
//! - `ArticleRepository` trait defining the interface for article data access
//! - `DbArticleRepository` implementing it over any [`DataContext`](crate::db::DataContext)

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::context::{DataContextExt, SharedContext};
use crate::db::error::StorageError;
use crate::models::{Article, YearGroup};

/// Search term that selects every article
pub const DEFAULT_SEARCH_TERM: &str = "default";

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// All articles, newest first (ties broken by id, highest first)
    async fn all(&self) -> Result<Vec<Article>, StorageError>;

    /// Article by id; `None` when it does not exist
    async fn find(&self, id: i64) -> Result<Option<Article>, StorageError>;

    /// Store a new article and return it with its assigned id
    async fn add(&self, article: Article) -> Result<Article, StorageError>;

    /// Persist the article's current values, including its categories
    async fn update(&self, article: Article) -> Result<(), StorageError>;

    async fn delete(&self, article: Article) -> Result<(), StorageError>;

    /// Articles in the category named `search_term`, in `all()` order
    ///
    /// [`DEFAULT_SEARCH_TERM`] returns every article. Names match ignoring case
    /// and surrounding whitespace.
    async fn articles_by_category(&self, search_term: &str) -> Result<Vec<Article>, StorageError>;

    /// Articles bucketed by publication year, most recent year first
    async fn articles_grouped_by_year(&self) -> Result<Vec<YearGroup>, StorageError>;
}

/// Data-context-backed article repository
pub struct DbArticleRepository {
    context: SharedContext,
}

impl DbArticleRepository {
    pub fn new(context: SharedContext) -> Self {
        Self { context }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(context: SharedContext) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(context))
    }
}

/// Newest first; equal dates fall back to the higher id
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.date_published
            .cmp(&a.date_published)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Bucket already-sorted articles by year, most recent year first
pub fn group_by_year(articles: Vec<Article>) -> Vec<YearGroup> {
    let mut years: BTreeMap<i32, Vec<Article>> = BTreeMap::new();
    for article in articles {
        years.entry(article.year()).or_default().push(article);
    }

    years
        .into_iter()
        .rev()
        .map(|(year, articles)| YearGroup { year, articles })
        .collect()
}

#[async_trait]
impl ArticleRepository for DbArticleRepository {
    async fn all(&self) -> Result<Vec<Article>, StorageError> {
        let ctx = self.context.lock().await;
        let mut articles: Vec<Article> = ctx.collection_of().await?;
        drop(ctx);

        sort_newest_first(&mut articles);
        Ok(articles)
    }

    async fn find(&self, id: i64) -> Result<Option<Article>, StorageError> {
        super::find_by_id(&self.context, |a: &Article| a.id, id).await
    }

    async fn add(&self, article: Article) -> Result<Article, StorageError> {
        let article = super::insert(&self.context, article).await?;
        tracing::info!("Article created: {} (id={})", article.title, article.id);
        Ok(article)
    }

    async fn update(&self, article: Article) -> Result<(), StorageError> {
        let id = article.id;
        let mut ctx = self.context.lock().await;
        ctx.mark_entity_modified(article);
        ctx.save().await?;
        tracing::info!("Article updated: id={}", id);
        Ok(())
    }

    async fn delete(&self, article: Article) -> Result<(), StorageError> {
        let id = article.id;
        let mut ctx = self.context.lock().await;
        ctx.remove_entity(article);
        ctx.save().await?;
        tracing::info!("Article deleted: id={}", id);
        Ok(())
    }

    async fn articles_by_category(&self, search_term: &str) -> Result<Vec<Article>, StorageError> {
        let articles = self.all().await?;
        if search_term == DEFAULT_SEARCH_TERM {
            return Ok(articles);
        }

        Ok(articles
            .into_iter()
            .filter(|a| a.has_category(search_term))
            .collect())
    }

    async fn articles_grouped_by_year(&self) -> Result<Vec<YearGroup>, StorageError> {
        Ok(group_by_year(self.all().await?))
    }
}
