//! Newsletter repository

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::context::{DataContextExt, SharedContext};
use crate::db::error::StorageError;
use crate::models::NewsLetter;

/// Newsletter repository trait
#[async_trait]
pub trait NewsLetterRepository: Send + Sync {
    /// All newsletters, most recently sent first
    async fn all(&self) -> Result<Vec<NewsLetter>, StorageError>;

    async fn find(&self, id: i64) -> Result<Option<NewsLetter>, StorageError>;

    async fn add(&self, newsletter: NewsLetter) -> Result<NewsLetter, StorageError>;
}

/// Data-context-backed newsletter repository
pub struct DbNewsLetterRepository {
    context: SharedContext,
}

impl DbNewsLetterRepository {
    pub fn new(context: SharedContext) -> Self {
        Self { context }
    }

    pub fn boxed(context: SharedContext) -> Arc<dyn NewsLetterRepository> {
        Arc::new(Self::new(context))
    }
}

#[async_trait]
impl NewsLetterRepository for DbNewsLetterRepository {
    async fn all(&self) -> Result<Vec<NewsLetter>, StorageError> {
        let ctx = self.context.lock().await;
        let mut newsletters: Vec<NewsLetter> = ctx.collection_of().await?;
        drop(ctx);

        newsletters.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then_with(|| b.id.cmp(&a.id)));
        Ok(newsletters)
    }

    async fn find(&self, id: i64) -> Result<Option<NewsLetter>, StorageError> {
        super::find_by_id(&self.context, |n: &NewsLetter| n.id, id).await
    }

    async fn add(&self, newsletter: NewsLetter) -> Result<NewsLetter, StorageError> {
        let newsletter = super::insert(&self.context, newsletter).await?;
        tracing::info!("Newsletter stored: {} (id={})", newsletter.subject, newsletter.id);
        Ok(newsletter)
    }
}
