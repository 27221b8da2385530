//! Category repository

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::context::{DataContextExt, SharedContext};
use crate::db::error::StorageError;
use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name
    async fn all(&self) -> Result<Vec<Category>, StorageError>;

    async fn find(&self, id: i64) -> Result<Option<Category>, StorageError>;

    /// Categories with the given ids, ordered by name; unknown ids are skipped
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Category>, StorageError>;

    async fn add(&self, category: Category) -> Result<Category, StorageError>;
}

/// Data-context-backed category repository
pub struct DbCategoryRepository {
    context: SharedContext,
}

impl DbCategoryRepository {
    pub fn new(context: SharedContext) -> Self {
        Self { context }
    }

    pub fn boxed(context: SharedContext) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(context))
    }
}

#[async_trait]
impl CategoryRepository for DbCategoryRepository {
    async fn all(&self) -> Result<Vec<Category>, StorageError> {
        let ctx = self.context.lock().await;
        let mut categories: Vec<Category> = ctx.collection_of().await?;
        drop(ctx);

        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(categories)
    }

    async fn find(&self, id: i64) -> Result<Option<Category>, StorageError> {
        super::find_by_id(&self.context, |c: &Category| c.id, id).await
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Category>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|c| ids.contains(&c.id))
            .collect())
    }

    async fn add(&self, category: Category) -> Result<Category, StorageError> {
        let category = super::insert(&self.context, category).await?;
        tracing::info!("Category created: {} (id={})", category.name, category.id);
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::context::share;
    use crate::db::memory::InMemoryDataContext;
    use crate::db::schema::ModelSchema;

    fn repo() -> DbCategoryRepository {
        DbCategoryRepository::new(share(InMemoryDataContext::new(Arc::new(
            ModelSchema::article_site(),
        ))))
    }

    #[tokio::test]
    async fn test_all_is_ordered_by_name() {
        let repo = repo();
        repo.add(Category::new("web")).await.unwrap();
        repo.add(Category::new("Databases")).await.unwrap();
        repo.add(Category::new("Rust")).await.unwrap();

        let names: Vec<String> = repo.all().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Databases", "Rust", "web"]);
    }

    #[tokio::test]
    async fn test_find_many_skips_unknown_ids() {
        let repo = repo();
        let rust = repo.add(Category::new("Rust")).await.unwrap();
        let web = repo.add(Category::new("Web")).await.unwrap();

        let found = repo.find_many(&[web.id, 99, rust.id]).await.unwrap();
        assert_eq!(found, vec![rust, web]);
        assert!(repo.find_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find() {
        let repo = repo();
        let rust = repo.add(Category::new("Rust")).await.unwrap();

        assert_eq!(repo.find(rust.id).await.unwrap(), Some(rust));
        assert_eq!(repo.find(42).await.unwrap(), None);
    }
}
