//! Subscriber repository

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::context::{DataContextExt, SharedContext};
use crate::db::error::StorageError;
use crate::models::Subscriber;

/// Subscriber repository trait
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// All subscribers in subscription order
    async fn all(&self) -> Result<Vec<Subscriber>, StorageError>;

    async fn find(&self, id: i64) -> Result<Option<Subscriber>, StorageError>;

    /// Subscriber with the given address, compared ignoring case
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StorageError>;

    /// Store a new subscriber; an already registered address is a constraint violation
    async fn add(&self, subscriber: Subscriber) -> Result<Subscriber, StorageError>;
}

/// Data-context-backed subscriber repository
pub struct DbSubscriberRepository {
    context: SharedContext,
}

impl DbSubscriberRepository {
    pub fn new(context: SharedContext) -> Self {
        Self { context }
    }

    pub fn boxed(context: SharedContext) -> Arc<dyn SubscriberRepository> {
        Arc::new(Self::new(context))
    }
}

#[async_trait]
impl SubscriberRepository for DbSubscriberRepository {
    async fn all(&self) -> Result<Vec<Subscriber>, StorageError> {
        let ctx = self.context.lock().await;
        let subscribers: Vec<Subscriber> = ctx.collection_of().await?;
        Ok(subscribers)
    }

    async fn find(&self, id: i64) -> Result<Option<Subscriber>, StorageError> {
        super::find_by_id(&self.context, |s: &Subscriber| s.id, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StorageError> {
        let email = email.trim();
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|s| s.email.eq_ignore_ascii_case(email)))
    }

    async fn add(&self, subscriber: Subscriber) -> Result<Subscriber, StorageError> {
        let subscriber = super::insert(&self.context, subscriber).await?;
        tracing::info!("Subscriber added: id={}", subscriber.id);
        Ok(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::context::share;
    use crate::db::migrations::run_migrations;
    use crate::db::schema::ModelSchema;
    use crate::db::sqlx_context::SqlxDataContext;
    use crate::db::create_test_pool;
    use chrono::Utc;

    async fn setup() -> (SharedContext, DbSubscriberRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        let context = share(SqlxDataContext::new(pool, Arc::new(ModelSchema::article_site())));
        (context.clone(), DbSubscriberRepository::new(context))
    }

    #[tokio::test]
    async fn test_add_and_find_by_email() {
        let (_, repo) = setup().await;
        let added = repo.add(Subscriber::new("reader@example.com", Utc::now())).await.unwrap();
        assert!(added.id > 0);

        let found = repo.find_by_email(" Reader@Example.COM ").await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(added.id));
        assert_eq!(repo.find_by_email("other@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_violation() {
        let (context, repo) = setup().await;
        repo.add(Subscriber::new("reader@example.com", Utc::now())).await.unwrap();

        let err = repo
            .add(Subscriber::new("reader@example.com", Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));
        assert_eq!(repo.all().await.unwrap().len(), 1);

        // The rejected insert stays staged until the caller discards it
        context.lock().await.change_set_mut().clear();
    }

    #[tokio::test]
    async fn test_all_in_subscription_order() {
        let (_, repo) = setup().await;
        repo.add(Subscriber::new("b@example.com", Utc::now())).await.unwrap();
        repo.add(Subscriber::new("a@example.com", Utc::now())).await.unwrap();

        let emails: Vec<String> = repo.all().await.unwrap().into_iter().map(|s| s.email).collect();
        assert_eq!(emails, vec!["b@example.com", "a@example.com"]);
    }
}
