//! Database repositories
//!
//! Each repository works through a [`SharedContext`]; repositories created
//! from the same context take part in the same unit of work.

pub mod article;
pub mod category;
pub mod newsletter;
pub mod subscriber;

pub use article::{ArticleRepository, DbArticleRepository, DEFAULT_SEARCH_TERM};
pub use category::{CategoryRepository, DbCategoryRepository};
pub use newsletter::{DbNewsLetterRepository, NewsLetterRepository};
pub use subscriber::{DbSubscriberRepository, SubscriberRepository};

use super::context::{DataContextExt, Entity, SharedContext};
use super::error::StorageError;

/// Stage `entity` for insertion, commit, and return it with its assigned id
pub(crate) async fn insert<T: Entity>(context: &SharedContext, entity: T) -> Result<T, StorageError> {
    let mut ctx = context.lock().await;
    ctx.add_entity(entity);
    let saved = ctx.save().await?;
    saved
        .added_of::<T>()
        .into_iter()
        .last()
        .ok_or(StorageError::UnmappedEntity(T::KIND))
}

/// Stored entity of type `T` with the given id
pub(crate) async fn find_by_id<T, F>(context: &SharedContext, id_of: F, id: i64) -> Result<Option<T>, StorageError>
where
    T: Entity,
    F: Fn(&T) -> i64,
{
    let ctx = context.lock().await;
    let entities: Vec<T> = ctx.collection_of().await?;
    Ok(entities.into_iter().find(|e| id_of(e) == id))
}
