//! Database layer
//!
//! - [`schema`]: which entity types are persisted and in which tables
//! - [`context`]: the unit-of-work abstraction repositories work through
//! - [`sqlx_context`]: data context over SQLite or MySQL
//! - [`memory`]: data context over process memory
//! - [`repositories`]: entity-specific queries and writes
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//!
//! let factory = SqlxContextFactory::new(pool, Arc::new(ModelSchema::article_site()));
//! let articles = DbArticleRepository::new(factory.create());
//! ```

pub mod context;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod schema;
pub mod sqlx_context;

pub use context::{
    share, DataContext, DataContextExt, DataContextFactory, Entity, EntityRecord, SaveResult,
    SharedContext,
};
pub use error::StorageError;
pub use memory::{InMemoryContextFactory, InMemoryDataContext};
pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
pub use schema::{EntityKind, ModelSchema};
pub use sqlx_context::{SqlxContextFactory, SqlxDataContext};
