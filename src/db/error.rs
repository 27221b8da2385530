//! Storage errors
//!
//! Every failure surfaced by a data context or repository is a `StorageError`.
//! Missing rows are not errors: lookups return `None` and collections are empty.

use super::schema::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The store rejected a write (unique, foreign key, not-null or check constraint)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The store could not be reached or the pool is unusable
    #[error("Storage connection failed: {0}")]
    Connection(String),

    /// Any other statement failure
    #[error("Query failed: {0}")]
    Query(String),

    /// A stored row could not be turned into an entity
    #[error("Failed to decode {entity} row: {message}")]
    Decode { entity: EntityKind, message: String },

    /// The entity type is not declared in the model schema
    #[error("Entity type {0} is not mapped in the model schema")]
    UnmappedEntity(EntityKind),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StorageError::Constraint(db_err.message().to_string()),
                _ => StorageError::Query(err.to_string()),
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StorageError::Connection(err.to_string()),
            _ => StorageError::Query(err.to_string()),
        }
    }
}
