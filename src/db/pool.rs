//! Database connection pool abstraction
//!
//! One interface over SQLite and MySQL pools. The driver and the connection
//! string both come from [`DatabaseConfig`]; the connection string is looked
//! up by the configured connection name.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlPool, MySqlPoolOptions},
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::sync::Arc;

use crate::config::{DatabaseConfig, DatabaseDriver};

/// Database pool trait that abstracts over different database backends.
#[async_trait]
pub trait DatabasePool: Send + Sync {
    /// Execute a raw SQL statement that doesn't return rows
    async fn execute(&self, query: &str) -> Result<u64>;

    /// Check if the database connection is healthy
    async fn ping(&self) -> Result<()>;

    fn driver(&self) -> DatabaseDriver;

    /// Get the underlying SQLite pool if this is a SQLite connection
    fn as_sqlite(&self) -> Option<&SqlitePool>;

    /// Get the underlying MySQL pool if this is a MySQL connection
    fn as_mysql(&self) -> Option<&MySqlPool>;
}

/// SQLite connection pool implementation
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (creating if needed) a SQLite database
    pub async fn new(url: &str) -> Result<Self> {
        if let Some(parent) = sqlite_file(url).and_then(|path| path.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }

        let connection_url = sqlite_url(url);
        let pool = SqlitePoolOptions::new()
            .max_connections(20)
            .connect(&connection_url)
            .await
            .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .context("Failed to enable foreign keys")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabasePool for SqliteDatabase {
    async fn execute(&self, query: &str) -> Result<u64> {
        let result = sqlx::query(query)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to execute query: {}", query))?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Sqlite
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        Some(&self.pool)
    }

    fn as_mysql(&self) -> Option<&MySqlPool> {
        None
    }
}

/// Database file behind a SQLite connection string; `None` for in-memory databases
fn sqlite_file(url: &str) -> Option<&std::path::Path> {
    if url == ":memory:" || url.starts_with("sqlite::memory:") {
        return None;
    }
    let path = url.trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    Some(std::path::Path::new(path))
}

/// Normalize a connection string to a `sqlite:` URL that creates missing files
///
/// Accepts `:memory:`, a `sqlite:` URL or a plain file path.
fn sqlite_url(url: &str) -> String {
    if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else if url.starts_with("sqlite:") {
        if url.contains('?') || url == "sqlite::memory:" {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else {
        format!("sqlite:{}?mode=rwc", url)
    }
}

/// MySQL connection pool implementation
pub struct MysqlDatabase {
    pool: MySqlPool,
}

impl MysqlDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let connection_url = if url.starts_with("mysql://") {
            url.to_string()
        } else {
            format!("mysql://{}", url)
        };

        let pool = MySqlPoolOptions::new()
            .max_connections(30)
            .connect(&connection_url)
            .await
            .with_context(|| format!("Failed to connect to MySQL database: {}", url))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabasePool for MysqlDatabase {
    async fn execute(&self, query: &str) -> Result<u64> {
        let result = sqlx::query(query)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to execute query: {}", query))?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Mysql
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        None
    }

    fn as_mysql(&self) -> Option<&MySqlPool> {
        Some(&self.pool)
    }
}

/// Type alias for a shared database pool
pub type DynDatabasePool = Arc<dyn DatabasePool>;

/// Create a database connection pool based on configuration.
///
/// Resolves the configured connection name to its connection string and opens
/// the matching SQLite or MySQL pool.
///
/// # Errors
///
/// Returns an error if the connection name has no connection string or the
/// connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DynDatabasePool> {
    let url = config.connection_string()?;
    tracing::debug!(
        "Opening {:?} connection '{}'",
        config.driver,
        config.connection_name
    );

    match config.driver {
        DatabaseDriver::Sqlite => {
            let db = SqliteDatabase::new(url).await?;
            Ok(Arc::new(db))
        }
        DatabaseDriver::Mysql => {
            let db = MysqlDatabase::new(url).await?;
            Ok(Arc::new(db))
        }
    }
}

/// Create a SQLite in-memory database pool for testing
pub async fn create_test_pool() -> Result<DynDatabasePool> {
    let config = DatabaseConfig::with_url(DatabaseDriver::Sqlite, ":memory:");
    create_pool(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONNECTION_NAME;

    #[test]
    fn test_sqlite_url_normalization() {
        assert_eq!(sqlite_url(":memory:"), "sqlite::memory:");
        assert_eq!(sqlite_url("data/site.db"), "sqlite:data/site.db?mode=rwc");
        assert_eq!(sqlite_url("sqlite:site.db?mode=ro"), "sqlite:site.db?mode=ro");
        assert_eq!(sqlite_file("sqlite:data/site.db?mode=rwc"), Some(std::path::Path::new("data/site.db")));
        assert_eq!(sqlite_file(":memory:"), None);
    }

    #[tokio::test]
    async fn test_sqlite_pool_creation() {
        let config = DatabaseConfig::with_url(DatabaseDriver::Sqlite, ":memory:");

        let pool = create_pool(&config).await.expect("Failed to create pool");
        assert_eq!(pool.driver(), DatabaseDriver::Sqlite);
        assert!(pool.as_sqlite().is_some());
        assert!(pool.as_mysql().is_none());
        pool.ping().await.expect("Ping should succeed");
    }

    #[tokio::test]
    async fn test_sqlite_pool_execute() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        pool.execute("CREATE TABLE Probe (Id INTEGER PRIMARY KEY, Name TEXT)")
            .await
            .expect("Failed to create table");

        let affected = pool
            .execute("INSERT INTO Probe (Name) VALUES ('probe')")
            .await
            .expect("Failed to insert");
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn test_sqlite_nested_directory_creation() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("dir").join("site.db");

        let config =
            DatabaseConfig::with_url(DatabaseDriver::Sqlite, db_path.to_string_lossy().to_string());

        let pool = create_pool(&config).await.expect("Failed to create pool");
        pool.ping().await.expect("Ping should succeed");

        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_missing_connection_name_fails() {
        let mut config = DatabaseConfig::with_url(DatabaseDriver::Sqlite, ":memory:");
        config.connection_name = "Elsewhere".to_string();

        let err = create_pool(&config).await.err().expect("should fail");
        assert!(err.to_string().contains("Elsewhere"));
        assert_ne!(config.connection_name, DEFAULT_CONNECTION_NAME);
    }

    #[tokio::test]
    #[ignore = "Requires MySQL server"]
    async fn test_mysql_pool_ping() {
        let url = std::env::var("MYSQL_TEST_URL")
            .unwrap_or_else(|_| "mysql://root@localhost/test".to_string());

        let config = DatabaseConfig::with_url(DatabaseDriver::Mysql, url);

        let pool = create_pool(&config).await.expect("Failed to create pool");
        assert!(pool.as_mysql().is_some());
        pool.ping().await.expect("Ping should succeed");
    }
}
