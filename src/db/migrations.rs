//! Database migrations
//!
//! Migrations are embedded in the binary as SQL strings, one variant per
//! supported driver, and tracked in the `_migrations` table.
//!
//! ```ignore
//! let pool = create_pool(&config.database).await?;
//! migrations::run_migrations(&pool).await?;
//! ```
//!
//! Table and column names follow the model schema: singular PascalCase tables
//! and the `ArticleCategory` join table keyed by `Article_Id` / `Category_Id`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    pub name: &'static str,
    pub up_sqlite: &'static str,
    pub up_mysql: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_article",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS Article (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                Title VARCHAR(255) NOT NULL,
                Content TEXT NOT NULL,
                DatePublished TIMESTAMP NOT NULL
            );
            CREATE INDEX IF NOT EXISTS IX_Article_DatePublished ON Article(DatePublished);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS Article (
                Id BIGINT PRIMARY KEY AUTO_INCREMENT,
                Title VARCHAR(255) NOT NULL,
                Content LONGTEXT NOT NULL,
                DatePublished DATETIME(6) NOT NULL,
                INDEX IX_Article_DatePublished (DatePublished)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
        "#,
    },
    Migration {
        version: 2,
        name: "create_category",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS Category (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                Name VARCHAR(100) NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS Category (
                Id BIGINT PRIMARY KEY AUTO_INCREMENT,
                Name VARCHAR(100) NOT NULL
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
        "#,
    },
    Migration {
        version: 3,
        name: "create_article_category",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS ArticleCategory (
                Article_Id INTEGER NOT NULL,
                Category_Id INTEGER NOT NULL,
                PRIMARY KEY (Article_Id, Category_Id),
                FOREIGN KEY (Article_Id) REFERENCES Article(Id) ON DELETE CASCADE,
                FOREIGN KEY (Category_Id) REFERENCES Category(Id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS IX_ArticleCategory_Category_Id ON ArticleCategory(Category_Id);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS ArticleCategory (
                Article_Id BIGINT NOT NULL,
                Category_Id BIGINT NOT NULL,
                PRIMARY KEY (Article_Id, Category_Id),
                INDEX IX_ArticleCategory_Category_Id (Category_Id),
                FOREIGN KEY (Article_Id) REFERENCES Article(Id) ON DELETE CASCADE,
                FOREIGN KEY (Category_Id) REFERENCES Category(Id) ON DELETE CASCADE
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
        "#,
    },
    Migration {
        version: 4,
        name: "create_subscriber",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS Subscriber (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                Email VARCHAR(255) NOT NULL UNIQUE COLLATE NOCASE,
                SubscribedAt TIMESTAMP NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS Subscriber (
                Id BIGINT PRIMARY KEY AUTO_INCREMENT,
                Email VARCHAR(255) NOT NULL UNIQUE,
                SubscribedAt DATETIME(6) NOT NULL
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
        "#,
    },
    Migration {
        version: 5,
        name: "create_newsletter",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS NewsLetter (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                Subject VARCHAR(255) NOT NULL,
                Body TEXT NOT NULL,
                SentAt TIMESTAMP NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS NewsLetter (
                Id BIGINT PRIMARY KEY AUTO_INCREMENT,
                Subject VARCHAR(255) NOT NULL,
                Body LONGTEXT NOT NULL,
                SentAt DATETIME(6) NOT NULL
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci
        "#,
    },
];

/// Apply every pending migration in version order
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let pending = pending_migrations(&applied);

    for migration in &pending {
        tracing::info!(
            "Applying migration {}: {}",
            migration.version,
            migration.name
        );
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
    }

    if pending.is_empty() {
        tracing::debug!("No pending migrations");
    } else {
        tracing::info!("Applied {} migration(s)", pending.len());
    }

    Ok(pending.len())
}

/// Migrations not yet recorded in `applied`, in version order
fn pending_migrations(applied: &[MigrationRecord]) -> Vec<&'static Migration> {
    MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|r| r.version == m.version as i64))
        .collect()
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

fn sqlite_pool(pool: &DynDatabasePool) -> Result<&SqlitePool> {
    pool.as_sqlite().context("Pool is not a SQLite pool")
}

fn mysql_pool(pool: &DynDatabasePool) -> Result<&MySqlPool> {
    pool.as_mysql().context("Pool is not a MySQL pool")
}

async fn get_applied_migrations(pool: &DynDatabasePool) -> Result<Vec<MigrationRecord>> {
    match pool.driver() {
        DatabaseDriver::Sqlite => get_applied_migrations_sqlite(sqlite_pool(pool)?).await,
        DatabaseDriver::Mysql => get_applied_migrations_mysql(mysql_pool(pool)?).await,
    }
}

async fn get_applied_migrations_sqlite(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.try_get("version")?,
            name: row.try_get("name")?,
            applied_at: row.try_get("applied_at")?,
        });
    }

    Ok(records)
}

async fn get_applied_migrations_mysql(pool: &MySqlPool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        let version: i32 = row.try_get("version")?;
        records.push(MigrationRecord {
            version: version as i64,
            name: row.try_get("name")?,
            applied_at: row.try_get("applied_at")?,
        });
    }

    Ok(records)
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match pool.driver() {
        DatabaseDriver::Sqlite => apply_migration_sqlite(sqlite_pool(pool)?, migration).await,
        DatabaseDriver::Mysql => apply_migration_mysql(mysql_pool(pool)?, migration).await,
    }
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_sqlite) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_mysql) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Truncate SQL for error messages
fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split SQL into individual statements, dropping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}
