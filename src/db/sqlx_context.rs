//! SQLx data context
//!
//! Persists the model schema's entity collections in SQLite or MySQL. Every
//! save runs inside one transaction; a failing statement rolls back all the
//! changes staged with it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{MySqlPool, Row, SqlitePool, Transaction};
use std::collections::HashMap;
use std::sync::Arc;

use super::context::{
    share, ChangeSet, DataContext, DataContextFactory, EntityRecord, EntityState, SaveResult,
    SharedContext, TrackedEntry,
};
use super::error::StorageError;
use super::pool::DynDatabasePool;
use super::schema::{EntityKind, ModelSchema};
use crate::config::DatabaseDriver;
use crate::models::{Article, Category, CategoryRef, NewsLetter, Subscriber};

/// Data context over a SQLite or MySQL pool
pub struct SqlxDataContext {
    pool: DynDatabasePool,
    schema: Arc<ModelSchema>,
    changes: ChangeSet,
}

impl SqlxDataContext {
    pub fn new(pool: DynDatabasePool, schema: Arc<ModelSchema>) -> Self {
        Self {
            pool,
            schema,
            changes: ChangeSet::new(),
        }
    }

    fn sqlite(&self) -> Result<&SqlitePool, StorageError> {
        self.pool
            .as_sqlite()
            .ok_or_else(|| StorageError::Connection("pool is not a SQLite pool".to_string()))
    }

    fn mysql(&self) -> Result<&MySqlPool, StorageError> {
        self.pool
            .as_mysql()
            .ok_or_else(|| StorageError::Connection("pool is not a MySQL pool".to_string()))
    }
}

#[async_trait]
impl DataContext for SqlxDataContext {
    fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    fn change_set(&self) -> &ChangeSet {
        &self.changes
    }

    fn change_set_mut(&mut self) -> &mut ChangeSet {
        &mut self.changes
    }

    async fn load(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, StorageError> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => load_sqlite(self.sqlite()?, &self.schema, kind).await,
            DatabaseDriver::Mysql => load_mysql(self.mysql()?, &self.schema, kind).await,
        }
    }

    async fn save(&mut self) -> Result<SaveResult, StorageError> {
        if self.changes.is_empty() {
            return Ok(SaveResult::default());
        }

        let entries = self.changes.entries();
        let result = match self.pool.driver() {
            DatabaseDriver::Sqlite => save_sqlite(self.sqlite()?, &self.schema, entries).await,
            DatabaseDriver::Mysql => save_mysql(self.mysql()?, &self.schema, entries).await,
        };

        match result {
            Ok(result) => {
                tracing::debug!(
                    "Saved {} added, {} modified, {} deleted entities",
                    result.added.len(),
                    result.modified,
                    result.deleted
                );
                self.changes.clear();
                Ok(result)
            }
            Err(err) => {
                tracing::warn!("Save rolled back: {}", err);
                Err(err)
            }
        }
    }
}

/// Creates [`SqlxDataContext`]s over one pool
#[derive(Clone)]
pub struct SqlxContextFactory {
    pool: DynDatabasePool,
    schema: Arc<ModelSchema>,
}

impl SqlxContextFactory {
    pub fn new(pool: DynDatabasePool, schema: Arc<ModelSchema>) -> Self {
        Self { pool, schema }
    }

    pub fn context(&self) -> SqlxDataContext {
        SqlxDataContext::new(self.pool.clone(), self.schema.clone())
    }
}

impl DataContextFactory for SqlxContextFactory {
    fn create(&self) -> SharedContext {
        share(self.context())
    }
}

// ============================================================================
// Statements shared by both drivers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    fn new(sql: String, params: Vec<SqlValue>) -> Self {
        Self { sql, params }
    }
}

mod sql {
    use super::*;

    /// Persisted columns of a record, excluding `Id`
    fn columns(record: &EntityRecord) -> Vec<(&'static str, SqlValue)> {
        match record {
            EntityRecord::Article(a) => vec![
                ("Title", SqlValue::Text(a.title.clone())),
                ("Content", SqlValue::Text(a.content.clone())),
                ("DatePublished", SqlValue::Time(a.date_published)),
            ],
            EntityRecord::Category(c) => vec![("Name", SqlValue::Text(c.name.clone()))],
            EntityRecord::Subscriber(s) => vec![
                ("Email", SqlValue::Text(s.email.clone())),
                ("SubscribedAt", SqlValue::Time(s.subscribed_at)),
            ],
            EntityRecord::NewsLetter(n) => vec![
                ("Subject", SqlValue::Text(n.subject.clone())),
                ("Body", SqlValue::Text(n.body.clone())),
                ("SentAt", SqlValue::Time(n.sent_at)),
            ],
        }
    }

    fn column_names(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Article => "Id, Title, Content, DatePublished",
            EntityKind::Category => "Id, Name",
            EntityKind::Subscriber => "Id, Email, SubscribedAt",
            EntityKind::NewsLetter => "Id, Subject, Body, SentAt",
        }
    }

    fn table(schema: &ModelSchema, kind: EntityKind) -> Result<&str, StorageError> {
        schema.table(kind).ok_or(StorageError::UnmappedEntity(kind))
    }

    pub(super) fn select_all(schema: &ModelSchema, kind: EntityKind) -> Result<String, StorageError> {
        Ok(format!(
            "SELECT {} FROM {} ORDER BY Id",
            column_names(kind),
            table(schema, kind)?
        ))
    }

    /// Relation rows for `kind` as (OwnerId, Id[, Name])
    pub(super) fn select_links(schema: &ModelSchema, kind: EntityKind) -> Option<String> {
        let join = schema.join(EntityKind::Article, EntityKind::Category)?;
        let article_key = join.key_for(EntityKind::Article)?;
        let category_key = join.key_for(EntityKind::Category)?;

        match kind {
            EntityKind::Article => {
                let categories = schema.table(EntityKind::Category)?;
                Some(format!(
                    "SELECT j.{ak} AS OwnerId, c.Id AS Id, c.Name AS Name \
                     FROM {jt} j JOIN {ct} c ON c.Id = j.{ck} ORDER BY c.Id",
                    ak = article_key,
                    ck = category_key,
                    jt = join.table,
                    ct = categories,
                ))
            }
            EntityKind::Category => Some(format!(
                "SELECT {ck} AS OwnerId, {ak} AS Id FROM {jt} ORDER BY {ak}",
                ak = article_key,
                ck = category_key,
                jt = join.table,
            )),
            _ => None,
        }
    }

    pub(super) fn insert(schema: &ModelSchema, record: &EntityRecord) -> Result<Statement, StorageError> {
        let table = table(schema, record.kind())?;
        let (names, params): (Vec<&str>, Vec<SqlValue>) = columns(record).into_iter().unzip();
        let placeholders = vec!["?"; names.len()].join(", ");

        Ok(Statement::new(
            format!("INSERT INTO {} ({}) VALUES ({})", table, names.join(", "), placeholders),
            params,
        ))
    }

    pub(super) fn update(schema: &ModelSchema, record: &EntityRecord) -> Result<Vec<Statement>, StorageError> {
        let table = table(schema, record.kind())?;
        let (names, mut params): (Vec<&str>, Vec<SqlValue>) = columns(record).into_iter().unzip();
        let assignments = names
            .iter()
            .map(|name| format!("{} = ?", name))
            .collect::<Vec<_>>()
            .join(", ");
        params.push(SqlValue::Int(record.id()));

        let mut statements = vec![Statement::new(
            format!("UPDATE {} SET {} WHERE Id = ?", table, assignments),
            params,
        )];
        statements.extend(replace_links(schema, record));
        Ok(statements)
    }

    pub(super) fn delete(schema: &ModelSchema, record: &EntityRecord) -> Result<Vec<Statement>, StorageError> {
        let table = table(schema, record.kind())?;
        let mut statements = Vec::new();

        if let Some(join) = schema.join(EntityKind::Article, EntityKind::Category) {
            if let Some(key) = join.key_for(record.kind()) {
                statements.push(Statement::new(
                    format!("DELETE FROM {} WHERE {} = ?", join.table, key),
                    vec![SqlValue::Int(record.id())],
                ));
            }
        }

        statements.push(Statement::new(
            format!("DELETE FROM {} WHERE Id = ?", table),
            vec![SqlValue::Int(record.id())],
        ));
        Ok(statements)
    }

    /// Rewrite an article's category links to match its current categories
    pub(super) fn replace_links(schema: &ModelSchema, record: &EntityRecord) -> Vec<Statement> {
        let EntityRecord::Article(article) = record else {
            return Vec::new();
        };
        let Some(join) = schema.join(EntityKind::Article, EntityKind::Category) else {
            return Vec::new();
        };
        let (Some(article_key), Some(category_key)) = (
            join.key_for(EntityKind::Article),
            join.key_for(EntityKind::Category),
        ) else {
            return Vec::new();
        };

        let mut statements = vec![Statement::new(
            format!("DELETE FROM {} WHERE {} = ?", join.table, article_key),
            vec![SqlValue::Int(article.id)],
        )];
        for category_id in article.category_ids() {
            statements.push(Statement::new(
                format!(
                    "INSERT INTO {} ({}, {}) VALUES (?, ?)",
                    join.table, article_key, category_key
                ),
                vec![SqlValue::Int(article.id), SqlValue::Int(category_id)],
            ));
        }
        statements
    }
}

// ============================================================================
// Row decoding shared by both drivers
// ============================================================================

trait RowValues {
    fn int(&self, column: &str) -> Result<i64, sqlx::Error>;
    fn text(&self, column: &str) -> Result<String, sqlx::Error>;
    fn time(&self, column: &str) -> Result<DateTime<Utc>, sqlx::Error>;
}

impl RowValues for SqliteRow {
    fn int(&self, column: &str) -> Result<i64, sqlx::Error> {
        self.try_get(column)
    }

    fn text(&self, column: &str) -> Result<String, sqlx::Error> {
        self.try_get(column)
    }

    fn time(&self, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
        self.try_get(column)
    }
}

impl RowValues for MySqlRow {
    fn int(&self, column: &str) -> Result<i64, sqlx::Error> {
        self.try_get(column)
    }

    fn text(&self, column: &str) -> Result<String, sqlx::Error> {
        self.try_get(column)
    }

    fn time(&self, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
        self.try_get(column)
    }
}

fn decode_row<R: RowValues>(kind: EntityKind, row: &R) -> Result<EntityRecord, sqlx::Error> {
    let id = row.int("Id")?;
    let record = match kind {
        EntityKind::Article => EntityRecord::Article(Article {
            id,
            title: row.text("Title")?,
            content: row.text("Content")?,
            date_published: row.time("DatePublished")?,
            categories: Vec::new(),
        }),
        EntityKind::Category => EntityRecord::Category(Category {
            id,
            name: row.text("Name")?,
            article_ids: Vec::new(),
        }),
        EntityKind::Subscriber => EntityRecord::Subscriber(Subscriber {
            id,
            email: row.text("Email")?,
            subscribed_at: row.time("SubscribedAt")?,
        }),
        EntityKind::NewsLetter => EntityRecord::NewsLetter(NewsLetter {
            id,
            subject: row.text("Subject")?,
            body: row.text("Body")?,
            sent_at: row.time("SentAt")?,
        }),
    };
    Ok(record)
}

fn decode_records<R: RowValues>(
    kind: EntityKind,
    rows: &[R],
    links: &[R],
) -> Result<Vec<EntityRecord>, StorageError> {
    let decode_err = |e: sqlx::Error| StorageError::Decode {
        entity: kind,
        message: e.to_string(),
    };

    let mut categories: HashMap<i64, Vec<CategoryRef>> = HashMap::new();
    let mut articles: HashMap<i64, Vec<i64>> = HashMap::new();
    for link in links {
        let owner = link.int("OwnerId").map_err(decode_err)?;
        let id = link.int("Id").map_err(decode_err)?;
        match kind {
            EntityKind::Article => {
                let name = link.text("Name").map_err(decode_err)?;
                categories.entry(owner).or_default().push(CategoryRef { id, name });
            }
            _ => articles.entry(owner).or_default().push(id),
        }
    }

    rows.iter()
        .map(|row| -> Result<EntityRecord, StorageError> {
            let record = decode_row(kind, row).map_err(decode_err)?;
            Ok(match record {
                EntityRecord::Article(mut article) => {
                    article.categories = categories.remove(&article.id).unwrap_or_default();
                    EntityRecord::Article(article)
                }
                EntityRecord::Category(mut category) => {
                    category.article_ids = articles.remove(&category.id).unwrap_or_default();
                    EntityRecord::Category(category)
                }
                other => other,
            })
        })
        .collect()
}

// ============================================================================
// SQLite implementations
// ============================================================================

fn bind_sqlite<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Time(v) => query.bind(*v),
        };
    }
    query
}

async fn load_sqlite(
    pool: &SqlitePool,
    schema: &ModelSchema,
    kind: EntityKind,
) -> Result<Vec<EntityRecord>, StorageError> {
    let select = sql::select_all(schema, kind)?;
    let rows = sqlx::query(&select).fetch_all(pool).await?;
    let links = match sql::select_links(schema, kind) {
        Some(select_links) => sqlx::query(&select_links).fetch_all(pool).await?,
        None => Vec::new(),
    };
    decode_records(kind, &rows, &links)
}

async fn save_sqlite(
    pool: &SqlitePool,
    schema: &ModelSchema,
    entries: &[TrackedEntry],
) -> Result<SaveResult, StorageError> {
    let mut tx = pool.begin().await?;
    match write_sqlite(&mut tx, schema, entries).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

async fn write_sqlite(
    tx: &mut Transaction<'_, Sqlite>,
    schema: &ModelSchema,
    entries: &[TrackedEntry],
) -> Result<SaveResult, StorageError> {
    let mut result = SaveResult::default();

    for entry in entries {
        match entry.state {
            EntityState::Added => {
                let insert = sql::insert(schema, &entry.record)?;
                let id = bind_sqlite(sqlx::query(&insert.sql), &insert.params)
                    .execute(&mut **tx)
                    .await?
                    .last_insert_rowid();
                let record = entry.record.clone().with_id(id);
                for stmt in sql::replace_links(schema, &record) {
                    bind_sqlite(sqlx::query(&stmt.sql), &stmt.params)
                        .execute(&mut **tx)
                        .await?;
                }
                result.added.push(record);
            }
            EntityState::Modified => {
                for stmt in sql::update(schema, &entry.record)? {
                    bind_sqlite(sqlx::query(&stmt.sql), &stmt.params)
                        .execute(&mut **tx)
                        .await?;
                }
                result.modified += 1;
            }
            EntityState::Deleted => {
                for stmt in sql::delete(schema, &entry.record)? {
                    bind_sqlite(sqlx::query(&stmt.sql), &stmt.params)
                        .execute(&mut **tx)
                        .await?;
                }
                result.deleted += 1;
            }
        }
    }

    Ok(result)
}

// ============================================================================
// MySQL implementations
// ============================================================================

fn bind_mysql<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &[SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Time(v) => query.bind(*v),
        };
    }
    query
}

async fn load_mysql(
    pool: &MySqlPool,
    schema: &ModelSchema,
    kind: EntityKind,
) -> Result<Vec<EntityRecord>, StorageError> {
    let select = sql::select_all(schema, kind)?;
    let rows = sqlx::query(&select).fetch_all(pool).await?;
    let links = match sql::select_links(schema, kind) {
        Some(select_links) => sqlx::query(&select_links).fetch_all(pool).await?,
        None => Vec::new(),
    };
    decode_records(kind, &rows, &links)
}

async fn save_mysql(
    pool: &MySqlPool,
    schema: &ModelSchema,
    entries: &[TrackedEntry],
) -> Result<SaveResult, StorageError> {
    let mut tx = pool.begin().await?;
    match write_mysql(&mut tx, schema, entries).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

async fn write_mysql(
    tx: &mut Transaction<'_, MySql>,
    schema: &ModelSchema,
    entries: &[TrackedEntry],
) -> Result<SaveResult, StorageError> {
    let mut result = SaveResult::default();

    for entry in entries {
        match entry.state {
            EntityState::Added => {
                let insert = sql::insert(schema, &entry.record)?;
                let id = bind_mysql(sqlx::query(&insert.sql), &insert.params)
                    .execute(&mut **tx)
                    .await?
                    .last_insert_id() as i64;
                let record = entry.record.clone().with_id(id);
                for stmt in sql::replace_links(schema, &record) {
                    bind_mysql(sqlx::query(&stmt.sql), &stmt.params)
                        .execute(&mut **tx)
                        .await?;
                }
                result.added.push(record);
            }
            EntityState::Modified => {
                for stmt in sql::update(schema, &entry.record)? {
                    bind_mysql(sqlx::query(&stmt.sql), &stmt.params)
                        .execute(&mut **tx)
                        .await?;
                }
                result.modified += 1;
            }
            EntityState::Deleted => {
                for stmt in sql::delete(schema, &entry.record)? {
                    bind_mysql(sqlx::query(&stmt.sql), &stmt.params)
                        .execute(&mut **tx)
                        .await?;
                }
                result.deleted += 1;
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::context::DataContextExt;
    use crate::db::{create_test_pool, migrations::run_migrations};
    use chrono::TimeZone;

    async fn setup_context() -> SqlxDataContext {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxDataContext::new(pool, Arc::new(ModelSchema::article_site()))
    }

    fn published(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 3, 14, 9, 30, 0).unwrap()
    }

    async fn add_category(ctx: &mut SqlxDataContext, name: &str) -> Category {
        ctx.add_entity(Category::new(name));
        ctx.save().await.unwrap().added_of::<Category>().remove(0)
    }

    #[test]
    fn test_insert_statement() {
        let schema = ModelSchema::article_site();
        let record = EntityRecord::Category(Category::new("Rust"));

        let stmt = sql::insert(&schema, &record).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO Category (Name) VALUES (?)");
        assert_eq!(stmt.params, vec![SqlValue::Text("Rust".to_string())]);
    }

    #[test]
    fn test_update_article_rewrites_links() {
        let schema = ModelSchema::article_site();
        let mut article = Article::new("Title", "Body", published(2020));
        article.id = 4;
        article.categories = vec![CategoryRef { id: 2, name: "Rust".to_string() }];

        let statements = sql::update(&schema, &EntityRecord::Article(article)).unwrap();
        let sql: Vec<&str> = statements.iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(
            sql,
            vec![
                "UPDATE Article SET Title = ?, Content = ?, DatePublished = ? WHERE Id = ?",
                "DELETE FROM ArticleCategory WHERE Article_Id = ?",
                "INSERT INTO ArticleCategory (Article_Id, Category_Id) VALUES (?, ?)",
            ]
        );
    }

    #[test]
    fn test_unmapped_entity_statement_fails() {
        let schema = ModelSchema::builder().entity(EntityKind::Article).build();
        let record = EntityRecord::Category(Category::new("Rust"));

        assert_eq!(
            sql::insert(&schema, &record),
            Err(StorageError::UnmappedEntity(EntityKind::Category))
        );
    }

    #[tokio::test]
    async fn test_add_and_load_article_with_categories() {
        let mut ctx = setup_context().await;
        let rust = add_category(&mut ctx, "Rust").await;
        let web = add_category(&mut ctx, "Web").await;

        ctx.add_entity(
            Article::new("Ownership", "Borrowing rules", published(2021))
                .with_categories(vec![rust.to_ref(), web.to_ref()]),
        );
        let saved = ctx.save().await.unwrap();
        let article = saved.added_of::<Article>().remove(0);
        assert!(article.id > 0);
        assert!(ctx.change_set().is_empty());

        let articles: Vec<Article> = ctx.collection_of().await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Ownership");
        assert_eq!(articles[0].date_published, published(2021));
        assert_eq!(articles[0].categories, vec![rust.to_ref(), web.to_ref()]);

        let categories: Vec<Category> = ctx.collection_of().await.unwrap();
        assert!(categories.iter().all(|c| c.article_ids == vec![article.id]));
    }

    #[tokio::test]
    async fn test_modify_replaces_links() {
        let mut ctx = setup_context().await;
        let rust = add_category(&mut ctx, "Rust").await;
        let web = add_category(&mut ctx, "Web").await;

        ctx.add_entity(Article::new("Post", "Body", published(2022)).with_categories(vec![rust.to_ref()]));
        let mut article = ctx.save().await.unwrap().added_of::<Article>().remove(0);

        article.title = "Edited".to_string();
        article.categories = vec![web.to_ref()];
        ctx.mark_entity_modified(article);
        let saved = ctx.save().await.unwrap();
        assert_eq!(saved.modified, 1);

        let articles: Vec<Article> = ctx.collection_of().await.unwrap();
        assert_eq!(articles[0].title, "Edited");
        assert_eq!(articles[0].categories, vec![web.to_ref()]);
    }

    #[tokio::test]
    async fn test_delete_category_clears_links() {
        let mut ctx = setup_context().await;
        let rust = add_category(&mut ctx, "Rust").await;
        ctx.add_entity(Article::new("Post", "Body", published(2022)).with_categories(vec![rust.to_ref()]));
        ctx.save().await.unwrap();

        ctx.remove_entity(rust);
        assert_eq!(ctx.save().await.unwrap().deleted, 1);

        let articles: Vec<Article> = ctx.collection_of().await.unwrap();
        assert_eq!(articles.len(), 1);
        assert!(articles[0].categories.is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_everything() {
        let mut ctx = setup_context().await;
        ctx.add_entity(Subscriber::new("reader@example.com", published(2020)));
        ctx.save().await.unwrap();

        ctx.add_entity(Article::new("Not kept", "Body", published(2023)));
        ctx.add_entity(Subscriber::new("reader@example.com", published(2023)));
        let err = ctx.save().await.unwrap_err();

        assert!(matches!(err, StorageError::Constraint(_)));
        assert_eq!(ctx.change_set().len(), 2);
        let articles: Vec<Article> = ctx.collection_of().await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_newsletter_round_trip() {
        let mut ctx = setup_context().await;
        ctx.add_entity(NewsLetter::new("Hello", "First issue", published(2024)));
        ctx.save().await.unwrap();

        let letters: Vec<NewsLetter> = ctx.collection_of().await.unwrap();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].subject, "Hello");
        assert_eq!(letters[0].sent_at, published(2024));
    }

    #[tokio::test]
    async fn test_factory_contexts_share_the_database() {
        let pool = create_test_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let factory = SqlxContextFactory::new(pool, Arc::new(ModelSchema::article_site()));

        let mut writer = factory.context();
        writer.add_entity(Category::new("Shared"));
        writer.save().await.unwrap();

        let reader = factory.create();
        let reader = reader.lock().await;
        let categories: Vec<Category> = reader.collection_of().await.unwrap();
        assert_eq!(categories[0].name, "Shared");
    }
}
