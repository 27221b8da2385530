//! In-memory data context
//!
//! Keeps every collection in process memory behind a shared store so several
//! contexts (one per request) observe each other's saved changes. Saves are
//! applied to a copy of the store and swapped in only when every change
//! succeeds, mirroring a transactional commit. The store enforces the same
//! constraints as the SQL schema: unique subscriber emails and join rows that
//! reference existing articles and categories.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use super::context::{
    share, ChangeSet, DataContext, DataContextFactory, EntityRecord, EntityState, SaveResult,
    SharedContext,
};
use super::error::StorageError;
use super::schema::{EntityKind, ModelSchema};
use crate::models::CategoryRef;

/// Backing store shared by in-memory contexts
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: HashMap<EntityKind, BTreeMap<i64, EntityRecord>>,
    next_ids: HashMap<EntityKind, i64>,
    /// (article id, category id)
    article_categories: BTreeSet<(i64, i64)>,
}

impl InMemoryStore {
    fn next_id(&mut self, kind: EntityKind) -> i64 {
        let next = self.next_ids.entry(kind).or_insert(0);
        *next += 1;
        *next
    }

    fn table(&self, kind: EntityKind) -> Option<&BTreeMap<i64, EntityRecord>> {
        self.rows.get(&kind)
    }

    fn contains(&self, kind: EntityKind, id: i64) -> bool {
        self.table(kind).map_or(false, |t| t.contains_key(&id))
    }

    fn check_constraints(&self, record: &EntityRecord) -> Result<(), StorageError> {
        if let EntityRecord::Subscriber(subscriber) = record {
            let duplicate = self
                .table(EntityKind::Subscriber)
                .into_iter()
                .flat_map(|t| t.values())
                .any(|existing| match existing {
                    EntityRecord::Subscriber(other) => {
                        other.id != subscriber.id
                            && other.email.eq_ignore_ascii_case(&subscriber.email)
                    }
                    _ => false,
                });
            if duplicate {
                return Err(StorageError::Constraint(format!(
                    "UNIQUE constraint failed: Subscriber.Email ({})",
                    subscriber.email
                )));
            }
        }
        Ok(())
    }

    /// Store the record's row; relation data is kept only in the join set
    fn write_row(&mut self, record: EntityRecord) {
        let row = match record {
            EntityRecord::Article(mut article) => {
                article.categories.clear();
                EntityRecord::Article(article)
            }
            EntityRecord::Category(mut category) => {
                category.article_ids.clear();
                EntityRecord::Category(category)
            }
            other => other,
        };
        self.rows
            .entry(row.kind())
            .or_default()
            .insert(row.id(), row);
    }

    fn replace_links(&mut self, article_id: i64, categories: &[CategoryRef]) -> Result<(), StorageError> {
        self.article_categories.retain(|(a, _)| *a != article_id);
        for category in categories {
            if !self.contains(EntityKind::Category, category.id) {
                return Err(StorageError::Constraint(format!(
                    "FOREIGN KEY constraint failed: Category {} does not exist",
                    category.id
                )));
            }
            self.article_categories.insert((article_id, category.id));
        }
        Ok(())
    }

    fn apply(
        &mut self,
        schema: &ModelSchema,
        state: EntityState,
        record: EntityRecord,
        result: &mut SaveResult,
    ) -> Result<(), StorageError> {
        let kind = record.kind();
        let links = schema.join(EntityKind::Article, EntityKind::Category).is_some();

        match state {
            EntityState::Added => {
                let id = self.next_id(kind);
                let record = record.with_id(id);
                self.check_constraints(&record)?;
                if let (true, EntityRecord::Article(article)) = (links, &record) {
                    self.replace_links(id, &article.categories)?;
                }
                self.write_row(record.clone());
                result.added.push(record);
            }
            EntityState::Modified => {
                let exists = self.contains(kind, record.id());
                self.check_constraints(&record)?;
                if let (true, EntityRecord::Article(article)) = (links, &record) {
                    if !exists && !article.categories.is_empty() {
                        return Err(StorageError::Constraint(format!(
                            "FOREIGN KEY constraint failed: Article {} does not exist",
                            article.id
                        )));
                    }
                    self.replace_links(article.id, &article.categories)?;
                }
                // An update matching no row writes nothing, as in SQL.
                if exists {
                    self.write_row(record);
                }
                result.modified += 1;
            }
            EntityState::Deleted => {
                let id = record.id();
                match kind {
                    EntityKind::Article => self.article_categories.retain(|(a, _)| *a != id),
                    EntityKind::Category => self.article_categories.retain(|(_, c)| *c != id),
                    _ => {}
                }
                if let Some(table) = self.rows.get_mut(&kind) {
                    table.remove(&id);
                }
                result.deleted += 1;
            }
        }
        Ok(())
    }

    /// Rows of `kind` with their relation side filled from the join set
    fn load(&self, kind: EntityKind, with_links: bool) -> Vec<EntityRecord> {
        let Some(table) = self.table(kind) else {
            return Vec::new();
        };

        table
            .values()
            .cloned()
            .map(|record| match record {
                EntityRecord::Article(mut article) if with_links => {
                    article.categories = self
                        .article_categories
                        .iter()
                        .filter(|(a, _)| *a == article.id)
                        .filter_map(|(_, c)| match self.table(EntityKind::Category)?.get(c)? {
                            EntityRecord::Category(category) => Some(category.to_ref()),
                            _ => None,
                        })
                        .collect();
                    EntityRecord::Article(article)
                }
                EntityRecord::Category(mut category) if with_links => {
                    category.article_ids = self
                        .article_categories
                        .iter()
                        .filter(|(_, c)| *c == category.id)
                        .map(|(a, _)| *a)
                        .collect();
                    EntityRecord::Category(category)
                }
                other => other,
            })
            .collect()
    }
}

/// Data context over an [`InMemoryStore`]
pub struct InMemoryDataContext {
    store: Arc<Mutex<InMemoryStore>>,
    schema: Arc<ModelSchema>,
    changes: ChangeSet,
}

impl InMemoryDataContext {
    /// A context over a fresh, empty store
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self::with_store(Arc::new(Mutex::new(InMemoryStore::default())), schema)
    }

    pub fn with_store(store: Arc<Mutex<InMemoryStore>>, schema: Arc<ModelSchema>) -> Self {
        Self {
            store,
            schema,
            changes: ChangeSet::new(),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryStore>, StorageError> {
        self.store
            .lock()
            .map_err(|_| StorageError::Connection("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl DataContext for InMemoryDataContext {
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
        if !self.schema.is_registered(kind) {
            return Err(StorageError::UnmappedEntity(kind));
        }
        let with_links = self
            .schema
            .join(EntityKind::Article, EntityKind::Category)
            .is_some();
        Ok(self.lock()?.load(kind, with_links))
    }

    async fn save(&mut self) -> Result<SaveResult, StorageError> {
        let mut result = SaveResult::default();
        if self.changes.is_empty() {
            return Ok(result);
        }

        {
            let mut store = self.lock()?;
            let mut staged = store.clone();
            for entry in self.changes.entries() {
                staged.apply(&self.schema, entry.state, entry.record.clone(), &mut result)?;
            }
            *store = staged;
        }

        tracing::debug!(
            "Saved {} added, {} modified, {} deleted entities (in-memory)",
            result.added.len(),
            result.modified,
            result.deleted
        );
        self.changes.clear();
        Ok(result)
    }
}

/// Creates in-memory contexts sharing one store
#[derive(Clone)]
pub struct InMemoryContextFactory {
    store: Arc<Mutex<InMemoryStore>>,
    schema: Arc<ModelSchema>,
}

impl InMemoryContextFactory {
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self {
            store: Arc::new(Mutex::new(InMemoryStore::default())),
            schema,
        }
    }

    /// A standalone context over this factory's store
    pub fn context(&self) -> InMemoryDataContext {
        InMemoryDataContext::with_store(self.store.clone(), self.schema.clone())
    }
}

impl Default for InMemoryContextFactory {
    fn default() -> Self {
        Self::new(Arc::new(ModelSchema::article_site()))
    }
}

impl DataContextFactory for InMemoryContextFactory {
    fn create(&self) -> SharedContext {
        share(self.context())
    }
}
