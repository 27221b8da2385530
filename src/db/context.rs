//! Data context
//!
//! The unit of work between repositories and storage. A data context exposes
//! the persisted collection of each entity type, tracks staged changes
//! (added / modified / deleted) and commits them atomically on `save`.
//!
//! Each request gets its own context. Repositories serving the same request
//! share it through a [`SharedContext`].
//!
//! Implementations:
//! - [`SqlxDataContext`](super::sqlx_context::SqlxDataContext) for SQLite and MySQL
//! - [`InMemoryDataContext`](super::memory::InMemoryDataContext) for tests and demos

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::error::StorageError;
use super::schema::{EntityKind, ModelSchema};
use crate::models::{Article, Category, NewsLetter, Subscriber};

/// Any persisted entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    Article(Article),
    Category(Category),
    Subscriber(Subscriber),
    NewsLetter(NewsLetter),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Article(_) => EntityKind::Article,
            EntityRecord::Category(_) => EntityKind::Category,
            EntityRecord::Subscriber(_) => EntityKind::Subscriber,
            EntityRecord::NewsLetter(_) => EntityKind::NewsLetter,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            EntityRecord::Article(e) => e.id,
            EntityRecord::Category(e) => e.id,
            EntityRecord::Subscriber(e) => e.id,
            EntityRecord::NewsLetter(e) => e.id,
        }
    }

    /// The same record carrying a storage-assigned id
    pub fn with_id(mut self, id: i64) -> Self {
        match &mut self {
            EntityRecord::Article(e) => e.id = id,
            EntityRecord::Category(e) => e.id = id,
            EntityRecord::Subscriber(e) => e.id = id,
            EntityRecord::NewsLetter(e) => e.id = id,
        }
        self
    }
}

/// Typed access to [`EntityRecord`]
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn into_record(self) -> EntityRecord;

    fn from_record(record: EntityRecord) -> Option<Self>;
}

macro_rules! impl_entity {
    ($ty:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn into_record(self) -> EntityRecord {
                EntityRecord::$ty(self)
            }

            fn from_record(record: EntityRecord) -> Option<Self> {
                match record {
                    EntityRecord::$ty(entity) => Some(entity),
                    _ => None,
                }
            }
        }
    };
}

impl_entity!(Article);
impl_entity!(Category);
impl_entity!(Subscriber);
impl_entity!(NewsLetter);

/// Tracking state of a staged entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntry {
    pub state: EntityState,
    pub record: EntityRecord,
}

/// Changes staged since the last successful save, in staging order
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    entries: Vec<TrackedEntry>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a change
    ///
    /// A persisted entity (non-zero id) is tracked at most once: a later
    /// change replaces the earlier one, and deleting an entity staged as added
    /// in this change set drops it entirely. Unsaved entities (id 0) are always
    /// appended.
    pub fn track(&mut self, state: EntityState, record: EntityRecord) {
        let (kind, id) = (record.kind(), record.id());

        if id != 0 {
            if let Some(pos) = self
                .entries
                .iter()
                .position(|e| e.record.kind() == kind && e.record.id() == id)
            {
                match (self.entries[pos].state, state) {
                    (EntityState::Added, EntityState::Deleted) => {
                        self.entries.remove(pos);
                    }
                    (EntityState::Added, _) => self.entries[pos].record = record,
                    (_, state) => self.entries[pos] = TrackedEntry { state, record },
                }
                return;
            }
        }

        self.entries.push(TrackedEntry { state, record });
    }

    pub fn entries(&self) -> &[TrackedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in `state`
    pub fn count(&self, state: EntityState) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Outcome of a successful save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveResult {
    /// Inserted entities with their assigned ids, in staging order
    pub added: Vec<EntityRecord>,
    pub modified: usize,
    pub deleted: usize,
}

impl SaveResult {
    /// Inserted entities of type `T`
    pub fn added_of<T: Entity>(&self) -> Vec<T> {
        self.added
            .iter()
            .cloned()
            .filter_map(T::from_record)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.modified + self.deleted
    }
}

/// Unit of work over persisted entity collections
#[async_trait]
pub trait DataContext: Send + Sync {
    /// Mapping this context persists through
    fn schema(&self) -> &ModelSchema;

    /// Changes staged since the last successful save
    fn change_set(&self) -> &ChangeSet;

    fn change_set_mut(&mut self) -> &mut ChangeSet;

    /// All stored entities of `kind`, ordered by id
    ///
    /// Staged changes are not visible until saved.
    async fn load(&self, kind: EntityKind) -> Result<Vec<EntityRecord>, StorageError>;

    /// Commit every staged change in one transaction
    ///
    /// On success the change set is cleared. On failure nothing is written and
    /// the change set is kept.
    async fn save(&mut self) -> Result<SaveResult, StorageError>;

    /// Stage an insertion
    fn add(&mut self, record: EntityRecord) {
        self.track(EntityState::Added, record);
    }

    /// Stage a deletion
    fn remove(&mut self, record: EntityRecord) {
        self.track(EntityState::Deleted, record);
    }

    /// Flag a detached entity as dirty so the next save writes its current values
    fn mark_modified(&mut self, record: EntityRecord) {
        self.track(EntityState::Modified, record);
    }

    /// Stage a change; entities whose type the schema does not register are ignored
    fn track(&mut self, state: EntityState, record: EntityRecord) {
        let kind = record.kind();
        if !self.schema().is_registered(kind) {
            tracing::debug!("Ignoring {:?} {} entity: type is not mapped", state, kind);
            return;
        }
        self.change_set_mut().track(state, record);
    }
}

/// Typed helpers over [`DataContext`]
#[async_trait]
pub trait DataContextExt: DataContext {
    /// All stored entities of type `T`, ordered by id
    async fn collection_of<T: Entity>(&self) -> Result<Vec<T>, StorageError> {
        let records = self.load(T::KIND).await?;
        Ok(records.into_iter().filter_map(T::from_record).collect())
    }

    fn add_entity<T: Entity>(&mut self, entity: T) {
        self.add(entity.into_record());
    }

    fn remove_entity<T: Entity>(&mut self, entity: T) {
        self.remove(entity.into_record());
    }

    fn mark_entity_modified<T: Entity>(&mut self, entity: T) {
        self.mark_modified(entity.into_record());
    }
}

impl<C: DataContext + ?Sized> DataContextExt for C {}

/// A data context shared by the repositories of one request
pub type SharedContext = Arc<Mutex<Box<dyn DataContext>>>;

/// Wrap a context for sharing between repositories
pub fn share<C: DataContext + 'static>(context: C) -> SharedContext {
    Arc::new(Mutex::new(Box::new(context)))
}

/// Creates one data context per unit of work
pub trait DataContextFactory: Send + Sync {
    fn create(&self) -> SharedContext;
}
