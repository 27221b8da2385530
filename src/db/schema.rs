//! Model schema
//!
//! A declaration of how entities map onto storage: which entity types are
//! registered, the table each one lives in, and the join table carrying the
//! Article–Category relation. Building a schema is a pure computation; it never
//! opens a connection or touches a data context.
//!
//! ```ignore
//! let schema = ModelSchema::builder()
//!     .without_pluralized_table_names()
//!     .entity(EntityKind::Article)
//!     .entity(EntityKind::Category)
//!     .many_to_many(EntityKind::Article, EntityKind::Category, "ArticleCategory")
//!     .build();
//! assert_eq!(schema.table(EntityKind::Article), Some("Article"));
//! ```

use serde::Serialize;

/// The entity types the data context knows how to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Article,
    Category,
    Subscriber,
    NewsLetter,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Article,
        EntityKind::Category,
        EntityKind::Subscriber,
        EntityKind::NewsLetter,
    ];

    /// Entity name, also the singular table name
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Article => "Article",
            EntityKind::Category => "Category",
            EntityKind::Subscriber => "Subscriber",
            EntityKind::NewsLetter => "NewsLetter",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How table names are derived from entity names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TableNaming {
    /// `Category` -> `Categories`
    #[default]
    Pluralized,
    /// `Category` -> `Category`
    Singular,
}

impl TableNaming {
    fn table_name(&self, kind: EntityKind) -> String {
        match self {
            TableNaming::Pluralized => pluralize(kind.name()),
            TableNaming::Singular => kind.name().to_string(),
        }
    }
}

fn pluralize(name: &str) -> String {
    match name.strip_suffix('y') {
        Some(stem) => format!("{}ies", stem),
        None => format!("{}s", name),
    }
}

/// Entity to table mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMapping {
    pub kind: EntityKind,
    pub table: String,
}

/// Many-to-many relation stored in a join table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinMapping {
    pub table: String,
    pub left: EntityKind,
    pub left_key: String,
    pub right: EntityKind,
    pub right_key: String,
}

impl JoinMapping {
    /// Foreign key column referencing `kind`, if `kind` takes part in the relation
    pub fn key_for(&self, kind: EntityKind) -> Option<&str> {
        if kind == self.left {
            Some(&self.left_key)
        } else if kind == self.right {
            Some(&self.right_key)
        } else {
            None
        }
    }
}

/// Immutable storage mapping for the data context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    entities: Vec<EntityMapping>,
    joins: Vec<JoinMapping>,
}

impl ModelSchema {
    pub fn builder() -> ModelSchemaBuilder {
        ModelSchemaBuilder::default()
    }

    /// The schema used by the article site
    ///
    /// All four entity types, singular table names, and the `ArticleCategory`
    /// join table.
    pub fn article_site() -> Self {
        Self::builder()
            .without_pluralized_table_names()
            .entity(EntityKind::Article)
            .entity(EntityKind::Category)
            .entity(EntityKind::Subscriber)
            .entity(EntityKind::NewsLetter)
            .many_to_many(EntityKind::Article, EntityKind::Category, "ArticleCategory")
            .build()
    }

    pub fn is_registered(&self, kind: EntityKind) -> bool {
        self.entities.iter().any(|e| e.kind == kind)
    }

    /// Table holding `kind`, if registered
    pub fn table(&self, kind: EntityKind) -> Option<&str> {
        self.entities
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.table.as_str())
    }

    /// Join table between two entity types, in either direction
    pub fn join(&self, a: EntityKind, b: EntityKind) -> Option<&JoinMapping> {
        self.joins
            .iter()
            .find(|j| (j.left == a && j.right == b) || (j.left == b && j.right == a))
    }

    /// Every table the schema declares, entity tables first
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.entities
            .iter()
            .map(|e| e.table.as_str())
            .chain(self.joins.iter().map(|j| j.table.as_str()))
    }

    pub fn entities(&self) -> &[EntityMapping] {
        &self.entities
    }
}

impl Default for ModelSchema {
    fn default() -> Self {
        Self::article_site()
    }
}

/// Builder for [`ModelSchema`]
#[derive(Debug, Default)]
pub struct ModelSchemaBuilder {
    naming: TableNaming,
    entities: Vec<EntityKind>,
    joins: Vec<(EntityKind, EntityKind, String)>,
}

impl ModelSchemaBuilder {
    /// Use entity names as table names
    pub fn without_pluralized_table_names(mut self) -> Self {
        self.naming = TableNaming::Singular;
        self
    }

    /// Register an entity type (registering twice has no effect)
    pub fn entity(mut self, kind: EntityKind) -> Self {
        if !self.entities.contains(&kind) {
            self.entities.push(kind);
        }
        self
    }

    /// Declare a many-to-many relation stored in `table`
    ///
    /// Key columns follow the `<Entity>_Id` convention.
    pub fn many_to_many(mut self, left: EntityKind, right: EntityKind, table: &str) -> Self {
        self.joins.push((left, right, table.to_string()));
        self
    }

    pub fn build(self) -> ModelSchema {
        let naming = self.naming;
        let entities = self
            .entities
            .into_iter()
            .map(|kind| EntityMapping {
                kind,
                table: naming.table_name(kind),
            })
            .collect();
        let joins = self
            .joins
            .into_iter()
            .map(|(left, right, table)| JoinMapping {
                table,
                left,
                left_key: format!("{}_Id", left.name()),
                right,
                right_key: format!("{}_Id", right.name()),
            })
            .collect();

        ModelSchema { entities, joins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_site_tables_are_singular() {
        let schema = ModelSchema::article_site();

        assert_eq!(schema.table(EntityKind::Article), Some("Article"));
        assert_eq!(schema.table(EntityKind::Category), Some("Category"));
        assert_eq!(schema.table(EntityKind::Subscriber), Some("Subscriber"));
        assert_eq!(schema.table(EntityKind::NewsLetter), Some("NewsLetter"));
    }

    #[test]
    fn test_article_site_join_table() {
        let schema = ModelSchema::article_site();
        let join = schema
            .join(EntityKind::Category, EntityKind::Article)
            .expect("join declared");

        assert_eq!(join.table, "ArticleCategory");
        assert_eq!(join.key_for(EntityKind::Article), Some("Article_Id"));
        assert_eq!(join.key_for(EntityKind::Category), Some("Category_Id"));
        assert_eq!(join.key_for(EntityKind::Subscriber), None);
    }

    #[test]
    fn test_default_naming_pluralizes() {
        let schema = ModelSchema::builder()
            .entity(EntityKind::Article)
            .entity(EntityKind::Category)
            .build();

        assert_eq!(schema.table(EntityKind::Article), Some("Articles"));
        assert_eq!(schema.table(EntityKind::Category), Some("Categories"));
    }

    #[test]
    fn test_unregistered_entity() {
        let schema = ModelSchema::builder()
            .without_pluralized_table_names()
            .entity(EntityKind::Article)
            .entity(EntityKind::Article)
            .build();

        assert!(schema.is_registered(EntityKind::Article));
        assert!(!schema.is_registered(EntityKind::Subscriber));
        assert_eq!(schema.table(EntityKind::Subscriber), None);
        assert_eq!(schema.entities().len(), 1);
    }

    #[test]
    fn test_tables_lists_entities_then_joins() {
        let schema = ModelSchema::article_site();
        let tables: Vec<&str> = schema.tables().collect();
        assert_eq!(
            tables,
            vec!["Article", "Category", "Subscriber", "NewsLetter", "ArticleCategory"]
        );
    }
}
