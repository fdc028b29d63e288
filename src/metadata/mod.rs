//! Keyspace metadata boundary.
//!
//! The TUI core only talks to the database through [`MetadataSource`]:
//! one call for a schema snapshot and one for the rows behind a selected entity.
//! [`ScyllaSource`] is the production implementation.

mod driver;
mod value;

pub use driver::ScyllaSource;
pub use value::{cql_value_to_json, cql_value_to_text};

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// The five schema-object kinds, in display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Tables,
    Functions,
    Aggregates,
    Views,
    UserTypes,
}

impl Category {
    /// All categories in their fixed priority order.
    pub const ALL: [Self; 5] = [
        Self::Tables,
        Self::Functions,
        Self::Aggregates,
        Self::Views,
        Self::UserTypes,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tables => "Tables",
            Self::Functions => "Functions",
            Self::Aggregates => "Aggregates",
            Self::Views => "Views",
            Self::UserTypes => "UserTypes",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Position in the fixed priority order.
    #[must_use]
    pub const fn priority(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A user-defined type and its field names in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserType {
    pub name: String,
    pub fields: Vec<String>,
}

/// Snapshot of one keyspace's schema objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyspaceMetadata {
    pub keyspace: String,
    pub tables: Vec<String>,
    pub functions: Vec<String>,
    pub aggregates: Vec<String>,
    pub materialized_views: Vec<String>,
    pub user_types: Vec<UserType>,
}

impl KeyspaceMetadata {
    /// Number of objects in the collection backing `category`.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Tables => self.tables.len(),
            Category::Functions => self.functions.len(),
            Category::Aggregates => self.aggregates.len(),
            Category::Views => self.materialized_views.len(),
            Category::UserTypes => self.user_types.len(),
        }
    }

    /// Entity names for `category`.
    pub fn names(&self, category: Category) -> Box<dyn Iterator<Item = &str> + '_> {
        match category {
            Category::Tables => Box::new(self.tables.iter().map(String::as_str)),
            Category::Functions => Box::new(self.functions.iter().map(String::as_str)),
            Category::Aggregates => Box::new(self.aggregates.iter().map(String::as_str)),
            Category::Views => Box::new(self.materialized_views.iter().map(String::as_str)),
            Category::UserTypes => Box::new(self.user_types.iter().map(|t| t.name.as_str())),
        }
    }
}

/// Identifies a concrete schema object whose rows can be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityPath {
    pub category: Category,
    pub name: String,
}

impl EntityPath {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    /// Build from a tree path (`["Tables", "users", ...]`).
    ///
    /// Segments below the entity (e.g. user type fields) resolve to the owning entity.
    #[must_use]
    pub fn from_tree_path(path: &[String]) -> Option<Self> {
        let category = Category::from_label(path.first()?)?;
        let name = path.get(1)?;
        Some(Self::new(category, name.clone()))
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// One (name, raw text) pair shown in the details pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub name: String,
    pub raw: String,
}

impl DetailRow {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
        }
    }
}

/// Read-only access to the keyspace being explored.
///
/// Shared by the scanner and the details pane for the whole process lifetime.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Name of the keyspace this source reads.
    fn keyspace(&self) -> &str;

    /// Fetch a fresh schema snapshot.
    async fn fetch_keyspace_metadata(&self) -> Result<KeyspaceMetadata>;

    /// Fetch the ordered (name, raw text) rows for one entity.
    async fn fetch_rows(&self, entity: &EntityPath) -> Result<Vec<DetailRow>>;
}
