//! Catalog Management Module
//!
//! This module manages the session registry: every table a session knows
//! about, whether registered from a frame or created through DDL.

pub mod column;
pub mod schema;
pub mod table;
pub mod validation;

// Re-export key types
pub use self::column::Column;
pub use self::schema::DataType;
pub use self::table::{Table, TableSource};
pub use self::validation::{TypeValidator, ValidationError, ValidationResult};

use linked_hash_map::LinkedHashMap;
use log::info;

use crate::query::executor::result::{QueryError, QueryResult};

/// What to do when a registration reuses a name that is already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Fail with `TableAlreadyExists`
    #[default]
    Reject,
    /// Replace a previously registered table; created tables still conflict
    Replace,
}

/// The Catalog maps table names to tables.
///
/// Names are matched case-insensitively and listed in the order they were
/// first added.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: LinkedHashMap<String, Table>,
}

fn registry_key(name: &str) -> String {
    name.to_lowercase()
}

impl Catalog {
    /// Create a new, empty catalog
    pub fn new() -> Self {
        Catalog {
            tables: LinkedHashMap::new(),
        }
    }

    /// Check if a table exists
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(&registry_key(name))
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&registry_key(name))
    }

    /// Get a table by name, failing with `TableNotFound`
    pub fn table(&self, name: &str) -> QueryResult<&Table> {
        self.get_table(name)
            .ok_or_else(|| QueryError::TableNotFound(name.to_string()))
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> QueryResult<&mut Table> {
        self.tables
            .get_mut(&registry_key(name))
            .ok_or_else(|| QueryError::TableNotFound(name.to_string()))
    }

    /// Add a newly created table. Any existing table of that name conflicts.
    pub fn create_table(&mut self, table: Table) -> QueryResult<()> {
        let key = registry_key(table.name());
        if self.tables.contains_key(&key) {
            return Err(QueryError::TableAlreadyExists(table.name().to_string()));
        }
        info!("Created table {} with {} columns", table.name(), table.columns().len());
        self.tables.insert(key, table);
        Ok(())
    }

    /// Add a registered table, resolving name conflicts with `policy`.
    /// Returns the table that was replaced, if any.
    pub fn register_table(&mut self, table: Table, policy: ConflictPolicy) -> QueryResult<Option<Table>> {
        let key = registry_key(table.name());
        if let Some(existing) = self.tables.get(&key) {
            if policy == ConflictPolicy::Reject || !existing.is_registered() {
                return Err(QueryError::TableAlreadyExists(table.name().to_string()));
            }
        }
        info!("Registered table {} ({} rows)", table.name(), table.row_count());
        Ok(self.tables.insert(key, table))
    }

    /// Remove a table and return it
    pub fn drop_table(&mut self, name: &str) -> QueryResult<Table> {
        let table = self
            .tables
            .remove(&registry_key(name))
            .ok_or_else(|| QueryError::TableNotFound(name.to_string()))?;
        info!("Dropped table {}", table.name());
        Ok(table)
    }

    /// Table names in the order they were added
    pub fn table_names(&self) -> Vec<String> {
        self.tables.values().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
