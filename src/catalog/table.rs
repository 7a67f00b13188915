//! Table Management Module
//!
//! This module defines the Table type: a named schema together with the rows
//! it holds. Tables live entirely in memory for the lifetime of a session.

use serde::{Deserialize, Serialize};

use super::column::Column;
use crate::query::executor::result::DataValue;

/// Where a table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableSource {
    /// Registered from a caller-owned frame; read-only to SQL
    Registered,
    /// Defined through CREATE TABLE or `Session::create_table`
    Created,
}

/// Represents an in-memory table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    name: String,
    /// Columns in the table
    columns: Vec<Column>,
    /// Row data, one value per column
    rows: Vec<Vec<DataValue>>,
    /// How the table entered the catalog
    source: TableSource,
}

impl Table {
    /// Create a new empty table with the given name and columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>, source: TableSource) -> Self {
        Table {
            name: name.into(),
            columns,
            rows: Vec::new(),
            source,
        }
    }

    /// Create a table that already holds rows.
    /// Callers are responsible for the rows matching the schema.
    pub(crate) fn with_rows(
        name: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Vec<DataValue>>,
        source: TableSource,
    ) -> Self {
        Table {
            name: name.into(),
            columns,
            rows,
            source,
        }
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.matches(name))
    }

    /// Check if the table has a column with the given name
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Get the column index for a column name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches(name))
    }

    /// Indices of the primary key columns
    pub fn primary_key_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key())
            .map(|(i, _)| i)
            .collect()
    }

    /// All rows in insertion order
    pub fn rows(&self) -> &[Vec<DataValue>] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn source(&self) -> TableSource {
        self.source
    }

    pub fn is_registered(&self) -> bool {
        self.source == TableSource::Registered
    }

    /// Append already-validated rows
    pub(crate) fn append_rows(&mut self, rows: Vec<Vec<DataValue>>) {
        self.rows.extend(rows);
    }
}
