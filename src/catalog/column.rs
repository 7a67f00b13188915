// Column Management Module
//
// This module defines the Column type that describes one column of a table.

use serde::{Deserialize, Serialize};

use super::schema::DataType;
use crate::query::parser::ast::ColumnDef;

/// Represents a column in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    name: String,
    /// Column data type
    data_type: DataType,
    /// Whether this column can contain NULL values
    nullable: bool,
    /// Whether this column is part of the primary key
    primary_key: bool,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool, primary_key: bool) -> Self {
        Column {
            name: name.into(),
            data_type,
            nullable: nullable && !primary_key,
            primary_key,
        }
    }

    /// A nullable, non-key column
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Column::new(name, data_type, true, false)
    }

    /// Get the column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column data type
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Check if the column can contain NULL values
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Check if the column is part of the primary key
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Whether this column answers to `name` (identifiers are case-insensitive)
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Create a column from a CREATE TABLE column definition
    pub(crate) fn from_column_def(col_def: &ColumnDef) -> Self {
        Column::new(
            col_def.name.clone(),
            col_def.data_type,
            col_def.nullable,
            col_def.primary_key,
        )
    }
}
