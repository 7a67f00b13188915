// Data Definition Language Executor
//
// This module handles execution of DDL statements: CREATE TABLE and
// DROP TABLE. Tables only ever live in the session catalog, so DDL is a
// registry mutation.

use std::collections::HashSet;

use log::{info, warn};

use crate::catalog::{Catalog, Column, Table, TableSource};
use crate::query::executor::result::{QueryError, QueryResult, QueryResultSet};
use crate::query::parser::ast::{CreateStatement, DropStatement};

/// Handles execution of DDL operations
pub struct DdlExecutor<'a> {
    catalog: &'a mut Catalog,
}

impl<'a> DdlExecutor<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        DdlExecutor { catalog }
    }

    pub fn execute_create(&mut self, create: CreateStatement) -> QueryResult<QueryResultSet> {
        if create.if_not_exists && self.catalog.has_table(&create.table_name) {
            info!("Table {} already exists, skipping CREATE", create.table_name);
            return Ok(QueryResultSet::empty());
        }

        let columns = create.columns.iter().map(Column::from_column_def).collect();
        self.create_table(&create.table_name, columns)?;
        Ok(QueryResultSet::empty())
    }

    /// Define a new empty table
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> QueryResult<()> {
        if name.is_empty() {
            return Err(QueryError::InvalidOperation("Table name must not be empty".to_string()));
        }
        check_unique_columns(&columns)?;
        self.catalog.create_table(Table::new(name, columns, TableSource::Created))
    }

    pub fn execute_drop(&mut self, drop: DropStatement) -> QueryResult<QueryResultSet> {
        let registered = match self.catalog.get_table(&drop.table_name) {
            Some(table) => table.is_registered(),
            None if drop.if_exists => return Ok(QueryResultSet::empty()),
            None => return Err(QueryError::TableNotFound(drop.table_name)),
        };

        if registered {
            warn!("Rejected DROP TABLE on registered table {}", drop.table_name);
            return Err(QueryError::InvalidOperation(format!(
                "Table '{}' is a registered frame; unregister it instead",
                drop.table_name
            )));
        }

        self.catalog.drop_table(&drop.table_name)?;
        Ok(QueryResultSet::empty())
    }
}

/// Fail with `DuplicateColumn` if two columns share a name
pub(crate) fn check_unique_columns(columns: &[Column]) -> QueryResult<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.name().is_empty() {
            return Err(QueryError::InvalidOperation("Column name must not be empty".to_string()));
        }
        if !seen.insert(column.name().to_lowercase()) {
            return Err(QueryError::DuplicateColumn(column.name().to_string()));
        }
    }
    Ok(())
}
