// Data Manipulation Language Executor
//
// This module handles INSERT statements and programmatic row insertion.
// Every row of a batch is validated before any row is appended, so a
// failing batch leaves the table unchanged.

use std::collections::HashSet;

use log::{debug, warn};

use crate::catalog::{Catalog, Table, TypeValidator};
use crate::query::executor::expression_eval::evaluate_expression;
use crate::query::executor::result::{DataValue, QueryError, QueryResult, QueryResultSet, Row};
use crate::query::parser::ast::InsertStatement;

/// Handles execution of DML operations
pub struct DmlExecutor<'a> {
    catalog: &'a mut Catalog,
}

impl<'a> DmlExecutor<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        DmlExecutor { catalog }
    }

    pub fn execute_insert(&mut self, insert: InsertStatement) -> QueryResult<QueryResultSet> {
        let table = self.catalog.table(&insert.table_name)?;

        // Map each value position to a schema column
        let positions = match &insert.columns {
            Some(columns) => column_positions(table, columns)?,
            None => (0..table.columns().len()).collect(),
        };

        // VALUES expressions are evaluated without any row in scope
        let empty = Row::new();
        let mut rows = Vec::with_capacity(insert.values.len());
        for tuple in &insert.values {
            if tuple.len() != positions.len() {
                return Err(QueryError::ArityMismatch(format!(
                    "INSERT has {} values, but {} columns were expected",
                    tuple.len(),
                    positions.len()
                )));
            }

            let mut row = vec![DataValue::Null; table.columns().len()];
            for (expr, &position) in tuple.iter().zip(&positions) {
                row[position] = evaluate_expression(expr, &empty)?;
            }
            rows.push(row);
        }

        let count = self.insert_rows(&insert.table_name, rows)?;
        Ok(QueryResultSet::affected_rows(count))
    }

    /// Append literal rows (one value per column, schema order) to a table
    pub fn insert_rows(&mut self, table_name: &str, rows: Vec<Vec<DataValue>>) -> QueryResult<usize> {
        let table = self.catalog.table_mut(table_name)?;
        if table.is_registered() {
            warn!("Rejected insert into registered table {}", table.name());
            return Err(QueryError::InvalidOperation(format!(
                "Table '{}' is a registered frame and cannot be modified",
                table.name()
            )));
        }

        let validated = TypeValidator::validate_batch(rows, table)?;
        let count = validated.len();
        table.append_rows(validated);
        debug!("Inserted {} rows into {}", count, table.name());
        Ok(count)
    }
}

/// Schema positions of an INSERT column list
fn column_positions(table: &Table, columns: &[String]) -> QueryResult<Vec<usize>> {
    let mut seen = HashSet::new();
    columns
        .iter()
        .map(|name| {
            let position = table
                .column_index(name)
                .ok_or_else(|| QueryError::ColumnNotFound(format!("{}.{}", table.name(), name)))?;
            if !seen.insert(position) {
                return Err(QueryError::DuplicateColumn(name.clone()));
            }
            Ok(position)
        })
        .collect()
}
