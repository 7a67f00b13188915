// Table Scan Operator
//
// This module implements the sequential scan over an in-memory table.
// Every emitted row is keyed by `qualifier.column`, where the qualifier
// is the table alias (or the table name when no alias was given).

use crate::catalog::Table;
use crate::query::executor::operators::Operator;
use crate::query::executor::result::{QueryResult, Row};

/// A table scan operator that scans all tuples in a table
pub struct TableScanOperator<'a> {
    /// Table being scanned
    table: &'a Table,
    /// Row keys, one per column in schema order
    keys: Vec<String>,
    /// Index of the next row to emit
    position: usize,
}

impl<'a> TableScanOperator<'a> {
    /// Create a new table scan operator
    pub fn new(table: &'a Table, qualifier: &str) -> Self {
        let keys = table
            .columns()
            .iter()
            .map(|col| format!("{}.{}", qualifier, col.name()))
            .collect();

        TableScanOperator {
            table,
            keys,
            position: 0,
        }
    }

    /// Keys of the rows produced by this scan
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl Operator for TableScanOperator<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.position = 0;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        let Some(values) = self.table.rows().get(self.position) else {
            return Ok(None);
        };
        self.position += 1;

        Ok(Some(Row::from_values(self.keys.clone(), values.clone())))
    }

    fn close(&mut self) -> QueryResult<()> {
        self.position = self.table.row_count();
        Ok(())
    }
}
