// Query Operators Module
//
// This module defines the operators used for query execution in the
// iterator-based execution model.

pub mod agg;
pub mod filter;
pub mod join;
pub mod limit;
pub mod project;
pub mod scan;
pub mod sort;

use crate::catalog::Table;
use crate::query::executor::result::{QueryResult, Row};
use crate::query::parser::ast::Expression;

/// The Operator trait defines the interface for all query execution operators
/// in the iterator-based execution model. Each operator processes tuples and
/// passes them to the next operator in the execution plan.
///
/// `init` prepares the operator and its inputs, `next` pulls one row at a
/// time until `None`, and `close` releases whatever the operator buffered.
pub trait Operator {
    /// Initialize the operator before execution
    fn init(&mut self) -> QueryResult<()>;

    /// Get the next row of data from this operator
    fn next(&mut self) -> QueryResult<Option<Row>>;

    /// Close the operator and release any resources
    fn close(&mut self) -> QueryResult<()>;
}

/// An operator tree borrowing table data for the lifetime of one query
pub type BoxedOperator<'a> = Box<dyn Operator + 'a>;

/// Drive an operator tree to completion and collect its rows
pub fn collect_rows(operator: &mut dyn Operator) -> QueryResult<Vec<Row>> {
    operator.init()?;
    let mut rows = Vec::new();
    while let Some(row) = operator.next()? {
        rows.push(row);
    }
    operator.close()?;
    Ok(rows)
}

// Factory functions for creating operators
pub fn create_table_scan<'a>(table: &'a Table, qualifier: &str) -> BoxedOperator<'a> {
    Box::new(scan::TableScanOperator::new(table, qualifier))
}

pub fn create_filter<'a>(input: BoxedOperator<'a>, predicate: Expression) -> BoxedOperator<'a> {
    Box::new(filter::FilterOperator::new(input, predicate))
}

pub fn create_projection<'a>(input: BoxedOperator<'a>, columns: Vec<(String, Expression)>) -> BoxedOperator<'a> {
    Box::new(project::ProjectionOperator::new(input, columns))
}

pub fn create_sort<'a>(input: BoxedOperator<'a>, order_by: Vec<(Expression, bool)>) -> BoxedOperator<'a> {
    Box::new(sort::SortOperator::new(input, order_by))
}

pub fn create_limit<'a>(input: BoxedOperator<'a>, limit: Option<u64>, offset: u64) -> BoxedOperator<'a> {
    Box::new(limit::LimitOperator::new(input, limit, offset))
}

pub use agg::create_hash_aggregate;
pub use join::{create_hash_join, create_nested_loop_join};
