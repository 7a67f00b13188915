// Filter Operator Implementation
//
// This module implements the filter operator for filtering rows based on predicates.

use crate::query::executor::expression_eval::evaluate_predicate;
use crate::query::executor::operators::{BoxedOperator, Operator};
use crate::query::executor::result::{QueryResult, Row};
use crate::query::parser::ast::Expression;

/// Filter operator that keeps the rows for which the predicate is TRUE
pub struct FilterOperator<'a> {
    /// The input operator
    input: BoxedOperator<'a>,
    /// The predicate to evaluate
    predicate: Expression,
}

impl<'a> FilterOperator<'a> {
    /// Create a new filter operator
    pub fn new(input: BoxedOperator<'a>, predicate: Expression) -> Self {
        FilterOperator { input, predicate }
    }
}

impl Operator for FilterOperator<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        while let Some(row) = self.input.next()? {
            // Rows evaluating to FALSE or NULL are dropped
            if evaluate_predicate(&self.predicate, &row)? {
                return Ok(Some(row));
            }
        }

        Ok(None)
    }

    fn close(&mut self) -> QueryResult<()> {
        self.input.close()
    }
}
