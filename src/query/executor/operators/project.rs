// Projection Operator Implementation
//
// This module implements the projection operator. Each output column is a
// (name, expression) pair evaluated against the input row.

use crate::query::executor::expression_eval::evaluate_expression;
use crate::query::executor::operators::{BoxedOperator, Operator};
use crate::query::executor::result::{QueryResult, Row};
use crate::query::parser::ast::Expression;

/// Projection operator that computes the output columns of a query
pub struct ProjectionOperator<'a> {
    /// The input operator
    input: BoxedOperator<'a>,
    /// Output column names and the expressions producing them
    columns: Vec<(String, Expression)>,
}

impl<'a> ProjectionOperator<'a> {
    /// Create a new projection operator
    pub fn new(input: BoxedOperator<'a>, columns: Vec<(String, Expression)>) -> Self {
        ProjectionOperator { input, columns }
    }
}

impl Operator for ProjectionOperator<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.input.init()
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        let Some(input_row) = self.input.next()? else {
            return Ok(None);
        };

        let mut output = Row::new();
        for (name, expr) in &self.columns {
            output.set(name.clone(), evaluate_expression(expr, &input_row)?);
        }

        Ok(Some(output))
    }

    fn close(&mut self) -> QueryResult<()> {
        self.input.close()
    }
}
