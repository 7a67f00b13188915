// Nested Loop Join Implementation
//
// This file implements the nested loop join algorithm, the fallback for
// join conditions that are not equalities and for cross joins.

use super::pad_with_nulls;
use crate::query::executor::expression_eval::evaluate_predicate;
use crate::query::executor::operators::{BoxedOperator, Operator};
use crate::query::executor::result::{QueryResult, Row};
use crate::query::parser::ast::Expression;

/// Nested Loop Join operator implementation
pub struct NestedLoopJoin<'a> {
    /// Left input operator (outer loop)
    left: BoxedOperator<'a>,
    /// Right input operator (inner loop, materialized once)
    right: BoxedOperator<'a>,
    /// Join condition; None joins every pair
    condition: Option<Expression>,
    /// Indicates if this is a LEFT OUTER JOIN
    is_left_join: bool,
    /// Right row keys, padded with NULL when a left row has no match
    right_columns: Vec<String>,
    /// Materialized right input
    right_rows: Option<Vec<Row>>,
    /// Current left row
    current_left_row: Option<Row>,
    /// Position in right_rows for the current left row
    right_index: usize,
    /// Whether the current left row produced any output
    current_matched: bool,
}

impl<'a> NestedLoopJoin<'a> {
    /// Create a new nested loop join operator
    pub fn new(
        left: BoxedOperator<'a>,
        right: BoxedOperator<'a>,
        condition: Option<Expression>,
        is_left_join: bool,
        right_columns: Vec<String>,
    ) -> Self {
        NestedLoopJoin {
            left,
            right,
            condition,
            is_left_join,
            right_columns,
            right_rows: None,
            current_left_row: None,
            right_index: 0,
            current_matched: false,
        }
    }

    fn materialize_right(&mut self) -> QueryResult<()> {
        let mut rows = Vec::new();
        while let Some(row) = self.right.next()? {
            rows.push(row);
        }
        self.right_rows = Some(rows);
        Ok(())
    }
}

impl Operator for NestedLoopJoin<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.left.init()?;
        self.right.init()?;
        self.right_rows = None;
        self.current_left_row = None;
        self.right_index = 0;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        if self.right_rows.is_none() {
            self.materialize_right()?;
        }

        loop {
            if let (Some(left_row), Some(right_rows)) = (&self.current_left_row, &self.right_rows) {
                while self.right_index < right_rows.len() {
                    let right_row = &right_rows[self.right_index];
                    self.right_index += 1;

                    let joined = Row::join(left_row, right_row);
                    let keep = match &self.condition {
                        Some(condition) => evaluate_predicate(condition, &joined)?,
                        None => true,
                    };
                    if keep {
                        self.current_matched = true;
                        return Ok(Some(joined));
                    }
                }

                if self.is_left_join && !self.current_matched {
                    self.current_matched = true;
                    return Ok(Some(pad_with_nulls(left_row, &self.right_columns)));
                }
            }

            // Advance the outer loop
            self.current_left_row = self.left.next()?;
            if self.current_left_row.is_none() {
                return Ok(None);
            }
            self.right_index = 0;
            self.current_matched = false;
        }
    }

    fn close(&mut self) -> QueryResult<()> {
        self.right_rows = None;
        self.left.close()?;
        self.right.close()
    }
}
