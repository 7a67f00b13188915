// Hash Join Implementation
//
// This file implements the hash join algorithm, which is optimized for
// equality-based join conditions with O(n+m) time complexity.
//
// The right input is the build side; the left input is probed row by row
// so the output keeps the left input's order.

use std::collections::HashMap;

use log::debug;

use super::{normalize_join_key, pad_with_nulls};
use crate::query::executor::expression_eval::{evaluate_expression, evaluate_predicate};
use crate::query::executor::operators::{BoxedOperator, Operator};
use crate::query::executor::result::{DataValue, QueryResult, Row};
use crate::query::parser::ast::Expression;

/// Hash Join operator implementation
pub struct HashJoin<'a> {
    /// Left input operator (probe side)
    left: BoxedOperator<'a>,
    /// Right input operator (build side)
    right: BoxedOperator<'a>,
    /// Equi-join key pairs: (left expression, right expression)
    keys: Vec<(Expression, Expression)>,
    /// Remaining join condition checked on each candidate pair
    residual: Option<Expression>,
    /// Indicates if this is a LEFT OUTER JOIN
    is_left_join: bool,
    /// Right row keys, padded with NULL when a left row has no match
    right_columns: Vec<String>,
    /// Materialized build side
    build_rows: Vec<Row>,
    /// Hash table from join key to indices into build_rows
    hash_table: HashMap<Vec<DataValue>, Vec<usize>>,
    /// Indicates if the hash table has been built
    hash_table_built: bool,
    /// Current left row being probed
    current_left_row: Option<Row>,
    /// Build rows matching the current left row's key
    current_matches: Vec<usize>,
    /// Current match index
    current_match_index: usize,
    /// Whether the current left row produced any output
    current_matched: bool,
}

impl<'a> HashJoin<'a> {
    /// Create a new hash join operator
    pub fn new(
        left: BoxedOperator<'a>,
        right: BoxedOperator<'a>,
        keys: Vec<(Expression, Expression)>,
        residual: Option<Expression>,
        is_left_join: bool,
        right_columns: Vec<String>,
    ) -> Self {
        HashJoin {
            left,
            right,
            keys,
            residual,
            is_left_join,
            right_columns,
            build_rows: Vec::new(),
            hash_table: HashMap::new(),
            hash_table_built: false,
            current_left_row: None,
            current_matches: Vec::new(),
            current_match_index: 0,
            current_matched: false,
        }
    }

    /// Evaluate one side of the join keys; None if any key is NULL
    fn join_key<'e>(
        row: &Row,
        exprs: impl Iterator<Item = &'e Expression>,
    ) -> QueryResult<Option<Vec<DataValue>>> {
        let mut key = Vec::new();
        for expr in exprs {
            match normalize_join_key(evaluate_expression(expr, row)?) {
                Some(value) => key.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(key))
    }

    /// Build the hash table from the right relation
    fn build_hash_table(&mut self) -> QueryResult<()> {
        while let Some(row) = self.right.next()? {
            let key = Self::join_key(&row, self.keys.iter().map(|(_, r)| r))?;
            let index = self.build_rows.len();
            self.build_rows.push(row);

            // Rows with a NULL key can never match
            if let Some(key) = key {
                self.hash_table.entry(key).or_default().push(index);
            }
        }

        debug!(
            "Hash join built {} rows into {} buckets",
            self.build_rows.len(),
            self.hash_table.len()
        );
        self.hash_table_built = true;
        Ok(())
    }

    /// Find matches for the current left row
    fn find_matches(&mut self) -> QueryResult<()> {
        self.current_matches.clear();
        self.current_match_index = 0;
        self.current_matched = false;

        if let Some(left_row) = &self.current_left_row {
            if let Some(key) = Self::join_key(left_row, self.keys.iter().map(|(l, _)| l))? {
                if let Some(matches) = self.hash_table.get(&key) {
                    self.current_matches = matches.clone();
                }
            }
        }

        Ok(())
    }
}

impl Operator for HashJoin<'_> {
    fn init(&mut self) -> QueryResult<()> {
        self.left.init()?;
        self.right.init()?;

        self.build_rows.clear();
        self.hash_table.clear();
        self.hash_table_built = false;
        self.current_left_row = None;
        self.current_matches.clear();
        self.current_match_index = 0;
        Ok(())
    }

    fn next(&mut self) -> QueryResult<Option<Row>> {
        if !self.hash_table_built {
            self.build_hash_table()?;
        }

        loop {
            if let Some(left_row) = &self.current_left_row {
                while self.current_match_index < self.current_matches.len() {
                    let right_row = &self.build_rows[self.current_matches[self.current_match_index]];
                    self.current_match_index += 1;

                    let joined = Row::join(left_row, right_row);
                    let keep = match &self.residual {
                        Some(residual) => evaluate_predicate(residual, &joined)?,
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

            // Move to the next left row
            self.current_left_row = self.left.next()?;
            if self.current_left_row.is_none() {
                return Ok(None);
            }
            self.find_matches()?;
        }
    }

    fn close(&mut self) -> QueryResult<()> {
        self.build_rows.clear();
        self.hash_table.clear();
        self.hash_table_built = false;
        self.left.close()?;
        self.right.close()
    }
}
