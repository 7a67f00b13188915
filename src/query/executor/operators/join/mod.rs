// Join Operators Module
//
// This module defines the join operators for query execution in the
// iterator-based execution model.

// Re-export public components
pub use self::hash_join::HashJoin;
pub use self::nested_loop::NestedLoopJoin;

mod hash_join;
mod nested_loop;

use crate::query::executor::operators::BoxedOperator;
use crate::query::executor::result::{DataValue, Row};
use crate::query::parser::ast::Expression;

/// Create a nested loop join operator
pub fn create_nested_loop_join<'a>(
    left: BoxedOperator<'a>,
    right: BoxedOperator<'a>,
    condition: Option<Expression>,
    is_left_join: bool,
    right_columns: Vec<String>,
) -> BoxedOperator<'a> {
    Box::new(NestedLoopJoin::new(left, right, condition, is_left_join, right_columns))
}

/// Create a hash join operator
pub fn create_hash_join<'a>(
    left: BoxedOperator<'a>,
    right: BoxedOperator<'a>,
    keys: Vec<(Expression, Expression)>,
    residual: Option<Expression>,
    is_left_join: bool,
    right_columns: Vec<String>,
) -> BoxedOperator<'a> {
    Box::new(HashJoin::new(left, right, keys, residual, is_left_join, right_columns))
}

/// Normalize a join key so that numerically equal integers and floats hash
/// alike. Returns None for NULL, which never matches anything.
pub(crate) fn normalize_join_key(value: DataValue) -> Option<DataValue> {
    match value {
        DataValue::Null => None,
        DataValue::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Some(DataValue::Integer(f as i64))
        }
        other => Some(other),
    }
}

/// Extend a left row with NULLs for every right column (LEFT JOIN miss)
pub(crate) fn pad_with_nulls(left: &Row, right_columns: &[String]) -> Row {
    let mut row = left.clone();
    for column in right_columns {
        row.set(column.clone(), DataValue::Null);
    }
    row
}
