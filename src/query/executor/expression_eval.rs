// Expression Evaluation Utility
//
// Evaluates bound AST expressions against a single row. Column references
// are expected to be canonical (see the planner's binder), so lookup is a
// plain key match. Logic is three-valued: NULL propagates through
// comparisons and arithmetic, and AND/OR follow SQL truth tables.

use std::cmp::Ordering;

use crate::query::executor::result::{DataValue, QueryError, QueryResult, Row};
use crate::query::parser::ast::{Expression, Operator, UnaryOperator, Value};

/// Evaluate an AST expression in the context of a single row
pub fn evaluate_expression(expr: &Expression, row: &Row) -> QueryResult<DataValue> {
    match expr {
        Expression::Literal(val) => Ok(literal_value(val)),
        Expression::Column(col_ref) => {
            let key = col_ref.key();
            row.get(&key)
                .cloned()
                .ok_or(QueryError::ColumnNotFound(key))
        }
        Expression::BinaryOp { left, op: Operator::And, right } => {
            let left_val = truth_value(&evaluate_expression(left, row)?)?;
            if left_val == Some(false) {
                return Ok(DataValue::Boolean(false));
            }
            let right_val = truth_value(&evaluate_expression(right, row)?)?;
            Ok(match (left_val, right_val) {
                (_, Some(false)) => DataValue::Boolean(false),
                (Some(true), Some(true)) => DataValue::Boolean(true),
                _ => DataValue::Null,
            })
        }
        Expression::BinaryOp { left, op: Operator::Or, right } => {
            let left_val = truth_value(&evaluate_expression(left, row)?)?;
            if left_val == Some(true) {
                return Ok(DataValue::Boolean(true));
            }
            let right_val = truth_value(&evaluate_expression(right, row)?)?;
            Ok(match (left_val, right_val) {
                (_, Some(true)) => DataValue::Boolean(true),
                (Some(false), Some(false)) => DataValue::Boolean(false),
                _ => DataValue::Null,
            })
        }
        Expression::BinaryOp { left, op, right } => {
            let left_val = evaluate_expression(left, row)?;
            let right_val = evaluate_expression(right, row)?;
            apply_binary_operator(*op, left_val, right_val)
        }
        Expression::UnaryOp { op: UnaryOperator::Not, expr } => {
            match truth_value(&evaluate_expression(expr, row)?)? {
                Some(b) => Ok(DataValue::Boolean(!b)),
                None => Ok(DataValue::Null),
            }
        }
        Expression::UnaryOp { op: UnaryOperator::Minus, expr } => {
            match evaluate_expression(expr, row)? {
                DataValue::Null => Ok(DataValue::Null),
                DataValue::Integer(i) => i
                    .checked_neg()
                    .map(DataValue::Integer)
                    .ok_or(QueryError::NumericOverflow),
                DataValue::Float(f) => Ok(DataValue::Float(-f)),
                other => Err(QueryError::TypeError(format!(
                    "Cannot negate a {} value",
                    other.type_name()
                ))),
            }
        }
        Expression::IsNull { expr, not } => {
            let is_null = evaluate_expression(expr, row)?.is_null();
            Ok(DataValue::Boolean(is_null != *not))
        }
        Expression::Case { operand, when_then_clauses, else_clause } => {
            let operand_val = match operand {
                Some(operand) => Some(evaluate_expression(operand, row)?),
                None => None,
            };

            for (when, then) in when_then_clauses {
                let when_val = evaluate_expression(when, row)?;
                let matched = match &operand_val {
                    // Simple CASE compares the operand for equality
                    Some(operand_val) => {
                        compare_values(Operator::Equals, operand_val, &when_val)? == DataValue::Boolean(true)
                    }
                    None => truth_value(&when_val)? == Some(true),
                };
                if matched {
                    return evaluate_expression(then, row);
                }
            }

            match else_clause {
                Some(else_expr) => evaluate_expression(else_expr, row),
                None => Ok(DataValue::Null),
            }
        }
        Expression::Aggregate { function, .. } => Err(QueryError::PlanningError(format!(
            "Aggregate {} is not allowed in this context",
            function
        ))),
    }
}

/// Evaluate a predicate and report whether it holds. NULL counts as false.
pub fn evaluate_predicate(expr: &Expression, row: &Row) -> QueryResult<bool> {
    let value = evaluate_expression(expr, row)?;
    Ok(truth_value(&value)? == Some(true))
}

/// Convert an AST literal to a runtime value
pub fn literal_value(value: &Value) -> DataValue {
    match value {
        Value::Integer(i) => DataValue::Integer(*i),
        Value::Float(f) => DataValue::Float(*f),
        Value::String(s) => DataValue::Text(s.clone()),
        Value::Boolean(b) => DataValue::Boolean(*b),
        Value::Null => DataValue::Null,
    }
}

/// Interpret a value as a SQL truth value
fn truth_value(value: &DataValue) -> QueryResult<Option<bool>> {
    match value {
        DataValue::Null => Ok(None),
        DataValue::Boolean(b) => Ok(Some(*b)),
        other => Err(QueryError::TypeError(format!(
            "Expected a boolean condition, found {} value {}",
            other.type_name(),
            other.to_sql_literal()
        ))),
    }
}

/// Apply a comparison or arithmetic operator to two evaluated operands
fn apply_binary_operator(op: Operator, left: DataValue, right: DataValue) -> QueryResult<DataValue> {
    if op.is_comparison() {
        return compare_values(op, &left, &right);
    }

    // Arithmetic with NULL is NULL
    if left.is_null() || right.is_null() {
        return Ok(DataValue::Null);
    }

    match (left, right) {
        (DataValue::Integer(l), DataValue::Integer(r)) => integer_arithmetic(op, l, r),
        (DataValue::Integer(l), DataValue::Float(r)) => float_arithmetic(op, l as f64, r),
        (DataValue::Float(l), DataValue::Integer(r)) => float_arithmetic(op, l, r as f64),
        (DataValue::Float(l), DataValue::Float(r)) => float_arithmetic(op, l, r),
        (l, r) => Err(QueryError::TypeError(format!(
            "Unsupported types for {} operator: {} and {}",
            op,
            l.type_name(),
            r.type_name()
        ))),
    }
}

/// Compare two values with a comparison operator
fn compare_values(op: Operator, left: &DataValue, right: &DataValue) -> QueryResult<DataValue> {
    if left.is_null() || right.is_null() {
        return Ok(DataValue::Null);
    }

    let ordering = left.compare(right)?;
    let result = match op {
        Operator::Equals => ordering == Ordering::Equal,
        Operator::NotEquals => ordering != Ordering::Equal,
        Operator::LessThan => ordering == Ordering::Less,
        Operator::GreaterThan => ordering == Ordering::Greater,
        Operator::LessEquals => ordering != Ordering::Greater,
        Operator::GreaterEquals => ordering != Ordering::Less,
        _ => {
            return Err(QueryError::ExecutionError(format!(
                "{} is not a comparison operator",
                op
            )))
        }
    };

    Ok(DataValue::Boolean(result))
}

fn integer_arithmetic(op: Operator, l: i64, r: i64) -> QueryResult<DataValue> {
    let result = match op {
        Operator::Plus => l.checked_add(r),
        Operator::Minus => l.checked_sub(r),
        Operator::Multiply => l.checked_mul(r),
        Operator::Divide => {
            if r == 0 {
                return Err(QueryError::DivisionByZero);
            }
            l.checked_div(r)
        }
        Operator::Modulo => {
            if r == 0 {
                return Err(QueryError::DivisionByZero);
            }
            l.checked_rem(r)
        }
        _ => {
            return Err(QueryError::ExecutionError(format!(
                "{} is not an arithmetic operator",
                op
            )))
        }
    };

    result.map(DataValue::Integer).ok_or(QueryError::NumericOverflow)
}

fn float_arithmetic(op: Operator, l: f64, r: f64) -> QueryResult<DataValue> {
    let result = match op {
        Operator::Plus => l + r,
        Operator::Minus => l - r,
        Operator::Multiply => l * r,
        Operator::Divide | Operator::Modulo if r == 0.0 => return Err(QueryError::DivisionByZero),
        Operator::Divide => l / r,
        Operator::Modulo => l % r,
        _ => {
            return Err(QueryError::ExecutionError(format!(
                "{} is not an arithmetic operator",
                op
            )))
        }
    };

    Ok(DataValue::Float(result))
}
