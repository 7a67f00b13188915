// Aggregation Operators Module
//
// This module contains the hash aggregation operator and the accumulators
// behind the aggregate functions (COUNT, SUM, AVG, MIN, MAX).

mod hash;

pub use hash::{create_hash_aggregate, HashAggregateOperator};

use std::cmp::Ordering;
use std::fmt;

use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::parser::ast::{AggregateFunction, Expression};

/// One aggregate computed by an aggregation operator
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    pub function: AggregateFunction,
    /// Argument expression; None for COUNT(*)
    pub arg: Option<Expression>,
    /// Key under which the result is stored in the output row
    pub output_key: String,
}

impl fmt::Display for AggregateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}({}) AS {}", self.function, arg, self.output_key),
            None => write!(f, "{}(*) AS {}", self.function, self.output_key),
        }
    }
}

/// Running state of one aggregate within one group
#[derive(Debug, Clone)]
pub(crate) enum Accumulator {
    Count(i64),
    /// SUM stays an integer until a float is seen
    Sum(Option<DataValue>),
    Avg { sum: f64, count: i64 },
    Min(Option<DataValue>),
    Max(Option<DataValue>),
}

impl Accumulator {
    pub(crate) fn new(function: AggregateFunction) -> Self {
        match function {
            AggregateFunction::Count => Accumulator::Count(0),
            AggregateFunction::Sum => Accumulator::Sum(None),
            AggregateFunction::Avg => Accumulator::Avg { sum: 0.0, count: 0 },
            AggregateFunction::Min => Accumulator::Min(None),
            AggregateFunction::Max => Accumulator::Max(None),
        }
    }

    /// Feed one input value. `None` stands for a COUNT(*) row, which
    /// counts regardless of content; NULL values are skipped.
    pub(crate) fn update(&mut self, value: Option<&DataValue>) -> QueryResult<()> {
        let value = match value {
            None => {
                if let Accumulator::Count(n) = self {
                    *n += 1;
                }
                return Ok(());
            }
            Some(DataValue::Null) => return Ok(()),
            Some(value) => value,
        };

        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::Sum(sum) => {
                let next = match (sum.take(), value) {
                    (None, DataValue::Integer(i)) => DataValue::Integer(*i),
                    (None, DataValue::Float(f)) => DataValue::Float(*f),
                    (Some(DataValue::Integer(s)), DataValue::Integer(i)) => {
                        DataValue::Integer(s.checked_add(*i).ok_or(QueryError::NumericOverflow)?)
                    }
                    (Some(DataValue::Integer(s)), DataValue::Float(f)) => DataValue::Float(s as f64 + f),
                    (Some(DataValue::Float(s)), DataValue::Integer(i)) => DataValue::Float(s + *i as f64),
                    (Some(DataValue::Float(s)), DataValue::Float(f)) => DataValue::Float(s + f),
                    (_, other) => return Err(non_numeric("SUM", other)),
                };
                *sum = Some(next);
            }
            Accumulator::Avg { sum, count } => {
                let v = value.as_f64().ok_or_else(|| non_numeric("AVG", value))?;
                *sum += v;
                *count += 1;
            }
            Accumulator::Min(current) => {
                if current.as_ref().map_or(Ok(true), |c| value.compare(c).map(|o| o == Ordering::Less))? {
                    *current = Some(value.clone());
                }
            }
            Accumulator::Max(current) => {
                if current.as_ref().map_or(Ok(true), |c| value.compare(c).map(|o| o == Ordering::Greater))? {
                    *current = Some(value.clone());
                }
            }
        }

        Ok(())
    }

    /// Final value of the aggregate
    pub(crate) fn finish(&self) -> DataValue {
        match self {
            Accumulator::Count(n) => DataValue::Integer(*n),
            Accumulator::Sum(sum) => sum.clone().unwrap_or(DataValue::Null),
            Accumulator::Avg { count: 0, .. } => DataValue::Null,
            Accumulator::Avg { sum, count } => DataValue::Float(sum / *count as f64),
            Accumulator::Min(v) | Accumulator::Max(v) => v.clone().unwrap_or(DataValue::Null),
        }
    }
}

fn non_numeric(function: &str, value: &DataValue) -> QueryError {
    QueryError::TypeError(format!(
        "{} requires numeric input, found {} value {}",
        function,
        value.type_name(),
        value.to_sql_literal()
    ))
}
