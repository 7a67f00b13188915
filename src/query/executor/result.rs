// Query Result Implementation
//
// This module defines the value, row and result types for query execution,
// and the error type shared by every layer of the engine.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::FrameError;
use crate::query::parser::components::ParseError;

/// Possible data types for values in a row
///
/// Floats compare by their canonical form: `-0.0` equals `0.0`, every NaN
/// equals every other NaN, and NaN orders above all numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

/// Fold `-0.0` into `0.0` and every NaN payload into a single NaN
fn canonical_float(f: f64) -> f64 {
    if f.is_nan() {
        f64::NAN
    } else if f == 0.0 {
        0.0
    } else {
        f
    }
}

fn float_order(a: f64, b: f64) -> Ordering {
    canonical_float(a).total_cmp(&canonical_float(b))
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Null, DataValue::Null) => true,
            (DataValue::Integer(a), DataValue::Integer(b)) => a == b,
            (DataValue::Float(a), DataValue::Float(b)) => {
                canonical_float(*a).to_bits() == canonical_float(*b).to_bits()
            }
            (DataValue::Text(a), DataValue::Text(b)) => a == b,
            (DataValue::Boolean(a), DataValue::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DataValue::Null => 0.hash(state),
            DataValue::Integer(i) => { 1.hash(state); i.hash(state); }
            DataValue::Float(f) => { 2.hash(state); canonical_float(*f).to_bits().hash(state); }
            DataValue::Text(s) => { 3.hash(state); s.hash(state); }
            DataValue::Boolean(b) => { 4.hash(state); b.hash(state); }
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) if fl.is_finite() && fl.fract() == 0.0 => write!(f, "{:.1}", fl),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Text(s) => write!(f, "{}", s),
            DataValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl PartialOrd for DataValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Null, DataValue::Null) => Some(Ordering::Equal),
            (DataValue::Null, _) => Some(Ordering::Less),
            (_, DataValue::Null) => Some(Ordering::Greater),

            (DataValue::Integer(a), DataValue::Integer(b)) => a.partial_cmp(b),
            (DataValue::Float(a), DataValue::Float(b)) => Some(float_order(*a, *b)),
            (DataValue::Integer(a), DataValue::Float(b)) => Some(float_order(*a as f64, *b)),
            (DataValue::Float(a), DataValue::Integer(b)) => Some(float_order(*a, *b as f64)),
            (DataValue::Text(a), DataValue::Text(b)) => Some(a.cmp(b)),
            (DataValue::Boolean(a), DataValue::Boolean(b)) => a.partial_cmp(b),

            _ => None,
        }
    }
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// The value with floats folded to their canonical form
    pub fn canonicalized(self) -> DataValue {
        match self {
            DataValue::Float(f) => DataValue::Float(canonical_float(f)),
            other => other,
        }
    }

    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "NULL",
            DataValue::Integer(_) => "INTEGER",
            DataValue::Float(_) => "FLOAT",
            DataValue::Text(_) => "TEXT",
            DataValue::Boolean(_) => "BOOLEAN",
        }
    }

    /// Compare two DataValues for sorting purposes.
    /// NULLs are considered less than any non-NULL value.
    /// Returns a TypeError for incompatible types.
    pub fn compare(&self, other: &Self) -> QueryResult<Ordering> {
        self.partial_cmp(other).ok_or_else(|| {
            QueryError::TypeError(format!(
                "Cannot compare {} with {}",
                self.type_name(),
                other.type_name()
            ))
        })
    }

    /// Render the value as a SQL literal
    pub fn to_sql_literal(&self) -> String {
        match self {
            DataValue::Null => "NULL".to_string(),
            DataValue::Integer(i) => i.to_string(),
            DataValue::Float(f) => f.to_string(),
            DataValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            DataValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Integer(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Integer(v as i64)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Float(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Boolean(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Text(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::Text(v)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DataValue::Null, Into::into)
    }
}

/// Represents a row flowing between operators.
///
/// Values are keyed by column key (`qualifier.column` for base table
/// columns) and keep the order they were set in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: LinkedHashMap<String, DataValue>,
}

impl Row {
    /// Create a new empty row
    pub fn new() -> Self {
        Row {
            values: LinkedHashMap::new(),
        }
    }

    /// Create a row from column values
    pub fn from_values(columns: Vec<String>, values: Vec<DataValue>) -> Self {
        Row {
            values: columns.into_iter().zip(values).collect(),
        }
    }

    /// Get a value by column key
    pub fn get(&self, column: &str) -> Option<&DataValue> {
        self.values.get(column)
    }

    /// Set a value for a column
    pub fn set(&mut self, column: String, value: DataValue) {
        self.values.insert(column, value);
    }

    /// Get all column keys in the row
    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Get all values in column order
    pub fn values(&self) -> impl Iterator<Item = &DataValue> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Concatenate two rows, as produced by a join
    pub fn join(left: &Row, right: &Row) -> Row {
        let mut joined = left.clone();
        for (key, value) in right.values.iter() {
            joined.values.insert(key.clone(), value.clone());
        }
        joined
    }
}

/// Represents query execution error
#[derive(Error, Debug)]
pub enum QueryError {
    /// The statement text could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Error during query execution
    #[error("Execution error: {0}")]
    ExecutionError(String),
    /// Error in data type conversion or comparison
    #[error("Type error: {0}")]
    TypeError(String),
    /// Error during query planning phase
    #[error("Planning error: {0}")]
    PlanningError(String),
    /// Table not found
    #[error("Table not found: {0}")]
    TableNotFound(String),
    /// Column not found
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    /// Unqualified column present in more than one table
    #[error("Ambiguous column reference: {0}")]
    AmbiguousColumn(String),
    /// Table already exists
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),
    /// Duplicate column
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    /// Inserted value does not fit the column type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    /// Inserted row has the wrong number of values
    #[error("Arity mismatch: {0}")]
    ArityMismatch(String),
    /// NULL inserted into a NOT NULL column
    #[error("NULL value not allowed for column {0}")]
    NullViolation(String),
    /// Duplicate primary key
    #[error("Duplicate primary key: {0}")]
    PrimaryKeyViolation(String),
    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// Statement kind the engine does not execute
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),
    /// Numeric overflow
    #[error("Numeric overflow")]
    NumericOverflow,
    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
    /// A frame could not be built from the data
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Query resultset representation
#[derive(Debug, Clone, Default)]
pub struct QueryResultSet {
    /// Column names in the resultset
    columns: Vec<String>,
    /// Rows of data
    rows: Vec<Row>,
}

impl QueryResultSet {
    /// Create a new empty resultset with column names
    pub fn new(columns: Vec<String>) -> Self {
        QueryResultSet {
            columns,
            rows: Vec::new(),
        }
    }

    /// Result of a statement that produces no data (DDL)
    pub fn empty() -> Self {
        QueryResultSet::default()
    }

    /// Result of a data-modifying statement: a single `count` cell
    pub fn affected_rows(count: usize) -> Self {
        let columns = vec!["count".to_string()];
        let row = Row::from_values(columns.clone(), vec![DataValue::Integer(count as i64)]);
        QueryResultSet {
            columns,
            rows: vec![row],
        }
    }

    /// Add a row to the resultset
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get the columns in the resultset
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the rows in the resultset
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row values in result column order
    pub fn value_rows(&self) -> Vec<Vec<DataValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| row.get(col).cloned().unwrap_or(DataValue::Null))
                    .collect()
            })
            .collect()
    }

    /// Format the resultset as a bordered text table followed by a row count
    pub fn to_string_table(&self) -> String {
        if self.columns.is_empty() {
            return "OK".to_string();
        }

        let rendered = self.value_rows();
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len().max(3)).collect();
        for row in &rendered {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }

        let mut out = String::new();
        let separator: String = widths
            .iter()
            .map(|w| format!("{:-<width$}+", "", width = w + 2))
            .collect();

        out.push('|');
        for (header, width) in self.columns.iter().zip(&widths) {
            out.push_str(&format!(" {:<width$} |", header, width = width));
        }
        out.push('\n');
        out.push('+');
        out.push_str(&separator);
        out.push('\n');

        for row in &rendered {
            out.push('|');
            for (value, width) in row.iter().zip(&widths) {
                out.push_str(&format!(" {:<width$} |", value.to_string(), width = width));
            }
            out.push('\n');
        }

        let noun = if self.rows.len() == 1 { "row" } else { "rows" };
        out.push_str(&format!("({} {})", self.rows.len(), noun));
        out
    }
}
