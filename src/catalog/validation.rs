// Type Validation Module
//
// This module checks rows against a table schema before they are appended.
// A batch is validated as a whole so that a failing row leaves the table
// untouched.

use std::collections::HashSet;

use thiserror::Error;

use crate::catalog::column::Column;
use crate::catalog::schema::DataType;
use crate::catalog::table::Table;
use crate::query::executor::result::{DataValue, QueryError};

/// Validation errors that can occur during type checking
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Type mismatch for column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },
    #[error("Row has {actual} values, but {expected} columns were expected")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("NULL value not allowed for non-nullable column {0}")]
    NullValueNotAllowed(String),
    #[error("Duplicate primary key value {0}")]
    DuplicatePrimaryKey(String),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

/// Type validation result
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for QueryError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::TypeMismatch { .. } => QueryError::TypeMismatch(err.to_string()),
            ValidationError::ArityMismatch { .. } => QueryError::ArityMismatch(err.to_string()),
            ValidationError::NullValueNotAllowed(col) => QueryError::NullViolation(col),
            ValidationError::DuplicatePrimaryKey(key) => QueryError::PrimaryKeyViolation(key),
            ValidationError::ColumnNotFound(col) => QueryError::ColumnNotFound(col),
        }
    }
}

/// The type validator handles schema validation and type checking
pub struct TypeValidator;

impl TypeValidator {
    /// Validate a value against a column and return it in the column's type.
    /// The only implicit conversion is Integer into a Float column.
    pub fn coerce_value(value: DataValue, column: &Column) -> ValidationResult<DataValue> {
        if value.is_null() {
            return if column.is_nullable() {
                Ok(DataValue::Null)
            } else {
                Err(ValidationError::NullValueNotAllowed(column.name().to_string()))
            };
        }

        match (value, column.data_type()) {
            (v @ DataValue::Integer(_), DataType::Integer) => Ok(v),
            (v @ DataValue::Float(_), DataType::Float) => Ok(v),
            (v @ DataValue::Text(_), DataType::Text) => Ok(v),
            (v @ DataValue::Boolean(_), DataType::Boolean) => Ok(v),
            (DataValue::Integer(i), DataType::Float) => Ok(DataValue::Float(i as f64)),
            (actual, expected) => Err(ValidationError::TypeMismatch {
                column: column.name().to_string(),
                expected: expected.to_string(),
                actual: actual.to_sql_literal(),
            }),
        }
    }

    /// Validate a full row (one value per column, schema order)
    pub fn validate_row(values: Vec<DataValue>, table: &Table) -> ValidationResult<Vec<DataValue>> {
        let columns = table.columns();
        if values.len() != columns.len() {
            return Err(ValidationError::ArityMismatch {
                expected: columns.len(),
                actual: values.len(),
            });
        }

        values
            .into_iter()
            .zip(columns)
            .map(|(value, column)| Self::coerce_value(value, column))
            .collect()
    }

    /// Validate a batch of rows, including primary key uniqueness against
    /// the rows already in the table and within the batch itself.
    pub fn validate_batch(rows: Vec<Vec<DataValue>>, table: &Table) -> ValidationResult<Vec<Vec<DataValue>>> {
        let validated = rows
            .into_iter()
            .map(|row| Self::validate_row(row, table))
            .collect::<ValidationResult<Vec<_>>>()?;

        let key_indices = table.primary_key_indices();
        if key_indices.is_empty() {
            return Ok(validated);
        }

        let key_of = |row: &[DataValue]| -> Vec<DataValue> {
            key_indices.iter().map(|&i| row[i].clone()).collect()
        };

        let mut seen: HashSet<Vec<DataValue>> = table.rows().iter().map(|r| key_of(r.as_slice())).collect();
        for row in &validated {
            let key = key_of(row.as_slice());
            if !seen.insert(key.clone()) {
                let rendered: Vec<String> = key.iter().map(|v| v.to_sql_literal()).collect();
                return Err(ValidationError::DuplicatePrimaryKey(rendered.join(", ")));
            }
        }

        Ok(validated)
    }
}
