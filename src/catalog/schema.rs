// Column Type Module
//
// This module defines the data types a table column can hold and the
// SQL type names that map onto them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::query::executor::result::DataValue;

/// Data types supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
}

impl DataType {
    /// Whether values of this type take part in arithmetic
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    /// The type of a non-null value, `None` for NULL
    pub fn of_value(value: &DataValue) -> Option<DataType> {
        match value {
            DataValue::Null => None,
            DataValue::Integer(_) => Some(DataType::Integer),
            DataValue::Float(_) => Some(DataType::Float),
            DataValue::Text(_) => Some(DataType::Text),
            DataValue::Boolean(_) => Some(DataType::Boolean),
        }
    }

    /// Common supertype of two column types, if one exists.
    /// Integer and Float widen to Float; anything else must match exactly.
    pub fn unify(self, other: DataType) -> Option<DataType> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
                Some(DataType::Float)
            }
            _ => None,
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    /// Convert a SQL type name to a DataType
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" => Ok(DataType::Integer),
            "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL" | "NUMERIC" => Ok(DataType::Float),
            "TEXT" | "VARCHAR" | "CHAR" | "STRING" => Ok(DataType::Text),
            "BOOL" | "BOOLEAN" => Ok(DataType::Boolean),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
        };
        write!(f, "{}", name)
    }
}
