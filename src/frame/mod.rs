//! In-memory Frames
//!
//! A `DataFrame` is an ordered set of equally long, uniquely named columns.
//! Frames are what callers register with a session and what queries return.

mod display;
pub mod series;

pub use self::series::{IntoSeries, Series};

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::catalog::{Column, DataType, Table, TableSource};
use crate::query::executor::result::{DataValue, QueryResultSet};

/// Errors raised while building a frame
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Column {column} has {actual} values, but the frame has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("Column names must not be empty")]
    EmptyColumnName,
    #[error("Column mixes {expected} with {actual} values")]
    MixedTypes { expected: DataType, actual: String },
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FrameResult<T> = Result<T, FrameError>;

/// Build a `DataFrame` from `name => vector` pairs.
///
/// ```
/// let birds = tabuladb::frame! {
///     "species" => vec!["Mallard", "Wood Duck"],
///     "count" => vec![42, 17],
/// }
/// .unwrap();
/// assert_eq!(birds.num_rows(), 2);
/// ```
#[macro_export]
macro_rules! frame {
    () => {
        $crate::frame::DataFrame::new(::std::vec::Vec::<(::std::string::String, $crate::frame::Series)>::new())
    };
    ($($name:expr => $values:expr),+ $(,)?) => {{
        let build = || -> $crate::frame::FrameResult<$crate::frame::DataFrame> {
            $crate::frame::DataFrame::new(::std::vec![
                $(($name, $crate::frame::IntoSeries::into_series($values)?)),+
            ])
        };
        build()
    }};
}

/// Column-oriented in-memory table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<(String, Series)>,
}

impl DataFrame {
    /// Build a frame from named columns. Fails on empty or duplicate names
    /// and on columns of different lengths.
    pub fn new<N: Into<String>>(columns: Vec<(N, Series)>) -> FrameResult<Self> {
        let mut checked: Vec<(String, Series)> = Vec::with_capacity(columns.len());
        for (name, series) in columns {
            let name = name.into();
            if name.is_empty() {
                return Err(FrameError::EmptyColumnName);
            }
            if checked.iter().any(|(existing, _)| *existing == name) {
                return Err(FrameError::DuplicateColumn(name));
            }
            if let Some((_, first)) = checked.first() {
                if first.len() != series.len() {
                    return Err(FrameError::LengthMismatch {
                        column: name,
                        expected: first.len(),
                        actual: series.len(),
                    });
                }
            }
            checked.push((name, series));
        }
        Ok(DataFrame { columns: checked })
    }

    /// A frame with no columns and no rows
    pub fn empty() -> Self {
        DataFrame::default()
    }

    /// Column names in order
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Column names with their types
    pub fn dtypes(&self) -> Vec<(&str, DataType)> {
        self.columns
            .iter()
            .map(|(name, series)| (name.as_str(), series.data_type()))
            .collect()
    }

    /// Look up a column, preferring an exact name match
    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.columns.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, series)| series)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, series)| series.len())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Values of one row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<DataValue>> {
        if index >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().filter_map(|(_, s)| s.get(index).cloned()).collect())
    }

    /// All rows, in order
    pub fn rows(&self) -> Vec<Vec<DataValue>> {
        (0..self.num_rows()).filter_map(|i| self.row(i)).collect()
    }

    /// A single cell
    pub fn value(&self, row: usize, column: &str) -> Option<&DataValue> {
        self.column(column).and_then(|series| series.get(row))
    }

    /// Rows as a JSON array of objects keyed by column name
    pub fn to_json(&self) -> FrameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> FrameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a frame from a result set, inferring column types from the values
    pub fn from_result_set(result: &QueryResultSet) -> FrameResult<Self> {
        let rows = result.value_rows();
        let columns = result
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values = rows.iter().map(|row| row[i].clone()).collect();
                Ok((name.clone(), Series::from_values(values)?))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        DataFrame::new(columns)
    }

    /// Copy a table's contents, keeping its schema types
    pub fn from_table(table: &Table) -> FrameResult<Self> {
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let values = table.rows().iter().map(|row| row[i].clone()).collect();
                Ok((column.name().to_string(), Series::new(column.data_type(), values)?))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        DataFrame::new(columns)
    }

    /// Turn the frame into a registered table (all columns nullable)
    pub(crate) fn into_table(self, name: &str) -> Table {
        let num_rows = self.num_rows();
        let mut schema = Vec::with_capacity(self.columns.len());
        let mut rows = vec![Vec::with_capacity(self.columns.len()); num_rows];
        for (column_name, series) in self.columns {
            schema.push(Column::nullable(column_name, series.data_type()));
            for (row, value) in rows.iter_mut().zip(series.values().iter().cloned()) {
                row.push(value);
            }
        }
        Table::with_rows(name, schema, rows, TableSource::Registered)
    }
}

/// A cell serialized as a plain JSON scalar
struct JsonCell<'a>(&'a DataValue);

impl Serialize for JsonCell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            DataValue::Null => serializer.serialize_none(),
            DataValue::Integer(i) => serializer.serialize_i64(*i),
            DataValue::Float(f) => serializer.serialize_f64(*f),
            DataValue::Text(s) => serializer.serialize_str(s),
            DataValue::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

/// One row serialized as a map in column order
struct JsonRow<'a> {
    frame: &'a DataFrame,
    index: usize,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.frame.num_columns()))?;
        for (name, series) in &self.frame.columns {
            let value = series.get(self.index).unwrap_or(&DataValue::Null);
            map.serialize_entry(name, &JsonCell(value))?;
        }
        map.end()
    }
}

impl Serialize for DataFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.num_rows()))?;
        for index in 0..self.num_rows() {
            seq.serialize_element(&JsonRow { frame: self, index })?;
        }
        seq.end()
    }
}
