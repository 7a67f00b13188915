// Series Implementation
//
// A Series is one typed column of a frame. Typed constructors come from
// literal Rust vectors; untyped `DataValue` vectors go through inference.

use serde::{Deserialize, Serialize};

use super::{FrameError, FrameResult};
use crate::catalog::DataType;
use crate::query::executor::result::DataValue;

/// A typed column of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    data_type: DataType,
    values: Vec<DataValue>,
}

impl Series {
    /// Build a series of a declared type. Integers are widened into a
    /// Float series; any other mismatch fails.
    pub fn new(data_type: DataType, values: Vec<DataValue>) -> FrameResult<Self> {
        let values = values
            .into_iter()
            .map(|value| match (value, data_type) {
                (DataValue::Integer(i), DataType::Float) => Ok(DataValue::Float(i as f64)),
                (value, _) if value.is_null() || DataType::of_value(&value) == Some(data_type) => Ok(value),
                (value, _) => Err(FrameError::MixedTypes {
                    expected: data_type,
                    actual: value.type_name().to_string(),
                }),
            })
            .collect::<FrameResult<Vec<_>>>()?;
        Ok(Series { data_type, values })
    }

    /// Build a series, inferring its type from the non-null values.
    /// Integer and Float mix to Float; an all-null series is Text.
    pub fn from_values(values: Vec<DataValue>) -> FrameResult<Self> {
        let mut inferred: Option<DataType> = None;
        for value in &values {
            let Some(value_type) = DataType::of_value(value) else {
                continue;
            };
            inferred = Some(match inferred {
                None => value_type,
                Some(current) => current.unify(value_type).ok_or_else(|| FrameError::MixedTypes {
                    expected: current,
                    actual: value.type_name().to_string(),
                })?,
            });
        }
        Series::new(inferred.unwrap_or(DataType::Text), values)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[DataValue] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataValue> {
        self.values.iter()
    }

    /// Number of NULL entries
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

/// Conversion used by the `frame!` macro: typed vectors convert
/// infallibly, `DataValue` vectors through inference.
pub trait IntoSeries {
    fn into_series(self) -> FrameResult<Series>;
}

impl IntoSeries for Series {
    fn into_series(self) -> FrameResult<Series> {
        Ok(self)
    }
}

impl IntoSeries for Vec<DataValue> {
    fn into_series(self) -> FrameResult<Series> {
        Series::from_values(self)
    }
}

impl TryFrom<Vec<DataValue>> for Series {
    type Error = FrameError;

    fn try_from(values: Vec<DataValue>) -> FrameResult<Self> {
        Series::from_values(values)
    }
}

macro_rules! impl_typed_series {
    ($t:ty, $data_type:expr) => {
        impl From<Vec<$t>> for Series {
            fn from(values: Vec<$t>) -> Self {
                Series {
                    data_type: $data_type,
                    values: values.into_iter().map(DataValue::from).collect(),
                }
            }
        }

        impl From<Vec<Option<$t>>> for Series {
            fn from(values: Vec<Option<$t>>) -> Self {
                Series {
                    data_type: $data_type,
                    values: values.into_iter().map(DataValue::from).collect(),
                }
            }
        }

        impl IntoSeries for Vec<$t> {
            fn into_series(self) -> FrameResult<Series> {
                Ok(Series::from(self))
            }
        }

        impl IntoSeries for Vec<Option<$t>> {
            fn into_series(self) -> FrameResult<Series> {
                Ok(Series::from(self))
            }
        }
    };
}

impl_typed_series!(i64, DataType::Integer);
impl_typed_series!(i32, DataType::Integer);
impl_typed_series!(f64, DataType::Float);
impl_typed_series!(bool, DataType::Boolean);
impl_typed_series!(String, DataType::Text);
impl_typed_series!(&str, DataType::Text);
