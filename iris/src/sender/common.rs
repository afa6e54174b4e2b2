use crate::table::{TableValue, ValueKind};
use std::fmt::Debug;

/// Element type an `ArraySender` can publish. Maps a `Vec<Self>` to and from the wire value.
pub trait ArrayElement: Copy + Debug + Send + Sync + 'static {
    const KIND: ValueKind;

    fn into_value(values: Vec<Self>) -> TableValue;

    /// `None` if `value` holds another element type.
    fn from_value(value: TableValue) -> Option<Vec<Self>>;
}

impl ArrayElement for f64 {
    const KIND: ValueKind = ValueKind::DoubleArray;

    fn into_value(values: Vec<Self>) -> TableValue {
        TableValue::DoubleArray(values)
    }

    fn from_value(value: TableValue) -> Option<Vec<Self>> {
        match value {
            TableValue::DoubleArray(values) => Some(values),
            _ => None,
        }
    }
}

impl ArrayElement for i64 {
    const KIND: ValueKind = ValueKind::IntegerArray;

    fn into_value(values: Vec<Self>) -> TableValue {
        TableValue::IntegerArray(values)
    }

    fn from_value(value: TableValue) -> Option<Vec<Self>> {
        match value {
            TableValue::IntegerArray(values) => Some(values),
            _ => None,
        }
    }
}
