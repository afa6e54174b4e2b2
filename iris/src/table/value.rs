use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Element type of a table entry. Fixed by the first write to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    DoubleArray,
    IntegerArray,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::DoubleArray => write!(f, "double[]"),
            ValueKind::IntegerArray => write!(f, "int[]"),
        }
    }
}

/// Value stored in a table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableValue {
    DoubleArray(Vec<f64>),
    IntegerArray(Vec<i64>),
}

impl TableValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TableValue::DoubleArray(_) => ValueKind::DoubleArray,
            TableValue::IntegerArray(_) => ValueKind::IntegerArray,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TableValue::DoubleArray(values) => values.len(),
            TableValue::IntegerArray(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }
    write!(f, "]")
}

impl Display for TableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableValue::DoubleArray(values) => write_list(f, values),
            TableValue::IntegerArray(values) => write_list(f, values),
        }
    }
}

impl From<Vec<f64>> for TableValue {
    fn from(values: Vec<f64>) -> Self {
        TableValue::DoubleArray(values)
    }
}

impl From<Vec<i64>> for TableValue {
    fn from(values: Vec<i64>) -> Self {
        TableValue::IntegerArray(values)
    }
}

/// Listing entry returned by `TelemetryTable::topics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub name: String,
    pub kind: ValueKind,
    pub has_value: bool,
    pub has_default: bool,
    /// Time of the last `set`, `None` while only a default exists.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Display for TopicInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)?;
        match (self.has_value, self.updated_at) {
            (true, Some(at)) => write!(f, " updated {}", at.format("%H:%M:%S%.3f")),
            _ if self.has_default => write!(f, " default only"),
            _ => Ok(()),
        }
    }
}
