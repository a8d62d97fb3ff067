use chrono::NaiveDateTime;

use crate::money::Money;

/// Timestamp layout used by every sink.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell of an output table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Money(Money),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value as a flat-file field. `Null` becomes the empty string.
    pub fn to_csv(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format!("{value:.6}"),
            Value::Money(value) => value.to_string(),
            Value::Text(value) => value.clone(),
            Value::Timestamp(value) => value.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Money> for Value {
    fn from(value: Money) -> Self {
        Value::Money(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An entity that can be written as one row of a named table.
pub trait Record {
    /// Destination table name.
    const TABLE: &'static str;
    /// Surrogate key column, if the table has one.
    const KEY: Option<&'static str>;
    /// Data columns in output order (the key column excluded).
    const COLUMNS: &'static [&'static str];

    fn key(&self) -> Option<i64>;
    fn values(&self) -> Vec<Value>;
}

/// One output row: optional surrogate key plus data cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: Option<i64>,
    pub values: Vec<Value>,
}

/// A fully materialized table ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub name: &'static str,
    pub key_column: Option<&'static str>,
    pub columns: &'static [&'static str],
    pub rows: Vec<Row>,
}

impl TableData {
    pub fn from_records<R: Record>(records: &[R]) -> Self {
        Self {
            name: R::TABLE,
            key_column: R::KEY,
            columns: R::COLUMNS,
            rows: records
                .iter()
                .map(|record| Row {
                    key: record.key(),
                    values: record.values(),
                })
                .collect(),
        }
    }

    /// Header for flat-file exports: the key column (if any) then data columns.
    pub fn header(&self) -> Vec<&'static str> {
        self.key_column
            .into_iter()
            .chain(self.columns.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| *name == column)
    }
}
