//! Value types for clickql IR

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::IrError;

/// Literal value referenced by a query.
///
/// Deserialization is untagged, so JSON strings always come back as
/// `Value::String`; `Date` and `DateTime` are only built from Rust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Array(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Values the dialect compares as text; their placeholders get quoted.
    pub fn is_textual(&self) -> bool {
        matches!(self, Value::String(_) | Value::Date(_) | Value::DateTime(_))
    }

    /// Calculate fingerprint (SHA-256) used to deduplicate bindings.
    ///
    /// Every value, array elements included, is hashed with its type tag,
    /// so `Int(1)` and `String("1")` never share a fingerprint. Floats are
    /// hashed by bit pattern, which keeps infinities and NaN apart.
    pub fn fingerprint(&self) -> String {
        let mut canonical = String::new();
        self.write_canonical(&mut canonical);
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Type-tagged, length-prefixed encoding; distinct values never encode
    /// to the same text.
    fn write_canonical(&self, out: &mut String) {
        use std::fmt::Write;

        out.push_str(self.type_name());
        out.push(':');
        // Writing into a String cannot fail.
        let _ = match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(out, "{}", b),
            Value::Int(i) => write!(out, "{}", i),
            Value::UInt(u) => write!(out, "{}", u),
            Value::Float(f) => write!(out, "{:016x}", f.to_bits()),
            Value::String(s) => write!(out, "{}:{}", s.len(), s),
            Value::Date(d) => write!(out, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(out, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Array(items) => {
                let _ = write!(out, "{}[", items.len());
                for item in items {
                    item.write_canonical(out);
                    out.push(';');
                }
                out.push(']');
                Ok(())
            }
        };
    }

    /// JSON form handed to drivers. Temporal values use ClickHouse text formats.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::UInt(u) => serde_json::Value::from(*u),
            Value::Float(f) => serde_json::json!(f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }

    /// Convert a JSON value into a column value. Objects are rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Self, IrError> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(_) => {
                return Err(IrError::InvalidArgument(
                    "nested objects are not valid column values".to_string(),
                ))
            }
        })
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => UInt,
    u16 => UInt,
    u32 => UInt,
    u64 => UInt,
    f32 => Float,
    f64 => Float,
    String => String,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Right-hand side of a comparison: a value to bind, or raw SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Operand {
    Bound(Value),
    Raw(String),
}

impl Operand {
    pub fn raw(sql: impl Into<String>) -> Self {
        Operand::Raw(sql.into())
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Operand::Bound(v) => Some(v),
            Operand::Raw(_) => None,
        }
    }
}

macro_rules! operand_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Bound(v.into())
                }
            }
        )*
    };
}

operand_from!(
    Value, bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, &str, NaiveDate,
    NaiveDateTime,
);

/// Selected column, join key or ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "sql")]
pub enum Column {
    /// Identifier, optionally `table.column`, `col as alias` or `field->path`
    Name(String),
    /// Expression rendered verbatim
    Raw(String),
}

impl Column {
    pub fn raw(sql: impl Into<String>) -> Self {
        Column::Raw(sql.into())
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Name(name.to_string())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Name(name)
    }
}

/// A single row keyed by column name, in caller order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column, replacing any earlier value for the same name.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Same record with columns in ascending name order.
    pub fn sorted(mut self) -> Self {
        self.fields.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }

    pub fn into_values(self) -> Vec<Value> {
        self.fields.into_iter().map(|(_, value)| value).collect()
    }

    /// Build from a JSON object.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Result<Self, IrError> {
        let mut record = Record::new();
        for (column, value) in object {
            record.insert(column, Value::from_json(value)?);
        }
        Ok(record)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

/// Rows handed to an insert: one flat record or a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsertPayload {
    Single(Record),
    Batch(Vec<Record>),
}

impl InsertPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            InsertPayload::Single(record) => record.is_empty(),
            InsertPayload::Batch(records) => records.iter().all(Record::is_empty),
        }
    }

    /// Every payload as a batch. Records without columns carry nothing to
    /// insert and are dropped, whichever shape they arrived in.
    pub fn into_batch(self) -> Vec<Record> {
        let records = match self {
            InsertPayload::Single(record) => vec![record],
            InsertPayload::Batch(records) => records,
        };
        records.into_iter().filter(|record| !record.is_empty()).collect()
    }

    /// Interpret a JSON payload: an object is one record, an array of
    /// objects is a batch. Positional arrays have no column names and are
    /// rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Self, IrError> {
        match json {
            serde_json::Value::Object(object) => {
                Ok(InsertPayload::Single(Record::from_json_object(object)?))
            }
            serde_json::Value::Array(items) => {
                let mut records = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::Object(object) => {
                            records.push(Record::from_json_object(object)?)
                        }
                        _ => return Err(IrError::non_string_keys()),
                    }
                }
                Ok(InsertPayload::Batch(records))
            }
            _ => Err(IrError::non_string_keys()),
        }
    }
}

impl From<Record> for InsertPayload {
    fn from(record: Record) -> Self {
        InsertPayload::Single(record)
    }
}

impl From<Vec<Record>> for InsertPayload {
    fn from(records: Vec<Record>) -> Self {
        InsertPayload::Batch(records)
    }
}
