use std::collections::BTreeMap;

use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use uuid::Uuid;

/// The result of unmarshaling: a JSON-like tree whose leaves may carry
/// richer types produced by format conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    Array(Vec<TypedValue>),
    Object(BTreeMap<String, TypedValue>),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TypedValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            TypedValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, TypedValue>> {
        match self {
            TypedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a property of an object value.
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Render back into plain JSON. Dates and datetimes become RFC 3339
    /// strings, UUIDs hyphenated strings and bytes standard base64.
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Null => Value::Null,
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::Number(n) => Value::Number(n.clone()),
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            TypedValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            TypedValue::Uuid(id) => Value::String(id.hyphenated().to_string()),
            TypedValue::Bytes(bytes) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            TypedValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            TypedValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for TypedValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => TypedValue::Null,
            Value::Bool(b) => TypedValue::Bool(*b),
            Value::Number(n) => TypedValue::Number(n.clone()),
            Value::String(s) => TypedValue::String(s.clone()),
            Value::Array(items) => TypedValue::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => TypedValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for TypedValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

impl From<NaiveDate> for TypedValue {
    fn from(date: NaiveDate) -> Self {
        TypedValue::Date(date)
    }
}

impl From<DateTime<FixedOffset>> for TypedValue {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        TypedValue::DateTime(datetime)
    }
}

/// Structural equality against the raw JSON the value came from.
///
/// Converted leaves (dates, UUIDs, bytes) never equal their source string.
impl PartialEq<Value> for TypedValue {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (TypedValue::Null, Value::Null) => true,
            (TypedValue::Bool(a), Value::Bool(b)) => a == b,
            (TypedValue::Number(a), Value::Number(b)) => a == b,
            (TypedValue::String(a), Value::String(b)) => a == b,
            (TypedValue::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (TypedValue::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v == other))
            }
            _ => false,
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
