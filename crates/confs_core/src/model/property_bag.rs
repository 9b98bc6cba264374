//! Schemaless JSON attribute bag stored in a single column.
//!
//! # Responsibility
//! - Hold an untyped key/value mapping (`details` on a conference).
//! - Encode the mapping to JSON bytes and decode it back with a strict
//!   top-level object check.
//! - Act as the `rusqlite` (de)serialization hook for its column.
//!
//! # Invariants
//! - The top-level value is always a JSON object.
//! - Keys are ordered, so two bags with the same entries encode identically.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Codec failure for property bag encode/decode.
#[derive(Debug)]
pub enum PropertyError {
    /// The value could not be represented as JSON.
    Encoding(serde_json::Error),
    /// Stored bytes are not valid JSON.
    MalformedJson(serde_json::Error),
    /// Stored JSON is valid but its top-level value is not an object.
    NotAnObject { found: &'static str },
    /// Column held a value that is neither text nor blob.
    UnsupportedColumnType(Type),
}

impl PropertyError {
    /// Returns `true` for the bag -> bytes direction.
    ///
    /// Every other variant is a decoding failure.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }
}

impl Display for PropertyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encoding(err) => write!(f, "failed to encode property bag: {err}"),
            Self::MalformedJson(err) => write!(f, "property bag is not valid JSON: {err}"),
            Self::NotAnObject { found } => {
                write!(f, "property bag must be a JSON object, found {found}")
            }
            Self::UnsupportedColumnType(kind) => {
                write!(f, "property bag column must be text or blob, found {kind}")
            }
        }
    }
}

impl Error for PropertyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encoding(err) | Self::MalformedJson(err) => Some(err),
            Self::NotAnObject { .. } | Self::UnsupportedColumnType(_) => None,
        }
    }
}

/// Untyped JSON object persisted in one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(Map<String, Value>);

impl PropertyBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from any serializable value.
    ///
    /// # Errors
    /// - `Encoding` when `value` has no JSON representation.
    /// - `NotAnObject` when it serializes to anything but an object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, PropertyError> {
        let value = serde_json::to_value(value).map_err(PropertyError::Encoding)?;
        Self::from_value(value)
    }

    /// Serializes the bag to JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>, PropertyError> {
        serde_json::to_vec(&self.0).map_err(PropertyError::Encoding)
    }

    /// Parses JSON bytes into a bag.
    ///
    /// # Errors
    /// - `MalformedJson` when `bytes` is not a JSON document.
    /// - `NotAnObject` when the document is an array or a scalar.
    pub fn decode(bytes: &[u8]) -> Result<Self, PropertyError> {
        let value: Value = serde_json::from_slice(bytes).map_err(PropertyError::MalformedJson)?;
        Self::from_value(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts one entry, returning the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn from_value(value: Value) -> Result<Self, PropertyError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PropertyError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

impl ToSql for PropertyBag {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = serde_json::to_string(&self.0).map_err(|err| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(PropertyError::Encoding(err)))
        })?;
        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for PropertyBag {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let bytes = match value {
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes,
            other => {
                return Err(FromSqlError::Other(Box::new(
                    PropertyError::UnsupportedColumnType(other.data_type()),
                )))
            }
        };
        Self::decode(bytes).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{PropertyBag, PropertyError};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn encoding_is_independent_of_insertion_order() {
        let mut first = PropertyBag::new();
        first.insert("wifi", true);
        first.insert("capacity", 500);

        let mut second = PropertyBag::new();
        second.insert("capacity", 500);
        second.insert("wifi", true);

        assert_eq!(first, second);
        assert_eq!(first.encode().unwrap(), second.encode().unwrap());
        assert_eq!(first.encode().unwrap(), br#"{"capacity":500,"wifi":true}"#);
    }

    #[test]
    fn decode_reports_found_shape_for_non_objects() {
        let err = PropertyBag::decode(b"\"just a string\"").unwrap_err();
        assert!(matches!(err, PropertyError::NotAnObject { found: "string" }));
        assert!(!err.is_encoding());
    }

    #[test]
    fn column_hook_rejects_non_byte_values() {
        use rusqlite::types::{FromSql, FromSqlError, ValueRef};

        let err = PropertyBag::column_result(ValueRef::Integer(5)).unwrap_err();
        match err {
            FromSqlError::Other(source) => {
                let err = source.downcast::<PropertyError>().unwrap();
                assert!(matches!(*err, PropertyError::UnsupportedColumnType(_)));
            }
            other => panic!("unexpected error: {other}"),
        }

        let bag = PropertyBag::column_result(ValueRef::Blob(br#"{"a":1}"#)).unwrap();
        assert_eq!(bag.get("a"), Some(&json!(1)));
    }

    #[test]
    fn from_serialize_rejects_non_string_keys() {
        let mut keyed = HashMap::new();
        keyed.insert((1, 2), "pair");

        let err = PropertyBag::from_serialize(&keyed).unwrap_err();
        assert!(err.is_encoding());
    }

    #[test]
    fn from_serialize_accepts_structs() {
        #[derive(serde::Serialize)]
        struct Venue {
            hall: &'static str,
            seats: u32,
        }

        let bag = PropertyBag::from_serialize(&Venue {
            hall: "B",
            seats: 120,
        })
        .unwrap();
        assert_eq!(bag.get("hall"), Some(&json!("B")));
        assert_eq!(bag.get("seats"), Some(&json!(120)));
    }
}
