//! Record Codec Module
//!
//! Text encoding for stored values. JSON cannot tell a missing field from
//! `null`, so `Value::Missing` travels as the reserved sentinel string.
//!
//! A user string equal to [`MISSING_SENTINEL`] decodes as `Value::Missing`.

use std::collections::BTreeMap;

use serde_json::Number;

use crate::error::Result;

/// Reserved token standing in for `Value::Missing` inside encoded text.
pub const MISSING_SENTINEL: &str = "__UNDEFINED__";

// == Value ==
/// An opaque stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing field, distinct from `Null`
    #[default]
    Missing,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    // == To JSON ==
    /// Converts to a JSON tree, writing `Missing` as the sentinel string.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Missing => serde_json::Value::String(MISSING_SENTINEL.to_string()),
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) if s == MISSING_SENTINEL => Value::Missing,
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

// == Serialize ==
/// Encodes a value as JSON text.
pub fn serialize(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&value.to_json())?)
}

// == Deserialize ==
/// Decodes JSON text produced by [`serialize`].
pub fn deserialize(text: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from(json))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;

    #[test]
    fn test_missing_is_encoded_as_sentinel() {
        assert_eq!(serialize(&Value::Missing).unwrap(), "\"__UNDEFINED__\"");
        assert_eq!(serialize(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn test_missing_and_null_stay_distinct() {
        let value = Value::Array(vec![Value::Missing, Value::Null]);
        let decoded = deserialize(&serialize(&value).unwrap()).unwrap();

        assert_eq!(decoded, value);
    }

    #[test]
    fn test_nested_roundtrip() {
        let value = Value::from(json!({
            "a": "string",
            "b": 42,
            "c": [null, "string", 4.5, true, {"d": "__UNDEFINED__"}],
        }));

        let decoded = deserialize(&serialize(&value).unwrap()).unwrap();
        assert_eq!(decoded, value);

        match decoded {
            Value::Object(fields) => match &fields["c"] {
                Value::Array(items) => match &items[4] {
                    Value::Object(inner) => assert!(inner["d"].is_missing()),
                    other => panic!("unexpected {:?}", other),
                },
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sentinel_in_user_data_collides() {
        // Known limitation: the sentinel string cannot be stored as itself.
        let value = Value::from(MISSING_SENTINEL);
        let decoded = deserialize(&serialize(&value).unwrap()).unwrap();
        assert_eq!(decoded, Value::Missing);
    }

    #[test]
    fn test_malformed_payload() {
        let result = deserialize("{not json");
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert_eq!(Value::from(1.5), Value::from(json!(1.5)));
    }
}
