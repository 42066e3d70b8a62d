//! Helpers for JSON stored in preferences.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert a JSON array into a vector of `T`.
///
/// Fails if `value` is not an array or any element does not convert.
pub fn to_vec<T: DeserializeOwned>(value: &Value) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(Error::json_type("array", kind(value)));
    };
    items
        .iter()
        .map(|item| <T as serde::Deserialize>::deserialize(item).map_err(Error::from))
        .collect()
}

/// The value under `key`, or `None` when the key is missing.
///
/// An explicit `null` comes back as `Some(&Value::Null)`.
pub fn get_nullable<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key)
}

/// Parse `text` as a JSON object.
pub fn parse_object(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(text)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::json_type("object", kind(&other))),
    }
}
