//! Flattening of arbitrary values into the string-only maps the native
//! agent accepts.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// String-keyed, string-valued map as accepted by the native boundary
pub type StringMap = HashMap<String, String>;

/// Strings pass through untouched, anything else becomes compact JSON text.
pub fn serialize_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Serialize every value of `map` with [`serialize_value`].
///
/// Only the first level is walked; nested objects are stringified whole.
pub fn serialize_object(map: &Map<String, Value>) -> StringMap {
    map.iter()
        .map(|(key, value)| (key.clone(), serialize_value(value)))
        .collect()
}
