//! Typed-to-plain conversion
//!
//! The inverse of coercion: walks a typed value back down to plain nested
//! JSON data. Record conversion goes through the record read contract, so
//! uninitialized attributes surface the same errors (or nulls) a direct
//! read would.

use crate::container::{TypedDict, TypedList};
use crate::registry::Engine;
use crate::value::Value;
use serde_json::Value as JsonValue;
use strut_diagnostics::Result;
use strut_types::mixed_element;

/// Convert a typed value to plain nested data
pub fn to_plain(value: &Value) -> Result<JsonValue> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::from(*b)),
        Value::Int(i) => Ok(JsonValue::from(*i)),
        Value::Float(f) => Ok(JsonValue::from(*f)),
        Value::String(s) => Ok(JsonValue::from(s.as_str())),
        Value::List(list) => list.to_plain(),
        Value::Dict(dict) => dict.to_plain(),
        Value::Record(record) => record.to_plain(),
    }
}

/// Wrap plain data as a `mixed` value
///
/// Lists and keyed structures become `mixed` containers recursively;
/// scalars pass through. Infallible: every JSON shape has a mixed form.
pub(crate) fn plain_to_mixed(engine: &Engine, json: JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(items) => {
            let values = items
                .into_iter()
                .map(|item| plain_to_mixed(engine, item))
                .collect();
            Value::List(TypedList::from_parts(engine.clone(), mixed_element(), values))
        }
        JsonValue::Object(entries) => {
            let values = entries
                .into_iter()
                .map(|(key, item)| (key, plain_to_mixed(engine, item)))
                .collect();
            Value::Dict(TypedDict::from_parts(engine.clone(), mixed_element(), values))
        }
    }
}
