//! Runtime values
//!
//! [`Value`] is the typed runtime representation produced by the coercion
//! engine; [`Raw`] is the engine's input domain: either plain JSON data or
//! an already-typed value (re-coercing a typed value is the identity).

use crate::container::{TypedDict, TypedList};
use crate::record::Record;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

/// A typed runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// String value
    String(String),
    /// Typed list container
    List(TypedList),
    /// Typed dict container
    Dict(TypedDict),
    /// Schema-bound record instance
    Record(Record),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list container
    pub fn as_list(&self) -> Option<&TypedList> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Try to get as dict container
    pub fn as_dict(&self) -> Option<&TypedDict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Try to get as record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// The runtime kind name used in type-mismatch diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Record(r) => r.class_name(),
        }
    }

    /// Total ordering used by comparator-less container sorting
    ///
    /// Values of the same kind compare naturally (numbers numerically
    /// across int/float, strings lexically, false before true); values of
    /// different kinds compare by a fixed kind rank so the order is total
    /// and the sort stays stable.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        fn rank(value: &Value) -> u8 {
            match value {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Float(_) => 2,
                Value::String(_) => 3,
                Value::List(_) => 4,
                Value::Dict(_) => 5,
                Value::Record(_) => 6,
            }
        }

        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (a, b) if rank(a) == 2 && rank(b) == 2 => {
                let left = a.as_float().unwrap_or(0.0);
                let right = b.as_float().unwrap_or(0.0);
                left.partial_cmp(&right).unwrap_or(Ordering::Equal)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => {
                // Keep a decimal point so floats stay distinguishable
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Self::String(s) => write!(f, "'{s}'"),
            Self::List(l) => l.fmt(f),
            Self::Dict(d) => d.fmt(f),
            Self::Record(r) => r.fmt(f),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Input to the coercion engine
///
/// Plain JSON data and already-typed values enter through the same
/// contract; a typed value that already conforms passes through untouched,
/// which is what makes coercion idempotent.
#[derive(Debug, Clone)]
pub enum Raw {
    /// Plain nested data
    Plain(JsonValue),
    /// Previously coerced value
    Typed(Value),
}

impl Raw {
    /// Check if the input is null (plain or typed)
    pub fn is_null(&self) -> bool {
        match self {
            Self::Plain(json) => json.is_null(),
            Self::Typed(value) => value.is_null(),
        }
    }

    /// The runtime kind name used in type-mismatch diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Plain(json) => match json {
                JsonValue::Null => "null",
                JsonValue::Bool(_) => "bool",
                JsonValue::Number(n) if n.is_i64() || n.is_u64() => "int",
                JsonValue::Number(_) => "float",
                JsonValue::String(_) => "string",
                JsonValue::Array(_) => "list",
                JsonValue::Object(_) => "dict",
            },
            Self::Typed(value) => value.kind_name(),
        }
    }
}

impl From<JsonValue> for Raw {
    fn from(value: JsonValue) -> Self {
        Self::Plain(value)
    }
}

impl From<Value> for Raw {
    fn from(value: Value) -> Self {
        Self::Typed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names() {
        assert_eq!(Raw::from(json!(null)).kind_name(), "null");
        assert_eq!(Raw::from(json!(3)).kind_name(), "int");
        assert_eq!(Raw::from(json!(3.5)).kind_name(), "float");
        assert_eq!(Raw::from(json!("x")).kind_name(), "string");
        assert_eq!(Raw::from(json!([1])).kind_name(), "list");
        assert_eq!(Raw::from(json!({"a": 1})).kind_name(), "dict");
        assert_eq!(Raw::from(Value::Int(1)).kind_name(), "int");
    }

    #[test]
    fn test_natural_cmp_numbers_mix() {
        assert_eq!(Value::Int(2).natural_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.0).natural_cmp(&Value::Int(3)), Ordering::Equal);
        assert_eq!(
            Value::String("a".into()).natural_cmp(&Value::String("b".into())),
            Ordering::Less
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(4).to_string(), "4");
        assert_eq!(Value::Float(4.0).to_string(), "4.0");
        assert_eq!(Value::Float(4.25).to_string(), "4.25");
        assert_eq!(Value::String("hi".into()).to_string(), "'hi'");
    }
}
