//! Value coercion
//!
//! `coerce` takes a descriptor and a raw input and produces a conforming
//! typed value or fails with a diagnostic error. The rules are evaluated in
//! a fixed precedence order:
//!
//! 1. null handling (nullability check)
//! 2. `mixed` wrapping
//! 3. primitive targets (strict match, or the lenient conversion table)
//! 4. container targets (pass-through, element-wise build, scalar promotion)
//! 5. record targets (pass-through or bulk construction)
//!
//! Coercion never mutates its input; containers and records are rebuilt.

use crate::container::{TypedDict, TypedList};
use crate::convert::plain_to_mixed;
use crate::registry::Engine;
use crate::value::{Raw, Value};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use strut_diagnostics::{Result, SchemaError};
use strut_types::{TypeDescriptor, TypeKind, mixed_element};

pub(crate) fn coerce(engine: &Engine, descriptor: &TypeDescriptor, raw: Raw) -> Result<Value> {
    if raw.is_null() {
        if descriptor.admits_null() {
            return Ok(Value::Null);
        }
        return Err(SchemaError::NotNullable {
            expected: descriptor.to_string(),
        });
    }

    match &descriptor.kind {
        TypeKind::Mixed => Ok(coerce_mixed(engine, raw)),
        TypeKind::Int | TypeKind::Float | TypeKind::String | TypeKind::Bool => {
            coerce_primitive(engine, descriptor, raw)
        }
        TypeKind::List => coerce_into_list(engine, descriptor, raw),
        TypeKind::Dict => coerce_into_dict(engine, descriptor, raw),
        TypeKind::Record(class) => coerce_into_record(engine, descriptor, class, raw),
    }
}

/// Plain lists and keyed structures become mixed containers; everything
/// else passes through unchanged.
fn coerce_mixed(engine: &Engine, raw: Raw) -> Value {
    match raw {
        Raw::Plain(json) => plain_to_mixed(engine, json),
        Raw::Typed(value) => value,
    }
}

/// Scalar view of a raw input, shared by the primitive rules
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn scalar_view(raw: &Raw) -> Option<Scalar> {
    match raw {
        Raw::Plain(JsonValue::Bool(b)) => Some(Scalar::Bool(*b)),
        Raw::Plain(JsonValue::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Some(Scalar::Int(i))
            } else {
                n.as_f64().map(Scalar::Float)
            }
        }
        Raw::Plain(JsonValue::String(s)) => Some(Scalar::Str(s.clone())),
        Raw::Typed(Value::Bool(b)) => Some(Scalar::Bool(*b)),
        Raw::Typed(Value::Int(i)) => Some(Scalar::Int(*i)),
        Raw::Typed(Value::Float(f)) => Some(Scalar::Float(*f)),
        Raw::Typed(Value::String(s)) => Some(Scalar::Str(s.clone())),
        _ => None,
    }
}

fn coerce_primitive(engine: &Engine, descriptor: &TypeDescriptor, raw: Raw) -> Result<Value> {
    let mismatch = || {
        log::trace!(
            "primitive coercion failed: expected {descriptor}, found {}",
            raw.kind_name()
        );
        SchemaError::mismatch(descriptor.to_string(), raw.kind_name())
    };
    let scalar = scalar_view(&raw).ok_or_else(mismatch)?;
    let config = engine.config();

    if config.strict_type_checking {
        return match (&descriptor.kind, scalar) {
            (TypeKind::Int, Scalar::Int(i)) => Ok(Value::Int(i)),
            (TypeKind::Float, Scalar::Float(f)) => Ok(Value::Float(f)),
            // Numeric widening; the reverse still fails under strictness.
            (TypeKind::Float, Scalar::Int(i)) => Ok(Value::Float(i as f64)),
            (TypeKind::String, Scalar::Str(s)) => Ok(Value::String(s)),
            (TypeKind::Bool, Scalar::Bool(b)) => Ok(Value::Bool(b)),
            _ => Err(mismatch()),
        };
    }

    match (&descriptor.kind, scalar) {
        (TypeKind::Int, Scalar::Int(i)) => Ok(Value::Int(i)),
        (TypeKind::Int, Scalar::Float(f)) if f.is_finite() => Ok(Value::Int(f.trunc() as i64)),
        (TypeKind::Int, Scalar::Bool(b)) => Ok(Value::Int(i64::from(b))),
        (TypeKind::Int, Scalar::Str(s)) => {
            if s.is_empty() && config.empty_string_is_zero {
                return Ok(Value::Int(0));
            }
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            match s.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Int(f.trunc() as i64)),
                _ => Err(mismatch()),
            }
        }

        (TypeKind::Float, Scalar::Float(f)) => Ok(Value::Float(f)),
        (TypeKind::Float, Scalar::Int(i)) => Ok(Value::Float(i as f64)),
        (TypeKind::Float, Scalar::Bool(b)) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        (TypeKind::Float, Scalar::Str(s)) => {
            if s.is_empty() && config.empty_string_is_zero {
                return Ok(Value::Float(0.0));
            }
            match s.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(mismatch()),
            }
        }

        (TypeKind::Bool, Scalar::Bool(b)) => Ok(Value::Bool(b)),
        (TypeKind::Bool, Scalar::Int(i)) => Ok(Value::Bool(i != 0)),
        (TypeKind::Bool, Scalar::Float(f)) => Ok(Value::Bool(f != 0.0)),
        (TypeKind::Bool, Scalar::Str(s)) => {
            if s.is_empty() && config.empty_string_is_zero {
                return Ok(Value::Bool(false));
            }
            // Only the recognized literal tokens convert; "1"/"yes" do not.
            if s.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if s.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(mismatch())
            }
        }

        (TypeKind::String, Scalar::Str(s)) => Ok(Value::String(s)),
        (TypeKind::String, Scalar::Int(i)) => Ok(Value::String(i.to_string())),
        (TypeKind::String, Scalar::Float(f)) => Ok(Value::String(f.to_string())),
        (TypeKind::String, Scalar::Bool(b)) => {
            Ok(Value::String(if b { "true" } else { "false" }.to_string()))
        }

        _ => Err(mismatch()),
    }
}

fn coerce_into_list(engine: &Engine, descriptor: &TypeDescriptor, raw: Raw) -> Result<Value> {
    // Bracket-less descriptors and hand-built ones without a subtype
    // admit mixed elements.
    let element = descriptor.element().cloned().unwrap_or_else(mixed_element);

    match raw {
        // An already-validated container of the same element type is
        // accepted as-is; its elements are not re-coerced.
        Raw::Typed(Value::List(list)) if list.element_type() == element.as_ref() => {
            Ok(Value::List(list))
        }
        Raw::Typed(Value::List(list)) => {
            let mut rebuilt = TypedList::new(engine, element.clone());
            for value in list.values() {
                rebuilt.push(value.clone())?;
            }
            Ok(Value::List(rebuilt))
        }
        Raw::Plain(JsonValue::Array(items)) => {
            let mut list = TypedList::new(engine, element.clone());
            for item in items {
                list.push(item)?;
            }
            Ok(Value::List(list))
        }
        raw => {
            if engine.config().container_promotion_enabled() && scalar_view(&raw).is_some() {
                let mut list = TypedList::new(engine, element.clone());
                list.push(raw)?;
                return Ok(Value::List(list));
            }
            Err(SchemaError::mismatch(descriptor.to_string(), raw.kind_name()))
        }
    }
}

fn coerce_into_dict(engine: &Engine, descriptor: &TypeDescriptor, raw: Raw) -> Result<Value> {
    let element = descriptor.element().cloned().unwrap_or_else(mixed_element);

    match raw {
        Raw::Typed(Value::Dict(dict)) if dict.element_type() == element.as_ref() => {
            Ok(Value::Dict(dict))
        }
        Raw::Typed(Value::Dict(dict)) => {
            let mut rebuilt = TypedDict::new(engine, element.clone());
            for (key, value) in dict.iter() {
                rebuilt.insert(key, value.clone())?;
            }
            Ok(Value::Dict(rebuilt))
        }
        Raw::Plain(JsonValue::Object(entries)) => {
            let mut dict = TypedDict::new(engine, element.clone());
            for (key, item) in entries {
                dict.insert(&key, item)?;
            }
            Ok(Value::Dict(dict))
        }
        raw => {
            if engine.config().container_promotion_enabled() && scalar_view(&raw).is_some() {
                let mut dict = TypedDict::new(engine, element.clone());
                dict.insert("0", raw)?;
                return Ok(Value::Dict(dict));
            }
            Err(SchemaError::mismatch(descriptor.to_string(), raw.kind_name()))
        }
    }
}

fn coerce_into_record(
    engine: &Engine,
    descriptor: &TypeDescriptor,
    class: &str,
    raw: Raw,
) -> Result<Value> {
    match raw {
        // Exact declaring type passes through.
        Raw::Typed(Value::Record(record)) if record.class_name() == class => {
            Ok(Value::Record(record))
        }
        Raw::Plain(JsonValue::Object(entries)) => {
            let bag: IndexMap<String, Raw> = entries
                .into_iter()
                .map(|(key, item)| (key, Raw::Plain(item)))
                .collect();
            let record = engine.construct_record(class, bag, false)?;
            Ok(Value::Record(record))
        }
        Raw::Typed(Value::Dict(dict)) => {
            let bag: IndexMap<String, Raw> = dict
                .iter()
                .map(|(key, value)| (key.to_string(), Raw::Typed(value.clone())))
                .collect();
            let record = engine.construct_record(class, bag, false)?;
            Ok(Value::Record(record))
        }
        raw => Err(SchemaError::mismatch(descriptor.to_string(), raw.kind_name())),
    }
}
