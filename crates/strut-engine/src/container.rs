//! Typed containers
//!
//! A container holds values of a single shared element type. Every
//! insertion path goes through the coercion engine; reads hand back
//! already-validated values. [`TypedList`] is keyed by contiguous integer
//! indices (negative indices address from the end), [`TypedDict`] by
//! ordered string keys.

use crate::registry::Engine;
use crate::value::{Raw, Value};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use strut_diagnostics::{Result, SchemaError};
use strut_types::TypeDescriptor;

/// Ordered container with contiguous integer keys
#[derive(Debug, Clone)]
pub struct TypedList {
    engine: Engine,
    element: Arc<TypeDescriptor>,
    values: Vec<Value>,
}

impl TypedList {
    /// Create an empty list with the given element type
    pub fn new(engine: &Engine, element: Arc<TypeDescriptor>) -> Self {
        Self {
            engine: engine.clone(),
            element,
            values: Vec::new(),
        }
    }

    pub(crate) fn from_parts(engine: Engine, element: Arc<TypeDescriptor>, values: Vec<Value>) -> Self {
        Self { engine, element, values }
    }

    /// Build a list from a plain sequence, coercing element by element
    pub fn from_plain(engine: &Engine, element: Arc<TypeDescriptor>, data: JsonValue) -> Result<Self> {
        match data {
            JsonValue::Array(items) => {
                let mut list = Self::new(engine, element);
                for item in items {
                    list.push(item)?;
                }
                Ok(list)
            }
            other => Err(SchemaError::mismatch(
                format!("list[{}]", element),
                Raw::Plain(other).kind_name(),
            )),
        }
    }

    /// The shared element descriptor
    pub fn element_type(&self) -> &TypeDescriptor {
        &self.element
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve an index, mapping negatives from the end.
    /// The resolved position must land in `[0, len)`.
    fn resolve_index(&self, index: i64) -> Result<usize> {
        let length = self.values.len();
        let resolved = if index < 0 {
            index + length as i64
        } else {
            index
        };
        if resolved < 0 || resolved >= length as i64 {
            return Err(SchemaError::IndexOutOfBounds { index, length });
        }
        Ok(resolved as usize)
    }

    /// Read the element at `index`
    pub fn get(&self, index: i64) -> Result<&Value> {
        let position = self.resolve_index(index)?;
        Ok(&self.values[position])
    }

    /// Overwrite the element at an existing `index`
    pub fn set(&mut self, index: i64, raw: impl Into<Raw>) -> Result<()> {
        let position = self.resolve_index(index)?;
        let value = self.engine.coerce(&self.element, raw)?;
        self.values[position] = value;
        Ok(())
    }

    /// Append a value at the next contiguous index
    pub fn push(&mut self, raw: impl Into<Raw>) -> Result<()> {
        let value = self.engine.coerce(&self.element, raw)?;
        self.values.push(value);
        Ok(())
    }

    /// Remove and return the element at `index`; later elements shift down
    pub fn remove(&mut self, index: i64) -> Result<Value> {
        let position = self.resolve_index(index)?;
        Ok(self.values.remove(position))
    }

    /// Remove and return the last element
    pub fn pop(&mut self) -> Result<Value> {
        self.values.pop().ok_or_else(|| SchemaError::EmptyContainer {
            operation: "pop".to_string(),
        })
    }

    /// Remove and return the first element
    pub fn shift(&mut self) -> Result<Value> {
        if self.values.is_empty() {
            return Err(SchemaError::EmptyContainer {
                operation: "shift".to_string(),
            });
        }
        Ok(self.values.remove(0))
    }

    /// Prepend values, coercing each; the prepended block keeps its order
    pub fn unshift<I, R>(&mut self, raws: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<Raw>,
    {
        let mut block = Vec::new();
        for raw in raws {
            block.push(self.engine.coerce(&self.element, raw)?);
        }
        block.append(&mut self.values);
        self.values = block;
        Ok(())
    }

    /// First element; fails on an empty list
    pub fn first(&self) -> Result<&Value> {
        self.values.first().ok_or_else(|| SchemaError::EmptyContainer {
            operation: "first".to_string(),
        })
    }

    /// Last element; fails on an empty list
    pub fn last(&self) -> Result<&Value> {
        self.values.last().ok_or_else(|| SchemaError::EmptyContainer {
            operation: "last".to_string(),
        })
    }

    /// Contiguous subrange as a new list sharing the element type.
    /// Elements are already validated, so they are not re-coerced.
    /// A negative offset resolves from the end; `offset == len` yields an
    /// empty slice.
    pub fn slice(&self, offset: i64, length: Option<usize>) -> Result<Self> {
        let len = self.values.len();
        let start = if offset < 0 { offset + len as i64 } else { offset };
        if start < 0 || start > len as i64 {
            return Err(SchemaError::IndexOutOfBounds {
                index: offset,
                length: len,
            });
        }
        let start = start as usize;
        let end = match length {
            Some(count) => (start + count).min(len),
            None => len,
        };
        Ok(Self::from_parts(
            self.engine.clone(),
            Arc::clone(&self.element),
            self.values[start..end].to_vec(),
        ))
    }

    /// New list with only the elements matching the predicate, reindexed
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Value, usize) -> bool,
    {
        let values = self
            .values
            .iter()
            .enumerate()
            .filter(|(index, value)| predicate(value, *index))
            .map(|(_, value)| value.clone())
            .collect();
        Self::from_parts(self.engine.clone(), Arc::clone(&self.element), values)
    }

    /// New list sorted by the element type's natural ordering (stable)
    pub fn sort(&self) -> Self {
        self.sort_by(Value::natural_cmp)
    }

    /// New list sorted by a comparator (stable); does not mutate in place
    pub fn sort_by<F>(&self, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering,
    {
        let mut values = self.values.clone();
        values.sort_by(|a, b| comparator(a, b));
        Self::from_parts(self.engine.clone(), Arc::clone(&self.element), values)
    }

    /// Iterate the contiguous keys
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.values.len()
    }

    /// Iterate the values
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.values.iter()
    }

    /// Iterate `(index, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Value)> + '_ {
        self.values.iter().enumerate()
    }

    /// Convert to a plain sequence
    pub fn to_plain(&self) -> Result<JsonValue> {
        let mut items = Vec::with_capacity(self.values.len());
        for value in &self.values {
            items.push(crate::convert::to_plain(value)?);
        }
        Ok(JsonValue::Array(items))
    }
}

impl PartialEq for TypedList {
    fn eq(&self, other: &Self) -> bool {
        self.element.as_ref() == other.element.as_ref() && self.values == other.values
    }
}

impl fmt::Display for TypedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

/// Ordered container with string keys
#[derive(Debug, Clone)]
pub struct TypedDict {
    engine: Engine,
    element: Arc<TypeDescriptor>,
    values: IndexMap<String, Value>,
}

impl TypedDict {
    /// Create an empty dict with the given element type
    pub fn new(engine: &Engine, element: Arc<TypeDescriptor>) -> Self {
        Self {
            engine: engine.clone(),
            element,
            values: IndexMap::new(),
        }
    }

    pub(crate) fn from_parts(
        engine: Engine,
        element: Arc<TypeDescriptor>,
        values: IndexMap<String, Value>,
    ) -> Self {
        Self { engine, element, values }
    }

    /// Build a dict from a plain keyed structure, coercing element by element
    pub fn from_plain(engine: &Engine, element: Arc<TypeDescriptor>, data: JsonValue) -> Result<Self> {
        match data {
            JsonValue::Object(entries) => {
                let mut dict = Self::new(engine, element);
                for (key, item) in entries {
                    dict.insert(&key, item)?;
                }
                Ok(dict)
            }
            other => Err(SchemaError::mismatch(
                format!("dict[{}]", element),
                Raw::Plain(other).kind_name(),
            )),
        }
    }

    /// The shared element descriptor
    pub fn element_type(&self) -> &TypeDescriptor {
        &self.element
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the dict is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Read the value under `key`
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.values.get(key).ok_or_else(|| SchemaError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Insert or overwrite the value under `key`
    pub fn insert(&mut self, key: &str, raw: impl Into<Raw>) -> Result<()> {
        let value = self.engine.coerce(&self.element, raw)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Remove and return the value under `key`, preserving entry order
    pub fn remove(&mut self, key: &str) -> Result<Value> {
        self.values
            .shift_remove(key)
            .ok_or_else(|| SchemaError::KeyNotFound {
                key: key.to_string(),
            })
    }

    /// New dict with only the entries matching the predicate
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Value, &str) -> bool,
    {
        let values = self
            .values
            .iter()
            .filter(|(key, value)| predicate(value, key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self::from_parts(self.engine.clone(), Arc::clone(&self.element), values)
    }

    /// Iterate the keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// Iterate the values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.values.values()
    }

    /// Iterate `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Convert to a plain keyed structure
    pub fn to_plain(&self) -> Result<JsonValue> {
        let mut entries = serde_json::Map::new();
        for (key, value) in &self.values {
            entries.insert(key.clone(), crate::convert::to_plain(value)?);
        }
        Ok(JsonValue::Object(entries))
    }
}

impl PartialEq for TypedDict {
    fn eq(&self, other: &Self) -> bool {
        self.element.as_ref() == other.element.as_ref() && self.values == other.values
    }
}

impl fmt::Display for TypedDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, (key, value)) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}
