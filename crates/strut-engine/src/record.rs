//! Typed records
//!
//! A [`Record`] is an instance of a registered schema: each declared
//! attribute owns a slot that is either unset or holds a coerced value
//! (an explicit null under a nullable descriptor is a held value, distinct
//! from unset).

use crate::registry::{CompiledSchema, Engine};
use crate::value::{Raw, Value};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use strut_diagnostics::{Result, SchemaError};
use strut_types::{DefaultValue, TypeDescriptor, TypeKind};

/// State of one attribute slot
#[derive(Debug, Clone, PartialEq)]
pub enum AttrState {
    /// No value has ever been assigned
    Unset,
    /// A coerced value is held; `Set(Value::Null)` is the explicit null
    Set(Value),
}

impl AttrState {
    /// Check if the slot holds a value
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}

/// Schema-bound keyed object with three-state attribute slots
#[derive(Debug, Clone)]
pub struct Record {
    engine: Engine,
    schema: Arc<CompiledSchema>,
    slots: IndexMap<String, AttrState>,
}

impl Record {
    /// Bulk construction against a compiled schema.
    ///
    /// Attributes are processed in declaration order, base attributes
    /// first. A failure aborts construction; attributes processed before
    /// the failing one are not rolled back (the partially-built record is
    /// dropped with the error).
    pub(crate) fn construct(
        engine: &Engine,
        schema: Arc<CompiledSchema>,
        mut bag: IndexMap<String, Raw>,
        strict_keys: bool,
    ) -> Result<Self> {
        if strict_keys {
            for key in bag.keys() {
                if !schema.attributes.contains_key(key) {
                    return Err(SchemaError::unknown_attribute(&schema.name, key));
                }
            }
        }

        let mut record = Self {
            engine: engine.clone(),
            schema: Arc::clone(&schema),
            slots: schema
                .attributes
                .keys()
                .map(|name| (name.clone(), AttrState::Unset))
                .collect(),
        };

        let config = engine.config();
        for (name, descriptor) in schema.attributes.iter() {
            if let Some(raw) = bag.swap_remove(name) {
                let value = engine.coerce(descriptor, raw)?;
                record.slots[name] = AttrState::Set(value);
                continue;
            }
            if let Some(resolved) = resolve_default(&schema, descriptor, &record) {
                let value = engine.coerce(descriptor, Raw::Plain(resolved))?;
                record.slots[name] = AttrState::Set(value);
                continue;
            }
            if config.materialize_defaults_when_missing {
                let value = zero_value(engine, descriptor)?;
                record.slots[name] = AttrState::Set(value);
                continue;
            }
            if config.allow_uninitialized_state {
                continue;
            }
            return Err(SchemaError::MissingAttribute {
                class: schema.name.clone(),
                name: name.clone(),
            });
        }
        Ok(record)
    }

    /// The declaring class name
    pub fn class_name(&self) -> &str {
        &self.schema.name
    }

    /// The compiled schema this record is bound to
    pub fn schema(&self) -> &Arc<CompiledSchema> {
        &self.schema
    }

    /// Check if `name` is a declared attribute
    pub fn has(&self, name: &str) -> bool {
        self.schema.attributes.contains_key(name)
    }

    fn descriptor(&self, name: &str) -> Result<&Arc<TypeDescriptor>> {
        self.schema
            .attributes
            .get(name)
            .ok_or_else(|| SchemaError::unknown_attribute(&self.schema.name, name))
    }

    /// Read an attribute.
    ///
    /// An unset nullable attribute reads as null when the engine's
    /// `uninitialized_nullable_reads_as_null` policy is on; otherwise an
    /// unset slot is an uninitialized-access error.
    pub fn get(&self, name: &str) -> Result<Value> {
        let descriptor = self.descriptor(name)?;
        match &self.slots[name] {
            AttrState::Set(value) => Ok(value.clone()),
            AttrState::Unset => {
                if self.engine.config().uninitialized_nullable_reads_as_null
                    && descriptor.admits_null()
                {
                    return Ok(Value::Null);
                }
                Err(SchemaError::UninitializedAccess {
                    class: self.schema.name.clone(),
                    name: name.to_string(),
                })
            }
        }
    }

    /// Write an attribute; the value is coerced against the declared type
    pub fn set(&mut self, name: &str, raw: impl Into<Raw>) -> Result<()> {
        let descriptor = Arc::clone(self.descriptor(name)?);
        let value = self.engine.coerce(&descriptor, raw)?;
        self.slots[name] = AttrState::Set(value);
        Ok(())
    }

    /// Return an attribute slot to the unset state
    pub fn unset(&mut self, name: &str) -> Result<()> {
        self.descriptor(name)?;
        self.slots[name] = AttrState::Unset;
        Ok(())
    }

    /// Check if a single attribute slot holds a value
    pub fn is_set(&self, name: &str) -> Result<bool> {
        self.descriptor(name)?;
        Ok(self.slots[name].is_set())
    }

    /// The slot state of a declared attribute
    pub fn attr_state(&self, name: &str) -> Result<&AttrState> {
        self.descriptor(name)?;
        Ok(&self.slots[name])
    }

    /// Check if every declared attribute holds a value
    pub fn is_initialized(&self) -> bool {
        self.slots.values().all(AttrState::is_set)
    }

    /// Names of attributes still unset, in declaration order
    pub fn uninitialized_attributes(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|(_, slot)| !slot.is_set())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Convert to plain nested data.
    ///
    /// Each attribute goes through the read contract, so unset attributes
    /// surface as null or as an uninitialized-access error per policy.
    pub fn to_plain(&self) -> Result<JsonValue> {
        let mut entries = serde_json::Map::new();
        for name in self.schema.attributes.keys() {
            let value = self.get(name)?;
            entries.insert(name.clone(), crate::convert::to_plain(&value)?);
        }
        Ok(JsonValue::Object(entries))
    }

    /// Serialize to compact JSON text
    pub fn to_json(&self) -> Result<String> {
        Ok(self.to_plain()?.to_string())
    }

    /// Serialize to pretty-printed JSON text
    pub fn to_json_pretty(&self) -> Result<String> {
        let plain = self.to_plain()?;
        Ok(serde_json::to_string_pretty(&plain).unwrap_or_else(|_| plain.to_string()))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.slots == other.slots
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.schema.name)?;
        let mut first = true;
        for (name, slot) in &self.slots {
            if let AttrState::Set(value) = slot {
                if !first {
                    write!(f, ",")?;
                }
                write!(f, " {name}: {value}")?;
                first = false;
            }
        }
        write!(f, " }}")
    }
}

/// Resolve a descriptor's deferred default against the owning instance.
///
/// Absence of a default is an ordinary `None`, inspected by the caller;
/// it is never signalled through an error.
fn resolve_default(
    schema: &CompiledSchema,
    descriptor: &TypeDescriptor,
    record: &Record,
) -> Option<JsonValue> {
    match descriptor.default.as_ref()? {
        DefaultValue::Value(literal) => Some(literal.clone()),
        DefaultValue::Thunk(thunk) => Some(thunk()),
        DefaultValue::Named(name) => {
            if let Some(method) = schema.methods.get(name) {
                return Some(method(record));
            }
            schema.functions.get(name).map(|function| function())
        }
    }
}

/// The zero value stored by the materialize-defaults policy
fn zero_value(engine: &Engine, descriptor: &TypeDescriptor) -> Result<Value> {
    if descriptor.admits_null() {
        return Ok(Value::Null);
    }
    if let Some(plain) = descriptor.kind.zero_plain() {
        return engine.coerce(descriptor, Raw::Plain(plain));
    }
    match &descriptor.kind {
        TypeKind::List => engine.coerce(descriptor, Raw::Plain(JsonValue::Array(Vec::new()))),
        TypeKind::Dict => engine.coerce(
            descriptor,
            Raw::Plain(JsonValue::Object(serde_json::Map::new())),
        ),
        TypeKind::Record(class) => {
            let schema = engine.schema(class)?;
            let record = Record::construct(engine, schema, IndexMap::new(), false)?;
            Ok(Value::Record(record))
        }
        kind => Err(SchemaError::mismatch(descriptor.to_string(), kind.token())),
    }
}
