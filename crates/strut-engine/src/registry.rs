//! Schema registry and engine handle
//!
//! The [`Engine`] owns the policy configuration and the schema registry.
//! Declarations are registered up front; the compiled attribute definition
//! of a class is produced lazily on first use and memoized (write-once per
//! key, guarded by the registry lock). The engine is a cheap-clone handle;
//! records and containers keep one so they can reach the coercion engine.

use crate::coerce;
use crate::config::EngineConfig;
use crate::container::{TypedDict, TypedList};
use crate::record::Record;
use crate::value::{Raw, Value};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use strut_diagnostics::{Result, SchemaError};
use strut_types::{DefaultValue, TypeDescriptor, TypeResolver, compile_type};

/// Zero-argument class-level default function
pub type ClassFunction = Arc<dyn Fn() -> JsonValue + Send + Sync>;

/// Instance method invoked against the (possibly partially constructed)
/// owning record during default resolution
pub type InstanceMethod = Arc<dyn Fn(&Record) -> JsonValue + Send + Sync>;

/// One attribute declaration: name, type expression, optional default
#[derive(Debug, Clone)]
struct AttrDecl {
    name: String,
    expr: String,
    default: Option<DefaultValue>,
}

/// Raw schema declaration, registered before compilation
#[derive(Clone)]
pub struct SchemaDef {
    name: String,
    extends: Option<String>,
    attributes: Vec<AttrDecl>,
    methods: IndexMap<String, InstanceMethod>,
    functions: IndexMap<String, ClassFunction>,
}

impl SchemaDef {
    /// Start a declaration for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            attributes: Vec::new(),
            methods: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }

    /// Inherit the attributes of a previously registered schema
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.extends = Some(base.into());
        self
    }

    /// Declare an attribute
    pub fn attr(mut self, name: impl Into<String>, expr: impl Into<String>) -> Self {
        self.attributes.push(AttrDecl {
            name: name.into(),
            expr: expr.into(),
            default: None,
        });
        self
    }

    /// Declare an attribute with a deferred default
    pub fn attr_default(
        mut self,
        name: impl Into<String>,
        expr: impl Into<String>,
        default: DefaultValue,
    ) -> Self {
        self.attributes.push(AttrDecl {
            name: name.into(),
            expr: expr.into(),
            default: Some(default),
        });
        self
    }

    /// Register an instance method usable as a named default
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&Record) -> JsonValue + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Register a class-level zero-argument function usable as a named default
    pub fn function(
        mut self,
        name: impl Into<String>,
        function: impl Fn() -> JsonValue + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }
}

impl fmt::Debug for SchemaDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDef")
            .field("name", &self.name)
            .field("extends", &self.extends)
            .field("attributes", &self.attributes)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Compiled, inheritance-merged attribute definition of one class
pub struct CompiledSchema {
    /// Class name
    pub name: String,
    /// Attribute name to descriptor, declaration order, base first
    pub attributes: IndexMap<String, Arc<TypeDescriptor>>,
    /// Named instance methods, base methods merged in
    pub(crate) methods: IndexMap<String, InstanceMethod>,
    /// Named class functions, base functions merged in
    pub(crate) functions: IndexMap<String, ClassFunction>,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .finish()
    }
}

struct SchemaEntry {
    def: Arc<SchemaDef>,
    compiled: Option<Arc<CompiledSchema>>,
}

struct EngineInner {
    config: EngineConfig,
    schemas: RwLock<IndexMap<String, SchemaEntry>>,
}

/// Schema engine handle
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schemas = self.inner.schemas.read();
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("schemas", &schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Engine {
    /// Create an engine with the given policy configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                schemas: RwLock::new(IndexMap::new()),
            }),
        }
    }

    /// The policy configuration
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Register a schema declaration
    pub fn register(&self, def: SchemaDef) -> Result<()> {
        if !is_identifier(&def.name) {
            return Err(SchemaError::invalid_expression(
                &def.name,
                "schema name must be an identifier",
            ));
        }
        let mut schemas = self.inner.schemas.write();
        if schemas.contains_key(&def.name) {
            return Err(SchemaError::DuplicateType {
                name: def.name.clone(),
            });
        }
        schemas.insert(
            def.name.clone(),
            SchemaEntry {
                def: Arc::new(def),
                compiled: None,
            },
        );
        Ok(())
    }

    /// The compiled definition of `class`, compiling it on first use
    pub fn schema(&self, class: &str) -> Result<Arc<CompiledSchema>> {
        let mut stack = Vec::new();
        self.compiled(class, &mut stack)
    }

    fn compiled(&self, class: &str, stack: &mut Vec<String>) -> Result<Arc<CompiledSchema>> {
        {
            let schemas = self.inner.schemas.read();
            match schemas.get(class) {
                Some(entry) => {
                    if let Some(compiled) = &entry.compiled {
                        return Ok(Arc::clone(compiled));
                    }
                }
                None => {
                    return Err(SchemaError::UnknownType {
                        name: class.to_string(),
                    });
                }
            }
        }

        if stack.iter().any(|name| name == class) {
            return Err(SchemaError::CyclicInheritance {
                class: class.to_string(),
            });
        }
        stack.push(class.to_string());

        let def = {
            let schemas = self.inner.schemas.read();
            Arc::clone(&schemas[class].def)
        };

        let base = match &def.extends {
            Some(base_name) => Some(self.compiled(base_name, stack)?),
            None => None,
        };

        let mut attributes = base
            .as_ref()
            .map(|b| b.attributes.clone())
            .unwrap_or_default();
        let mut methods = base.as_ref().map(|b| b.methods.clone()).unwrap_or_default();
        let mut functions = base
            .as_ref()
            .map(|b| b.functions.clone())
            .unwrap_or_default();

        for decl in &def.attributes {
            let mut descriptor = compile_type(&decl.expr, self)?;
            if let Some(default) = &decl.default {
                descriptor = descriptor.with_default(default.clone());
            }
            let descriptor = Arc::new(descriptor);

            if let Some(inherited) = attributes.get(&decl.name) {
                if inherited.as_ref() != descriptor.as_ref() {
                    return Err(SchemaError::AttributeShadow {
                        class: def.name.clone(),
                        attribute: decl.name.clone(),
                        base: base
                            .as_ref()
                            .map(|b| b.name.clone())
                            .unwrap_or_else(|| def.name.clone()),
                    });
                }
            }
            // Redeclaration with an equal descriptor keeps the inherited
            // position in declaration order.
            attributes.insert(decl.name.clone(), descriptor);
        }
        for (name, method) in &def.methods {
            methods.insert(name.clone(), Arc::clone(method));
        }
        for (name, function) in &def.functions {
            functions.insert(name.clone(), Arc::clone(function));
        }

        let compiled = Arc::new(CompiledSchema {
            name: def.name.clone(),
            attributes,
            methods,
            functions,
        });
        log::debug!(
            "compiled schema {} ({} attributes)",
            compiled.name,
            compiled.attributes.len()
        );

        stack.pop();

        let mut schemas = self.inner.schemas.write();
        let entry = &mut schemas[class];
        match &entry.compiled {
            // Another caller won the race; its result is equivalent.
            Some(existing) => Ok(Arc::clone(existing)),
            None => {
                entry.compiled = Some(Arc::clone(&compiled));
                Ok(compiled)
            }
        }
    }

    /// Compile a type expression against this engine's registered schemas
    pub fn compile_type(&self, expr: &str) -> Result<TypeDescriptor> {
        compile_type(expr, self)
    }

    /// Coerce a raw value against a descriptor
    pub fn coerce(&self, descriptor: &TypeDescriptor, raw: impl Into<Raw>) -> Result<Value> {
        coerce::coerce(self, descriptor, raw.into())
    }

    pub(crate) fn construct_record(
        &self,
        class: &str,
        bag: IndexMap<String, Raw>,
        strict_keys: bool,
    ) -> Result<Record> {
        let schema = self.schema(class)?;
        Record::construct(self, schema, bag, strict_keys)
    }

    /// Direct keyed construction with no supplied values; defaults and the
    /// uninitialized-state policies apply
    pub fn new_record(&self, class: &str) -> Result<Record> {
        self.construct_record(class, IndexMap::new(), false)
    }

    /// Construct a record from a plain keyed structure.
    ///
    /// With `strict` set, input keys absent from the compiled definition
    /// are rejected instead of ignored.
    pub fn record_from_plain(&self, class: &str, data: JsonValue, strict: bool) -> Result<Record> {
        match data {
            JsonValue::Object(entries) => {
                let bag = entries
                    .into_iter()
                    .map(|(key, item)| (key, Raw::Plain(item)))
                    .collect();
                self.construct_record(class, bag, strict)
            }
            other => Err(SchemaError::mismatch(class, Raw::Plain(other).kind_name())),
        }
    }

    /// Construct a record from a sequence of `(name, value)` pairs;
    /// later pairs overwrite earlier ones
    pub fn record_from_pairs<I>(&self, class: &str, pairs: I) -> Result<Record>
    where
        I: IntoIterator<Item = (String, JsonValue)>,
    {
        let bag = pairs
            .into_iter()
            .map(|(key, item)| (key, Raw::Plain(item)))
            .collect();
        self.construct_record(class, bag, false)
    }

    /// Empty typed list with the element type given as a type expression
    pub fn list(&self, element_expr: &str) -> Result<TypedList> {
        let element = Arc::new(self.compile_type(element_expr)?);
        Ok(TypedList::new(self, element))
    }

    /// Typed list built from a plain sequence
    pub fn list_from_plain(&self, element_expr: &str, data: JsonValue) -> Result<TypedList> {
        let element = Arc::new(self.compile_type(element_expr)?);
        TypedList::from_plain(self, element, data)
    }

    /// Empty typed dict with the element type given as a type expression
    pub fn dict(&self, element_expr: &str) -> Result<TypedDict> {
        let element = Arc::new(self.compile_type(element_expr)?);
        Ok(TypedDict::new(self, element))
    }

    /// Typed dict built from a plain keyed structure
    pub fn dict_from_plain(&self, element_expr: &str, data: JsonValue) -> Result<TypedDict> {
        let element = Arc::new(self.compile_type(element_expr)?);
        TypedDict::from_plain(self, element, data)
    }
}

impl TypeResolver for Engine {
    fn contains_type(&self, name: &str) -> bool {
        self.inner.schemas.read().contains_key(name)
    }
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
