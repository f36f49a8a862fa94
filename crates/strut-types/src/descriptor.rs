//! Type descriptors
//!
//! A [`TypeDescriptor`] is the compiled, immutable form of a declared type
//! expression. Descriptors are built once per declaring schema and shared
//! across instances behind `Arc`.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde::ser::SerializeStruct;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// The kind of value a descriptor admits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name")]
pub enum TypeKind {
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Unicode string
    String,
    /// Boolean
    Bool,
    /// Any value; implicitly nullable
    Mixed,
    /// Ordered sequence with contiguous integer keys
    List,
    /// Ordered mapping with string keys
    Dict,
    /// Reference to a registered record schema
    Record(std::string::String),
}

impl TypeKind {
    /// Check if this is a primitive kind
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::String | Self::Bool)
    }

    /// Check if this is a container kind
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List | Self::Dict)
    }

    /// The grammar token for this kind (record kinds yield the class name)
    pub fn token(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Mixed => "mixed",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Record(name) => name,
        }
    }

    /// The zero value for a primitive kind, as plain data
    ///
    /// Containers and records have no plain zero form; the engine builds
    /// empty containers and empty-bag records for those.
    pub fn zero_plain(&self) -> Option<JsonValue> {
        match self {
            Self::Int => Some(JsonValue::from(0i64)),
            Self::Float => Some(JsonValue::from(0.0f64)),
            Self::String => Some(JsonValue::from("")),
            Self::Bool => Some(JsonValue::from(false)),
            Self::Mixed => Some(JsonValue::Null),
            Self::List | Self::Dict | Self::Record(_) => None,
        }
    }
}

/// Deferred default for an attribute slot
///
/// Resolution happens at assignment time, against the owning instance:
/// a literal is used as-is, a thunk is invoked, and a named reference is
/// looked up in the declaring schema's method/function tables.
pub enum DefaultValue {
    /// Literal plain value
    Value(JsonValue),
    /// Zero-argument callable evaluated at each resolution
    Thunk(Arc<dyn Fn() -> JsonValue + Send + Sync>),
    /// Name of an instance method or class-level function
    Named(std::string::String),
}

impl Clone for DefaultValue {
    fn clone(&self) -> Self {
        match self {
            Self::Value(v) => Self::Value(v.clone()),
            Self::Thunk(f) => Self::Thunk(Arc::clone(f)),
            Self::Named(n) => Self::Named(n.clone()),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Thunk(_) => f.write_str("Thunk(<fn>)"),
            Self::Named(n) => f.debug_tuple("Named").field(n).finish(),
        }
    }
}

impl DefaultValue {
    /// Compare two defaults for declaration identity
    ///
    /// Literals compare by value, named references by name, thunks by
    /// pointer identity.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Thunk(a), Self::Thunk(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Compiled, immutable description of an expected value shape
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Kind of value admitted
    pub kind: TypeKind,
    /// Whether an explicit null is admitted
    pub nullable: bool,
    /// Element descriptor; present iff `kind` is `List` or `Dict`
    pub subtype: Option<Arc<TypeDescriptor>>,
    /// Deferred default, absent unless declared
    pub default: Option<DefaultValue>,
}

static MIXED_ELEMENT: Lazy<Arc<TypeDescriptor>> =
    Lazy::new(|| Arc::new(TypeDescriptor::mixed()));

/// The shared `mixed` element descriptor used by bracket-less `list`/`dict`
pub fn mixed_element() -> Arc<TypeDescriptor> {
    Arc::clone(&MIXED_ELEMENT)
}

impl TypeDescriptor {
    fn leaf(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
            subtype: None,
            default: None,
        }
    }

    /// Create an `int` descriptor
    pub fn int() -> Self {
        Self::leaf(TypeKind::Int)
    }

    /// Create a `float` descriptor
    pub fn float() -> Self {
        Self::leaf(TypeKind::Float)
    }

    /// Create a `string` descriptor
    pub fn string() -> Self {
        Self::leaf(TypeKind::String)
    }

    /// Create a `bool` descriptor
    pub fn boolean() -> Self {
        Self::leaf(TypeKind::Bool)
    }

    /// Create a `mixed` descriptor; mixed is always nullable
    pub fn mixed() -> Self {
        Self {
            kind: TypeKind::Mixed,
            nullable: true,
            subtype: None,
            default: None,
        }
    }

    /// Create a `list[...]` descriptor
    pub fn list(element: TypeDescriptor) -> Self {
        Self::list_of(Arc::new(element))
    }

    /// Create a `list[...]` descriptor sharing an existing element descriptor
    pub fn list_of(element: Arc<TypeDescriptor>) -> Self {
        Self {
            kind: TypeKind::List,
            nullable: false,
            subtype: Some(element),
            default: None,
        }
    }

    /// Create a `dict[...]` descriptor
    pub fn dict(element: TypeDescriptor) -> Self {
        Self::dict_of(Arc::new(element))
    }

    /// Create a `dict[...]` descriptor sharing an existing element descriptor
    pub fn dict_of(element: Arc<TypeDescriptor>) -> Self {
        Self {
            kind: TypeKind::Dict,
            nullable: false,
            subtype: Some(element),
            default: None,
        }
    }

    /// Create a record-reference descriptor
    pub fn record(class: impl Into<std::string::String>) -> Self {
        Self::leaf(TypeKind::Record(class.into()))
    }

    /// Mark this descriptor nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach a deferred default
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Check if this descriptor admits null
    ///
    /// `mixed` admits null regardless of the flag.
    pub fn admits_null(&self) -> bool {
        self.nullable || self.kind == TypeKind::Mixed
    }

    /// Element descriptor for container kinds
    pub fn element(&self) -> Option<&Arc<TypeDescriptor>> {
        self.subtype.as_ref()
    }

    /// Class name for record-reference descriptors
    pub fn record_class(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Record(name) => Some(name),
            _ => None,
        }
    }

    /// Compare including defaults
    ///
    /// `PartialEq` deliberately ignores the default slot; this variant is
    /// what the inheritance merge would use to detect a redefinition that
    /// also changes the default.
    pub fn same_declaration(&self, other: &Self) -> bool {
        if self != other {
            return false;
        }
        match (&self.default, &other.default) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_as(b),
            _ => false,
        }
    }
}

/// Equality over kind, nullability, and (recursively) subtype.
/// The default slot is excluded; see [`TypeDescriptor::same_declaration`].
impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.nullable == other.nullable
            && match (&self.subtype, &other.subtype) {
                (None, None) => true,
                (Some(a), Some(b)) => a.as_ref() == b.as_ref(),
                _ => false,
            }
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable && self.kind != TypeKind::Mixed {
            write!(f, "?")?;
        }
        match (&self.kind, &self.subtype) {
            (TypeKind::List, Some(elem)) => write!(f, "list[{elem}]"),
            (TypeKind::Dict, Some(elem)) => write!(f, "dict[{elem}]"),
            (kind, _) => write!(f, "{}", kind.token()),
        }
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TypeDescriptor", 3)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("nullable", &self.nullable)?;
        state.serialize_field("subtype", &self.subtype.as_deref())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_round_trips_grammar() {
        assert_eq!(TypeDescriptor::int().to_string(), "int");
        assert_eq!(TypeDescriptor::int().nullable().to_string(), "?int");
        assert_eq!(
            TypeDescriptor::list(TypeDescriptor::dict(TypeDescriptor::string()))
                .nullable()
                .to_string(),
            "?list[dict[string]]"
        );
        assert_eq!(TypeDescriptor::mixed().to_string(), "mixed");
        assert_eq!(TypeDescriptor::record("User").to_string(), "User");
    }

    #[test]
    fn test_mixed_admits_null() {
        assert!(TypeDescriptor::mixed().admits_null());
        assert!(!TypeDescriptor::int().admits_null());
        assert!(TypeDescriptor::int().nullable().admits_null());
    }

    #[test]
    fn test_equality_ignores_default() {
        let plain = TypeDescriptor::string();
        let defaulted = TypeDescriptor::string().with_default(DefaultValue::Value(json!("x")));
        assert_eq!(plain, defaulted);
        assert!(!plain.same_declaration(&defaulted));
    }

    #[test]
    fn test_equality_recurses_into_subtype() {
        let a = TypeDescriptor::list(TypeDescriptor::int());
        let b = TypeDescriptor::list(TypeDescriptor::int());
        let c = TypeDescriptor::list(TypeDescriptor::int().nullable());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_default_identity() {
        let lit = DefaultValue::Value(json!(1));
        assert!(lit.same_as(&DefaultValue::Value(json!(1))));
        assert!(!lit.same_as(&DefaultValue::Value(json!(2))));

        let thunk: Arc<dyn Fn() -> JsonValue + Send + Sync> = Arc::new(|| json!("id"));
        let a = DefaultValue::Thunk(Arc::clone(&thunk));
        let b = DefaultValue::Thunk(thunk);
        assert!(a.same_as(&b));
        assert!(!a.same_as(&DefaultValue::Named("id".into())));
    }

    #[test]
    fn test_zero_plain() {
        assert_eq!(TypeKind::Int.zero_plain(), Some(json!(0)));
        assert_eq!(TypeKind::Bool.zero_plain(), Some(json!(false)));
        assert_eq!(TypeKind::List.zero_plain(), None);
    }
}
