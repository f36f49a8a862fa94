//! Schema engine errors

use serde::Serialize;
use thiserror::Error;

/// Result type for all schema engine operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised by type compilation, coercion, and record/container access
#[derive(Debug, Clone, Error, Serialize)]
pub enum SchemaError {
    /// Malformed or unsupported type expression
    #[error("Invalid type expression '{expression}': {message}")]
    InvalidTypeExpression { expression: String, message: String },

    /// Type expression names a record type that is not registered
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    /// Read, write, or unset of an attribute the schema does not declare
    #[error("Unknown attribute '{name}' on {class}")]
    UnknownAttribute { class: String, name: String },

    /// Required attribute absent at construction with no usable default
    #[error("Missing attribute '{name}' on {class}")]
    MissingAttribute { class: String, name: String },

    /// Coercion failure; carries the target type and the actual runtime kind
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Null supplied where the descriptor is not nullable
    #[error("Null is not allowed for non-nullable type {expected}")]
    NotNullable { expected: String },

    /// Read of an attribute that has never been assigned
    #[error("Attribute '{name}' on {class} accessed before initialization")]
    UninitializedAccess { class: String, name: String },

    /// first/last/pop/shift on an empty list container
    #[error("Cannot {operation} an empty container")]
    EmptyContainer { operation: String },

    /// Resolved list index outside the valid range
    #[error("Index {index} out of bounds for container of length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    /// Dict key absent on read or removal
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    /// Inherited attribute redeclared with an incompatible type
    #[error("Attribute '{attribute}' on {class} shadows {base} declaration with an incompatible type")]
    AttributeShadow {
        class: String,
        attribute: String,
        base: String,
    },

    /// Schema extends chain loops back on itself
    #[error("Cyclic inheritance detected while compiling {class}")]
    CyclicInheritance { class: String },

    /// Schema name registered twice
    #[error("Type already registered: {name}")]
    DuplicateType { name: String },
}

impl SchemaError {
    /// Create a type-mismatch error from the expected and found kind names
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid-type-expression error
    pub fn invalid_expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTypeExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-attribute error
    pub fn unknown_attribute(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            class: class.into(),
            name: name.into(),
        }
    }

    /// True for errors produced while compiling a type expression or schema
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTypeExpression { .. }
                | Self::UnknownType { .. }
                | Self::AttributeShadow { .. }
                | Self::CyclicInheritance { .. }
                | Self::DuplicateType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_diagnostics() {
        let err = SchemaError::mismatch("list[int]", "string");
        assert_eq!(err.to_string(), "Type mismatch: expected list[int], found string");

        let err = SchemaError::IndexOutOfBounds { index: -4, length: 3 };
        assert!(err.to_string().contains("-4"));
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_compile_error_classification() {
        assert!(SchemaError::UnknownType { name: "User".into() }.is_compile_error());
        assert!(!SchemaError::mismatch("int", "string").is_compile_error());
    }
}
