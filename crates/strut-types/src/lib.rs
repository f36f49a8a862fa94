//! strut type system
//!
//! This crate defines the compile-time half of the schema engine:
//! - [`TypeDescriptor`] and [`TypeKind`], the structured form of a declared type
//! - [`DefaultValue`], the deferred default slot attached to a descriptor
//! - [`compile_type`], the recursive-descent compiler for the textual
//!   type-expression grammar (`?list[dict[int]]`, `CustomRecord`, ...)
//! - [`TypeResolver`], the lookup seam through which class references in a
//!   type expression are validated against a schema registry

mod descriptor;
mod expr;

pub use descriptor::{DefaultValue, TypeDescriptor, TypeKind, mixed_element};
pub use expr::{NoCustomTypes, TypeResolver, compile_type};
