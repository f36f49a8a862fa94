//! Type-expression compiler
//!
//! Compiles the textual grammar into a [`TypeDescriptor`] tree by recursive
//! descent:
//!
//! ```text
//! type       := '?'? (primitive | 'mixed' | container | classname)
//! primitive  := 'int' | 'float' | 'string' | 'bool'
//! container  := ('list' | 'dict') ('[' type ']')?
//! classname  := identifier naming a registered record type
//! ```
//!
//! A bracket-less `list`/`dict` implies a `mixed` subtype. `mixed` is
//! implicitly nullable and rejects an explicit `?`.

use crate::descriptor::{TypeDescriptor, mixed_element};
use strut_diagnostics::{Result, SchemaError};

/// Lookup seam for class references in type expressions
///
/// Implemented by the schema registry; a leaf identifier is valid iff a
/// schema with that name has been registered. Descriptor compilation never
/// reflects over host types; resolution goes through this capability.
pub trait TypeResolver {
    /// Check whether `name` resolves to a registered record type
    fn contains_type(&self, name: &str) -> bool;
}

/// Resolver that knows no record types; primitives and containers only
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomTypes;

impl TypeResolver for NoCustomTypes {
    fn contains_type(&self, _name: &str) -> bool {
        false
    }
}

/// Compile a type expression into a descriptor tree
pub fn compile_type(expr: &str, resolver: &dyn TypeResolver) -> Result<TypeDescriptor> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::invalid_expression(expr, "empty type expression"));
    }

    let (explicit_nullable, body) = match trimmed.strip_prefix('?') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    if body.is_empty() {
        return Err(SchemaError::invalid_expression(expr, "missing type after '?'"));
    }

    let descriptor = compile_body(expr, body, resolver)?;

    if explicit_nullable {
        if descriptor.kind == crate::TypeKind::Mixed {
            return Err(SchemaError::invalid_expression(
                expr,
                "mixed is implicitly nullable; '?' is not allowed",
            ));
        }
        return Ok(descriptor.nullable());
    }
    Ok(descriptor)
}

fn compile_body(expr: &str, body: &str, resolver: &dyn TypeResolver) -> Result<TypeDescriptor> {
    // Bracket-less container forms imply a mixed subtype.
    match body {
        "list" => return Ok(TypeDescriptor::list_of(mixed_element())),
        "dict" => return Ok(TypeDescriptor::dict_of(mixed_element())),
        _ => {}
    }

    if let Some(inner) = bracketed_subtype(expr, body, "list[")? {
        let element = compile_type(inner, resolver)?;
        return Ok(TypeDescriptor::list(element));
    }
    if let Some(inner) = bracketed_subtype(expr, body, "dict[")? {
        let element = compile_type(inner, resolver)?;
        return Ok(TypeDescriptor::dict(element));
    }

    compile_leaf(expr, body, resolver)
}

/// Extract the subtype substring of `prefix...]` when the outer bracket pair
/// encloses the entire remainder; errors on unbalanced nesting.
fn bracketed_subtype<'a>(
    expr: &str,
    body: &'a str,
    prefix: &str,
) -> Result<Option<&'a str>> {
    if !body.starts_with(prefix) {
        return Ok(None);
    }
    if !body.ends_with(']') {
        return Err(SchemaError::invalid_expression(expr, "missing closing ']'"));
    }

    let mut depth = 0usize;
    for (pos, ch) in body.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                if depth == 0 {
                    return Err(SchemaError::invalid_expression(expr, "unbalanced ']'"));
                }
                depth -= 1;
                if depth == 0 && pos != body.len() - 1 {
                    return Err(SchemaError::invalid_expression(
                        expr,
                        "unexpected characters after closing ']'",
                    ));
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SchemaError::invalid_expression(expr, "missing closing ']'"));
    }

    let inner = &body[prefix.len()..body.len() - 1];
    if inner.trim().is_empty() {
        return Err(SchemaError::invalid_expression(expr, "empty subtype"));
    }
    Ok(Some(inner))
}

fn compile_leaf(expr: &str, token: &str, resolver: &dyn TypeResolver) -> Result<TypeDescriptor> {
    match token {
        "int" => return Ok(TypeDescriptor::int()),
        "float" => return Ok(TypeDescriptor::float()),
        "string" => return Ok(TypeDescriptor::string()),
        "bool" => return Ok(TypeDescriptor::boolean()),
        "mixed" => return Ok(TypeDescriptor::mixed()),
        _ => {}
    }

    if !is_identifier(token) {
        return Err(SchemaError::invalid_expression(
            expr,
            format!("malformed type token '{token}'"),
        ));
    }
    if !resolver.contains_type(token) {
        return Err(SchemaError::UnknownType {
            name: token.to_string(),
        });
    }
    Ok(TypeDescriptor::record(token))
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
