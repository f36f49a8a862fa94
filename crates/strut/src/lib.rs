//! Runtime schema engine for strictly-typed records
//!
//! strut parses untyped JSON-like data into strictly-typed object graphs,
//! validates every value against a declared schema, and serializes typed
//! objects back to plain data. Schemas are declared as attribute-name to
//! type-expression mappings (`"int"`, `"?list[dict[string]]"`, a record
//! class name); the engine compiles each expression once, then coerces
//! incoming data recursively under a configurable strictness policy.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use strut::{Engine, SchemaDef};
//!
//! # fn main() -> strut::Result<()> {
//! let engine = Engine::default();
//! engine.register(
//!     SchemaDef::new("Address")
//!         .attr("street", "string")
//!         .attr("city", "string"),
//! )?;
//! engine.register(
//!     SchemaDef::new("User")
//!         .attr("id", "int")
//!         .attr("name", "string")
//!         .attr("addresses", "list[Address]"),
//! )?;
//!
//! let user = engine.record_from_plain(
//!     "User",
//!     json!({
//!         "id": 7,
//!         "name": "Ada",
//!         "addresses": [{"street": "1 Main St", "city": "Springfield"}],
//!     }),
//!     false,
//! )?;
//!
//! let addresses = user.get("addresses")?;
//! assert_eq!(addresses.as_list().unwrap().len(), 1);
//! assert_eq!(user.to_plain()?["addresses"][0]["city"], json!("Springfield"));
//! # Ok(())
//! # }
//! ```

// Re-export all public APIs from internal crates
pub use strut_diagnostics as diagnostics;
pub use strut_engine as engine;
pub use strut_types as types;

// Convenience re-exports
pub use strut_diagnostics::{Result, SchemaError};
pub use strut_engine::{
    AttrState, ClassFunction, CompiledSchema, Engine, EngineConfig, InstanceMethod, Raw, Record,
    SchemaDef, TypedDict, TypedList, Value, to_plain,
};
pub use strut_types::{
    DefaultValue, NoCustomTypes, TypeDescriptor, TypeKind, TypeResolver, compile_type,
};
