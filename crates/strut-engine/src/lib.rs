//! strut coercion engine
//!
//! Runtime half of the schema engine:
//! - [`Engine`]: schema registry + policy configuration handle
//! - coercion of plain JSON data against compiled [`TypeDescriptor`]s
//! - [`TypedList`] / [`TypedDict`]: containers with a shared element type
//! - [`Record`]: schema-bound objects with three-state attribute slots
//! - [`to_plain`]: recursive conversion back to plain nested data
//!
//! ```
//! use serde_json::json;
//! use strut_engine::{Engine, SchemaDef};
//!
//! # fn main() -> strut_diagnostics::Result<()> {
//! let engine = Engine::default();
//! engine.register(
//!     SchemaDef::new("User")
//!         .attr("id", "int")
//!         .attr("name", "string")
//!         .attr("age", "?int"),
//! )?;
//!
//! let user = engine.record_from_plain("User", json!({"id": 1, "name": "A"}), false)?;
//! assert_eq!(user.get("id")?.as_int(), Some(1));
//! assert!(user.get("age")?.is_null());
//! # Ok(())
//! # }
//! ```
//!
//! [`TypeDescriptor`]: strut_types::TypeDescriptor

mod coerce;
mod config;
mod container;
mod convert;
mod record;
mod registry;
mod value;

pub use config::EngineConfig;
pub use container::{TypedDict, TypedList};
pub use convert::to_plain;
pub use record::{AttrState, Record};
pub use registry::{ClassFunction, CompiledSchema, Engine, InstanceMethod, SchemaDef};
pub use value::{Raw, Value};
