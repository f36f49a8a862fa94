//! Error handling for the strut schema engine
//!
//! All failure modes of the engine surface through a single [`SchemaError`]
//! enum. Errors are raised synchronously at the point of violation and are
//! never caught and downgraded inside the engine; coercion and validation
//! are deterministic, so there is no retry path anywhere.

mod error;

pub use error::{Result, SchemaError};
