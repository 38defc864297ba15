#![deny(missing_docs)]

//! # Schema Module
//!
//! - **reflect**: The reflection seam and its `schemars` implementation.
//! - **collector**: Shared definition pool and thin payload references.
//! - **refs**: `$ref` pointer parsing and rewriting.
//! - **translate**: JSON Schema to OpenAPI schema translation.

pub mod collector;
pub mod reflect;
pub mod refs;
pub mod translate;

pub use collector::{SchemaCollector, SchemaPool, SchemaRef};
pub use reflect::{Reflection, Reflector, SchemarsReflector, TypeDescriptor};
pub use translate::{translate_ref, translate_schema};
