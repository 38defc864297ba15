#![deny(missing_docs)]

//! # Reflection
//!
//! The single seam between the compiler and whatever mechanism turns a payload
//! type into a structural schema. The compiler only sees [`Reflector`]; the
//! `schemars`-backed [`SchemarsReflector`] is the default implementation.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use schemars::generate::SchemaSettings;
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Opaque handle to a request or response payload type.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    name: fn() -> Cow<'static, str>,
    subschema: fn(&mut SchemaGenerator) -> Schema,
}

impl TypeDescriptor {
    /// Describes `T`.
    pub fn of<T: JsonSchema + ?Sized>() -> Self {
        Self {
            name: T::schema_name,
            subschema: SchemaGenerator::subschema_for::<T>,
        }
    }

    /// The type name as assigned by the reflection mechanism.
    pub fn name(&self) -> Cow<'static, str> {
        (self.name)()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name()).finish()
    }
}

/// Structural description of one payload type.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    /// Root schema. Named types are a `$ref` into `definitions`.
    pub root: Value,
    /// Named sub-definitions keyed by type name, referenced as `#/$defs/<name>`.
    pub definitions: IndexMap<String, Value>,
}

/// Turns a payload type into a structural schema.
pub trait Reflector {
    /// Reflects `descriptor` into its root schema and named definitions.
    fn reflect(&self, descriptor: &TypeDescriptor) -> AppResult<Reflection>;
}

/// A [`Reflector`] backed by `schemars`.
#[derive(Debug, Clone)]
pub struct SchemarsReflector {
    settings: SchemaSettings,
}

impl SchemarsReflector {
    /// Creates a reflector with custom generator settings.
    ///
    /// The settings must keep definitions under `/$defs`.
    pub fn new(settings: SchemaSettings) -> Self {
        Self { settings }
    }
}

impl Default for SchemarsReflector {
    fn default() -> Self {
        Self::new(SchemaSettings::draft2020_12())
    }
}

impl Reflector for SchemarsReflector {
    fn reflect(&self, descriptor: &TypeDescriptor) -> AppResult<Reflection> {
        let mut generator = self.settings.clone().into_generator();
        let root = (descriptor.subschema)(&mut generator);
        let root = serde_json::to_value(&root).map_err(|e| {
            AppError::Reflection(format!("Failed to encode schema for {}: {}", descriptor.name(), e))
        })?;

        let definitions = generator
            .definitions()
            .iter()
            .map(|(name, definition)| (name.clone(), definition.clone()))
            .collect();

        Ok(Reflection { root, definitions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Owner {
        id: i64,
        pets: Vec<Pet>,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Pet {
        name: String,
    }

    #[test]
    fn test_named_root_is_reference() {
        let reflection = SchemarsReflector::default()
            .reflect(&TypeDescriptor::of::<Owner>())
            .unwrap();

        assert_eq!(reflection.root, json!({ "$ref": "#/$defs/Owner" }));
        assert_eq!(reflection.definitions.len(), 2);
        assert!(reflection.definitions.contains_key("Pet"));
        assert_eq!(
            reflection.definitions["Owner"]["properties"]["pets"]["items"],
            json!({ "$ref": "#/$defs/Pet" })
        );
    }

    #[test]
    fn test_anonymous_root_is_inline() {
        let reflection = SchemarsReflector::default()
            .reflect(&TypeDescriptor::of::<Vec<Pet>>())
            .unwrap();

        assert_eq!(reflection.root["type"], json!("array"));
        assert_eq!(reflection.root["items"], json!({ "$ref": "#/$defs/Pet" }));
        assert!(reflection.definitions.contains_key("Pet"));
    }

    #[test]
    fn test_descriptor_name() {
        assert_eq!(TypeDescriptor::of::<Pet>().name(), "Pet");
        assert_eq!(format!("{:?}", TypeDescriptor::of::<Pet>()), "TypeDescriptor(\"Pet\")");
    }
}
