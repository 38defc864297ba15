#![deny(missing_docs)]

//! # Schema Collection
//!
//! Reflects endpoint payload types and accumulates their named definitions into
//! one shared, name-keyed pool.
//!
//! The pool is last-write-wins: a second definition under an existing name
//! replaces the first, keeping the name's original position. Definitions are
//! never deduplicated by structural equality.

use crate::error::AppResult;
use crate::schema::reflect::{Reflector, TypeDescriptor};
use crate::schema::refs::{definition_name, reference_of};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// Shared, name-keyed collection of structural type definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaPool {
    definitions: IndexMap<String, Value>,
}

impl SchemaPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `definition` under `name`, returning the definition it replaced.
    pub fn insert(&mut self, name: impl Into<String>, definition: Value) -> Option<Value> {
        self.definitions.insert(name.into(), definition)
    }

    /// Looks up a definition by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.definitions.get(name)
    }

    /// Whether a definition named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Definitions in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.definitions.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the pool holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Thin reference to a collected payload schema.
///
/// Either a pointer to a named pool definition or an anonymous root
/// (a raw array or primitive) kept inline.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRef {
    root: Value,
}

impl SchemaRef {
    /// Wraps a reflected root schema.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// The reflected root schema.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Pool pointer, when the root is a named type.
    pub fn reference(&self) -> Option<&str> {
        reference_of(&self.root)
    }

    /// Pool definition name, when the root is a named type.
    pub fn definition_name(&self) -> Option<String> {
        self.reference().and_then(definition_name)
    }

    /// Inline `type` of an anonymous root.
    pub fn kind(&self) -> Option<&Value> {
        self.root.get("type")
    }

    /// Inline `items` of an anonymous array root.
    pub fn items(&self) -> Option<&Value> {
        self.root.get("items")
    }
}

impl Serialize for SchemaRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(reference) = self.reference() {
            map.serialize_entry("$ref", reference)?;
        } else {
            if let Some(kind) = self.kind() {
                map.serialize_entry("type", kind)?;
            }
            if let Some(items) = self.items() {
                map.serialize_entry("items", items)?;
            }
        }
        map.end()
    }
}

/// Reflects payload types and merges their definitions into a [`SchemaPool`].
pub struct SchemaCollector<'r> {
    reflector: &'r dyn Reflector,
    pool: SchemaPool,
}

impl<'r> SchemaCollector<'r> {
    /// Creates a collector with an empty pool.
    pub fn new(reflector: &'r dyn Reflector) -> Self {
        Self {
            reflector,
            pool: SchemaPool::new(),
        }
    }

    /// Reflects `descriptor` and merges its definitions into the pool.
    ///
    /// Returns `None` when there is no payload type.
    pub fn collect(&mut self, descriptor: Option<&TypeDescriptor>) -> AppResult<Option<SchemaRef>> {
        let Some(descriptor) = descriptor else {
            return Ok(None);
        };

        let reflection = self.reflector.reflect(descriptor)?;
        for (name, definition) in reflection.definitions {
            if self
                .pool
                .get(&name)
                .is_some_and(|existing| *existing != definition)
            {
                warn!(
                    schema = %name,
                    payload = %descriptor.name(),
                    "schema definition overwritten by a later payload type"
                );
            }
            self.pool.insert(name, definition);
        }

        Ok(Some(SchemaRef::new(reflection.root)))
    }

    /// The pool collected so far.
    pub fn pool(&self) -> &SchemaPool {
        &self.pool
    }

    /// Consumes the collector, returning its pool.
    pub fn into_pool(self) -> SchemaPool {
        self.pool
    }
}
