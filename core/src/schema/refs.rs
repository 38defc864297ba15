#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for reading and rewriting `$ref` pointers between the schema pool's
//! `#/$defs/<name>` namespace and OpenAPI's `#/components/schemas/<name>`.

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Pointer prefix of definitions inside the schema pool.
pub const DEFS_PREFIX: &str = "#/$defs/";

/// Pointer prefix of schemas inside an OpenAPI document.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Older reflectors keep definitions under `definitions`.
const LEGACY_DEFS_PREFIX: &str = "#/definitions/";

/// Returns the `$ref` target when `value` is a reference object.
pub(crate) fn reference_of(value: &Value) -> Option<&str> {
    value.get("$ref").and_then(Value::as_str)
}

/// Extracts the definition name from a pool reference.
/// e.g. `#/$defs/User` -> `User`
pub fn definition_name(reference: &str) -> Option<String> {
    let segment = reference
        .strip_prefix(DEFS_PREFIX)
        .or_else(|| reference.strip_prefix(LEGACY_DEFS_PREFIX))?;
    if segment.is_empty() || segment.contains('/') {
        return None;
    }
    Some(decode_pointer_segment(segment))
}

/// Rewrites a pool reference into an OpenAPI component reference.
///
/// References outside the pool namespace are returned unchanged.
pub fn component_ref(reference: &str) -> String {
    match reference
        .strip_prefix(DEFS_PREFIX)
        .or_else(|| reference.strip_prefix(LEGACY_DEFS_PREFIX))
    {
        Some(segment) => format!("{}{}", COMPONENTS_PREFIX, segment),
        None => reference.to_string(),
    }
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}
