#![deny(missing_docs)]

//! # Schema Translation
//!
//! Converts pool definitions (JSON Schema values) into the OpenAPI 3.0 schema
//! object model. Pool pointers (`#/$defs/<name>`) are rewritten to
//! `#/components/schemas/<name>`; unknown kinds degrade to `string`.

use crate::schema::refs::{component_ref, reference_of};
use indexmap::IndexMap;
use openapiv3::{
    AdditionalProperties, AnySchema, ArrayType, BooleanType, IntegerFormat, IntegerType,
    NumberFormat, NumberType, ObjectType, ReferenceOr, Schema, SchemaData, SchemaKind,
    StringFormat, StringType, Type, VariantOrUnknownOrEmpty,
};
use serde_json::{Map, Value};

/// Keywords that make an `additionalProperties` sub-schema meaningful.
/// A sub-schema with none of them is the reflector's "no additional properties" sentinel.
const SENTINEL_KEYWORDS: [&str; 9] = [
    "type",
    "properties",
    "items",
    "required",
    "$ref",
    "enum",
    "oneOf",
    "anyOf",
    "allOf",
];

/// Translates a schema that may be a reference.
///
/// References are rewritten to component pointers; anything else is translated inline.
pub fn translate_ref(value: &Value) -> ReferenceOr<Schema> {
    match reference_of(value) {
        Some(reference) => ReferenceOr::Reference {
            reference: component_ref(reference),
        },
        None => ReferenceOr::Item(translate_schema(value)),
    }
}

fn translate_boxed_ref(value: &Value) -> ReferenceOr<Box<Schema>> {
    match translate_ref(value) {
        ReferenceOr::Reference { reference } => ReferenceOr::Reference { reference },
        ReferenceOr::Item(schema) => ReferenceOr::Item(Box::new(schema)),
    }
}

/// Translates a single schema value.
///
/// A value whose root is a `$ref` translates to the empty schema: references are
/// resolved one level up by [`translate_ref`].
pub fn translate_schema(value: &Value) -> Schema {
    let Value::Object(map) = value else {
        return any_schema(SchemaData::default());
    };
    if map.contains_key("$ref") {
        return any_schema(SchemaData::default());
    }

    let (kind, nullable) = declared_type(map.get("type"));
    let schema_data = SchemaData {
        nullable,
        deprecated: bool_field(map, "deprecated"),
        read_only: bool_field(map, "readOnly"),
        write_only: bool_field(map, "writeOnly"),
        title: str_field(map, "title"),
        description: str_field(map, "description"),
        default: map.get("default").cloned(),
        ..Default::default()
    };

    if kind.is_none() {
        if let Some(schema) = translate_composition(map, schema_data.clone()) {
            return schema;
        }
    }

    let schema_kind = match kind {
        Some("integer") => SchemaKind::Type(Type::Integer(IntegerType {
            format: integer_format(map),
            minimum: map.get("minimum").and_then(Value::as_i64),
            maximum: map.get("maximum").and_then(Value::as_i64),
            enumeration: enumeration(map, Value::as_i64),
            ..Default::default()
        })),
        Some("number") => SchemaKind::Type(Type::Number(NumberType {
            format: number_format(map),
            minimum: map.get("minimum").and_then(Value::as_f64),
            maximum: map.get("maximum").and_then(Value::as_f64),
            enumeration: enumeration(map, Value::as_f64),
            ..Default::default()
        })),
        Some("boolean") => SchemaKind::Type(Type::Boolean(BooleanType::default())),
        Some("array") => SchemaKind::Type(Type::Array(ArrayType {
            items: map.get("items").map(translate_boxed_ref),
            min_items: usize_field(map, "minItems"),
            max_items: usize_field(map, "maxItems"),
            unique_items: bool_field(map, "uniqueItems"),
        })),
        Some("object") => SchemaKind::Type(Type::Object(translate_object(map))),
        _ => SchemaKind::Type(Type::String(StringType {
            format: string_format(map),
            pattern: str_field(map, "pattern"),
            enumeration: enumeration(map, |v| v.as_str().map(str::to_string)),
            min_length: usize_field(map, "minLength"),
            max_length: usize_field(map, "maxLength"),
        })),
    };

    Schema {
        schema_data,
        schema_kind,
    }
}

fn translate_object(map: &Map<String, Value>) -> ObjectType {
    let properties: IndexMap<String, ReferenceOr<Box<Schema>>> = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), translate_boxed_ref(prop)))
                .collect()
        })
        .unwrap_or_default();

    let required = map
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ObjectType {
        properties,
        required,
        additional_properties: map.get("additionalProperties").map(additional_properties),
        min_properties: usize_field(map, "minProperties"),
        max_properties: usize_field(map, "maxProperties"),
    }
}

fn additional_properties(value: &Value) -> AdditionalProperties {
    match value {
        Value::Bool(allowed) => AdditionalProperties::Any(*allowed),
        Value::Object(map) if is_empty_sentinel(map) => AdditionalProperties::Any(false),
        other => AdditionalProperties::Schema(Box::new(translate_ref(other))),
    }
}

fn is_empty_sentinel(map: &Map<String, Value>) -> bool {
    !SENTINEL_KEYWORDS.iter().any(|key| map.contains_key(*key))
}

/// Translates `oneOf` / `anyOf` / `allOf`.
///
/// A `oneOf`/`anyOf` of one schema plus `{"type": "null"}` collapses to that schema
/// marked nullable.
fn translate_composition(map: &Map<String, Value>, mut schema_data: SchemaData) -> Option<Schema> {
    let (keyword, branches) = ["oneOf", "anyOf", "allOf"]
        .into_iter()
        .find_map(|keyword| Some((keyword, map.get(keyword)?.as_array()?)))?;

    let (nulls, rest): (Vec<&Value>, Vec<&Value>) = branches.iter().partition(|b| is_null(b));
    schema_data.nullable |= !nulls.is_empty();

    // Only `null` branches: emit no composition.
    if rest.is_empty() {
        return Some(any_schema(schema_data));
    }

    if schema_data.nullable && rest.len() == 1 && keyword != "allOf" {
        let only = rest[0];
        if let Some(reference) = reference_of(only) {
            return Some(Schema {
                schema_data,
                schema_kind: SchemaKind::AllOf {
                    all_of: vec![ReferenceOr::Reference {
                        reference: component_ref(reference),
                    }],
                },
            });
        }
        let mut inner = translate_schema(only);
        inner.schema_data.nullable = true;
        if inner.schema_data.title.is_none() {
            inner.schema_data.title = schema_data.title;
        }
        if inner.schema_data.description.is_none() {
            inner.schema_data.description = schema_data.description;
        }
        return Some(inner);
    }

    let branches: Vec<ReferenceOr<Schema>> = rest.into_iter().map(translate_ref).collect();
    let schema_kind = match keyword {
        "oneOf" => SchemaKind::OneOf { one_of: branches },
        "anyOf" => SchemaKind::AnyOf { any_of: branches },
        _ => SchemaKind::AllOf { all_of: branches },
    };
    Some(Schema {
        schema_data,
        schema_kind,
    })
}

/// Reads `type`, splitting a 2020-12 union such as `["string", "null"]`
/// into the primary kind and a nullable flag.
fn declared_type(value: Option<&Value>) -> (Option<&str>, bool) {
    match value {
        Some(Value::String(kind)) => (Some(kind.as_str()), false),
        Some(Value::Array(kinds)) => {
            let kinds: Vec<&str> = kinds.iter().filter_map(Value::as_str).collect();
            let primary = kinds.iter().copied().find(|k| *k != "null");
            let nullable = kinds.contains(&"null");
            (primary.or(kinds.first().copied()), nullable && primary.is_some())
        }
        _ => (None, false),
    }
}

fn is_null(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("null")
}

fn any_schema(schema_data: SchemaData) -> Schema {
    Schema {
        schema_data,
        schema_kind: SchemaKind::Any(AnySchema::default()),
    }
}

fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn usize_field(map: &Map<String, Value>, key: &str) -> Option<usize> {
    map.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

/// Reads `enum`, or a single-value `const` when `enum` is absent.
fn enumeration<T>(map: &Map<String, Value>, cast: impl Fn(&Value) -> Option<T>) -> Vec<Option<T>> {
    let values: Vec<&Value> = match (map.get("enum").and_then(Value::as_array), map.get("const")) {
        (Some(values), _) => values.iter().collect(),
        (None, Some(constant)) => vec![constant],
        (None, None) => return Vec::new(),
    };
    values
        .into_iter()
        .filter(|v| v.is_null() || cast(v).is_some())
        .map(&cast)
        .collect()
}

fn string_format(map: &Map<String, Value>) -> VariantOrUnknownOrEmpty<StringFormat> {
    match map.get("format").and_then(Value::as_str) {
        None => VariantOrUnknownOrEmpty::Empty,
        Some("date") => VariantOrUnknownOrEmpty::Item(StringFormat::Date),
        Some("date-time") => VariantOrUnknownOrEmpty::Item(StringFormat::DateTime),
        Some("password") => VariantOrUnknownOrEmpty::Item(StringFormat::Password),
        Some("byte") => VariantOrUnknownOrEmpty::Item(StringFormat::Byte),
        Some("binary") => VariantOrUnknownOrEmpty::Item(StringFormat::Binary),
        Some(other) => VariantOrUnknownOrEmpty::Unknown(other.to_string()),
    }
}

fn integer_format(map: &Map<String, Value>) -> VariantOrUnknownOrEmpty<IntegerFormat> {
    match map.get("format").and_then(Value::as_str) {
        None => VariantOrUnknownOrEmpty::Empty,
        Some("int32") => VariantOrUnknownOrEmpty::Item(IntegerFormat::Int32),
        Some("int64") => VariantOrUnknownOrEmpty::Item(IntegerFormat::Int64),
        Some(other) => VariantOrUnknownOrEmpty::Unknown(other.to_string()),
    }
}

fn number_format(map: &Map<String, Value>) -> VariantOrUnknownOrEmpty<NumberFormat> {
    match map.get("format").and_then(Value::as_str) {
        None => VariantOrUnknownOrEmpty::Empty,
        Some("float") => VariantOrUnknownOrEmpty::Item(NumberFormat::Float),
        Some("double") => VariantOrUnknownOrEmpty::Item(NumberFormat::Double),
        Some(other) => VariantOrUnknownOrEmpty::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn to_json(schema: &ReferenceOr<Schema>) -> Value {
        serde_json::to_value(schema).unwrap()
    }

    #[test]
    fn test_property_refs_are_rewritten() {
        let def = json!({
            "type": "object",
            "properties": {
                "owner": { "$ref": "#/$defs/Owner" },
                "tags": { "type": "array", "items": { "$ref": "#/$defs/Tag" } }
            },
            "required": ["owner"]
        });
        let out = to_json(&translate_ref(&def));

        assert_eq!(
            out["properties"]["owner"],
            json!({ "$ref": "#/components/schemas/Owner" })
        );
        assert_eq!(
            out["properties"]["tags"]["items"],
            json!({ "$ref": "#/components/schemas/Tag" })
        );
        assert_eq!(out["required"], json!(["owner"]));
        assert!(!out.to_string().contains("#/$defs/"));
    }

    #[test]
    fn test_root_reference_resolved_one_level_up() {
        let def = json!({ "$ref": "#/$defs/Owner" });
        assert_eq!(
            to_json(&translate_ref(&def)),
            json!({ "$ref": "#/components/schemas/Owner" })
        );
        let inline = serde_json::to_value(translate_schema(&def)).unwrap();
        assert_eq!(inline, json!({}));
    }

    #[test]
    fn test_primitive_kinds() {
        for (kind, expected) in [
            ("string", "string"),
            ("integer", "integer"),
            ("number", "number"),
            ("boolean", "boolean"),
            ("array", "array"),
            ("object", "object"),
            ("mystery", "string"),
        ] {
            let out = serde_json::to_value(translate_schema(&json!({ "type": kind }))).unwrap();
            assert_eq!(out["type"], json!(expected), "kind {kind}");
        }
        let out = serde_json::to_value(translate_schema(&json!({ "title": "untyped" }))).unwrap();
        assert_eq!(out["type"], json!("string"));
    }

    #[test]
    fn test_additional_properties_sentinel() {
        let empty = json!({ "type": "object", "additionalProperties": {} });
        let out = serde_json::to_value(translate_schema(&empty)).unwrap();
        assert_eq!(out["additionalProperties"], json!(false));

        let negated = json!({ "type": "object", "additionalProperties": { "not": {} } });
        let out = serde_json::to_value(translate_schema(&negated)).unwrap();
        assert_eq!(out["additionalProperties"], json!(false));

        let typed = json!({ "type": "object", "additionalProperties": { "type": "integer" } });
        let out = serde_json::to_value(translate_schema(&typed)).unwrap();
        assert_eq!(out["additionalProperties"], json!({ "type": "integer" }));

        let referenced = json!({ "type": "object", "additionalProperties": { "$ref": "#/$defs/Pet" } });
        let out = serde_json::to_value(translate_schema(&referenced)).unwrap();
        assert_eq!(
            out["additionalProperties"],
            json!({ "$ref": "#/components/schemas/Pet" })
        );

        let closed = json!({ "type": "object", "additionalProperties": false });
        let out = serde_json::to_value(translate_schema(&closed)).unwrap();
        assert_eq!(out["additionalProperties"], json!(false));
    }

    #[test]
    fn test_nullable_union() {
        let out = serde_json::to_value(translate_schema(&json!({
            "type": ["string", "null"],
            "format": "date-time"
        })))
        .unwrap();
        assert_eq!(out["type"], json!("string"));
        assert_eq!(out["format"], json!("date-time"));
        assert_eq!(out["nullable"], json!(true));
    }

    #[test]
    fn test_nullable_reference_collapses_to_all_of() {
        let out = serde_json::to_value(translate_schema(&json!({
            "anyOf": [{ "$ref": "#/$defs/Pet" }, { "type": "null" }]
        })))
        .unwrap();
        assert_eq!(out["nullable"], json!(true));
        assert_eq!(
            out["allOf"],
            json!([{ "$ref": "#/components/schemas/Pet" }])
        );
        assert!(out.get("anyOf").is_none());
    }

    #[test]
    fn test_const_becomes_single_value_enum() {
        let out = serde_json::to_value(translate_schema(&json!({
            "type": "string",
            "const": "Circle"
        })))
        .unwrap();
        assert_eq!(out["type"], json!("string"));
        assert_eq!(out["enum"], json!(["Circle"]));

        let out = serde_json::to_value(translate_schema(&json!({ "type": "integer", "const": 3 })))
            .unwrap();
        assert_eq!(out["enum"], json!([3]));

        let out = serde_json::to_value(translate_schema(&json!({
            "type": "string",
            "enum": ["a", "b"],
            "const": "a"
        })))
        .unwrap();
        assert_eq!(out["enum"], json!(["a", "b"]));
    }

    #[test]
    fn test_null_only_union_is_nullable_any() {
        let out = serde_json::to_value(translate_schema(&json!({
            "anyOf": [{ "type": "null" }]
        })))
        .unwrap();
        assert_eq!(out, json!({ "nullable": true }));
    }

    #[test]
    fn test_one_of_branches() {
        let out = serde_json::to_value(translate_schema(&json!({
            "oneOf": [
                { "type": "string", "enum": ["a", "b"] },
                { "$ref": "#/$defs/Pet" }
            ]
        })))
        .unwrap();
        assert_eq!(
            out["oneOf"],
            json!([
                { "type": "string", "enum": ["a", "b"] },
                { "$ref": "#/components/schemas/Pet" }
            ])
        );
    }

    #[test]
    fn test_integer_details() {
        let out = serde_json::to_value(translate_schema(&json!({
            "type": "integer",
            "format": "uint32",
            "minimum": 0,
            "description": "count"
        })))
        .unwrap();
        assert_eq!(out["description"], json!("count"));
        assert_eq!(out["type"], json!("integer"));
        assert_eq!(out["format"], json!("uint32"));
        assert_eq!(out["minimum"], json!(0));
    }
}
