//! Keyword tables of the OpenAPI 3.0 schema dialect

use serde_json::Value;

/// Keywords an OpenAPI 3.0 Schema Object may carry
pub const OPENAPI_KEYWORDS: &[&str] = &[
    // JSON Schema validation keywords shared with OpenAPI
    "title",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "maxProperties",
    "minProperties",
    "required",
    "enum",
    "$ref",
    // Keywords OpenAPI adjusts
    "type",
    "allOf",
    "oneOf",
    "anyOf",
    "not",
    "items",
    "properties",
    "additionalProperties",
    "description",
    "format",
    "default",
    // OpenAPI-only keywords
    "nullable",
    "discriminator",
    "readOnly",
    "writeOnly",
    "xml",
    "externalDocs",
    "example",
    "deprecated",
];

/// Keywords removed whatever the stripping policy says
///
/// `definitions` is only removed from the document root, after conversion.
pub const ALWAYS_DROPPED: &[&str] = &["$schema", "$comment", "$id", "version", "examples", "id"];

/// Keywords whose canonical spelling is camelCase
pub const CAMEL_CASED_KEYWORDS: &[&str] = &[
    "allOf",
    "oneOf",
    "anyOf",
    "additionalProperties",
    "multipleOf",
    "exclusiveMaximum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "maxItems",
    "minItems",
    "uniqueItems",
    "maxProperties",
    "minProperties",
    "readOnly",
    "writeOnly",
    "externalDocs",
];

/// Keywords whose value must be an array
pub const ARRAY_KEYWORDS: &[&str] = &["allOf", "oneOf", "anyOf", "enum", "required"];

/// Whether a JSON value is an instance of a JSON Schema type name
///
/// `integer` accepts numbers without a fractional part. Unknown type names
/// match nothing.
pub fn value_matches_type(value: &Value, type_name: &str) -> bool {
    match (type_name, value) {
        ("string", Value::String(_)) => true,
        ("number", Value::Number(_)) => true,
        ("integer", Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        ("boolean", Value::Bool(_)) => true,
        ("array", Value::Array(_)) => true,
        ("object", Value::Object(_)) => true,
        ("null", Value::Null) => true,
        _ => false,
    }
}
