//! Golden Tests for Schema Conversion
//!
//! Each fixture `<name>.json` is converted and compared with
//! `<name>.expected.json`.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use schema_to_openapi::config::ConvertConfig;
use schema_to_openapi::{dereference, detect_cycles, Components, Converter};

fn fixture(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

fn convert(input: &str, name: &str) -> Components {
    let schema = fixture(input);
    let doc = dereference(&schema).unwrap();
    Converter::default().convert_document(&doc, name).unwrap()
}

fn assert_golden(input: &str, expected: &str, name: &str) -> Components {
    let components = convert(input, name);
    assert_eq!(components.to_value(), fixture(expected));
    assert!(components.dangling_refs().is_empty());
    components
}

// =============================================================================
// Golden Fixtures
// =============================================================================

#[test]
fn test_basic_schema() {
    assert_golden(
        include_str!("fixtures/basic.json"),
        include_str!("fixtures/basic.expected.json"),
        "person",
    );
}

#[test]
fn test_type_arrays() {
    assert_golden(
        include_str!("fixtures/type_arrays.json"),
        include_str!("fixtures/type_arrays.expected.json"),
        "values",
    );
}

#[test]
fn test_conditionals() {
    let components = assert_golden(
        include_str!("fixtures/conditionals.json"),
        include_str!("fixtures/conditionals.expected.json"),
        "address",
    );
    assert_eq!(
        components.names().collect::<Vec<_>>(),
        vec!["if-0", "if-1", "if-2", "address"]
    );
}

#[test]
fn test_dependencies() {
    assert_golden(
        include_str!("fixtures/dependencies.json"),
        include_str!("fixtures/dependencies.expected.json"),
        "payment",
    );
}

#[test]
fn test_keyword_shapes() {
    assert_golden(
        include_str!("fixtures/keyword_shapes.json"),
        include_str!("fixtures/keyword_shapes.expected.json"),
        "shapes",
    );
}

#[test]
fn test_null_branches() {
    assert_golden(
        include_str!("fixtures/null_branches.json"),
        include_str!("fixtures/null_branches.expected.json"),
        "nulls",
    );
}

#[test]
fn test_orphaned_defaults() {
    assert_golden(
        include_str!("fixtures/orphans.json"),
        include_str!("fixtures/orphans.expected.json"),
        "orphans",
    );
}

#[test]
fn test_circular_schema() {
    let components = assert_golden(
        include_str!("fixtures/circular.json"),
        include_str!("fixtures/circular.expected.json"),
        "family",
    );
    assert_eq!(components.names().collect::<Vec<_>>(), vec!["cyclic_0", "family"]);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_mutual_recursion_cut_once() {
    let schema = json!({
        "properties": { "start": { "$ref": "#/definitions/a" } },
        "definitions": {
            "a": { "properties": { "b": { "$ref": "#/definitions/b" } } },
            "b": { "properties": { "a": { "$ref": "#/definitions/a" } } }
        }
    });
    let doc = dereference(&schema).unwrap();
    assert_eq!(detect_cycles(&doc).len(), 1);

    let components = Converter::default().convert_document(&doc, "mutual").unwrap();
    let a = json!({
        "properties": {
            "b": { "properties": { "a": { "$ref": "#/components/schemas/cyclic_0" } } }
        }
    });
    assert_eq!(
        components.to_value(),
        json!({ "schemas": { "cyclic_0": a.clone(), "mutual": { "properties": { "start": a } } } })
    );
    assert!(components.dangling_refs().is_empty());
}

#[test]
fn test_shared_definitions_are_scanned_once() {
    let mut definitions = serde_json::Map::new();
    for i in 0..30 {
        let next = json!({ "$ref": format!("#/definitions/d{}", i + 1) });
        definitions.insert(format!("d{}", i), json!({ "allOf": [next.clone(), next] }));
    }
    definitions.insert("d30".to_string(), json!({ "type": "string" }));
    let schema = json!({ "$ref": "#/definitions/d0", "definitions": definitions });

    let doc = dereference(&schema).unwrap();
    assert!(detect_cycles(&doc).is_empty());
}

#[test]
fn test_type_array_keeps_one_branch_per_type() {
    let schema = json!({ "type": ["string", "boolean"], "enum": ["a"] });
    let components = schema_to_openapi::convert(&schema, "r").unwrap();
    let branches = components.get("r").and_then(|r| r["oneOf"].as_array()).unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[1], json!({ "type": "boolean", "not": {} }));
}

#[test]
fn test_conversion_is_idempotent() {
    let inputs = [
        include_str!("fixtures/basic.json"),
        include_str!("fixtures/type_arrays.json"),
        include_str!("fixtures/conditionals.json"),
        include_str!("fixtures/dependencies.json"),
        include_str!("fixtures/keyword_shapes.json"),
        include_str!("fixtures/null_branches.json"),
        include_str!("fixtures/orphans.json"),
        include_str!("fixtures/circular.json"),
    ];
    let converter = Converter::default();

    for input in inputs {
        let components = convert(input, "root");
        for (name, schema) in &components.schemas {
            let again = converter.convert(schema, name).unwrap();
            assert_eq!(again.get(name), Some(schema), "component {}", name);
        }
    }
}

#[test]
fn test_conversions_are_independent() {
    let schema = fixture(include_str!("fixtures/conditionals.json"));
    let converter = Converter::default();

    let first = converter.convert(&schema, "address").unwrap();
    let second = converter.convert(&schema, "address").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallel_conversions() {
    let schema = fixture(include_str!("fixtures/circular.json"));
    let doc = dereference(&schema).unwrap();
    let converter = Converter::new(ConvertConfig::default());
    let expected = converter.convert_document(&doc, "family").unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| converter.convert_document(&doc, "family").unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_external_refs_are_kept() {
    let schema = json!({
        "properties": { "ext": { "$ref": "common.json#/definitions/id" } }
    });
    let components = convert(&schema.to_string(), "ext");
    assert_eq!(
        components.get("ext"),
        Some(&json!({ "properties": { "ext": { "$ref": "common.json#/definitions/id" } } }))
    );
}
