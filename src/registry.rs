//! Component registry
//!
//! Collects the named schemas produced by one conversion run: extracted cyclic
//! subtrees, hoisted `if` conditions and finally the root schema. The registry
//! owns the run's name counters, so every generated name is unique within the
//! run and nothing is shared between runs.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::NodeId;
use crate::traverse;

/// Pointer prefix of component schema references
pub const COMPONENT_REF_PREFIX: &str = "#/components/schemas/";

/// Build the `$ref` target for a component
pub fn component_ref(name: &str) -> String {
    format!("{}{}", COMPONENT_REF_PREFIX, name)
}

/// `{"$ref": "#/components/schemas/<name>"}`
pub fn component_ref_schema(name: &str) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("$ref".to_string(), Value::String(component_ref(name)));
    Value::Object(map)
}

#[derive(Debug, Clone)]
enum Entry {
    /// A graph node that still has to be materialised and rewritten
    Node(NodeId),
    Schema(Value),
}

/// Registry of named schemas for one conversion run
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: IndexMap<String, Entry>,
    reserved: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a name free for later registration (the root schema's name)
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    /// Whether a name is registered or reserved
    pub fn is_taken(&self, name: &str) -> bool {
        self.entries.contains_key(name) || self.reserved.contains(name)
    }

    /// Allocate a fresh `<prefix><n>` name
    ///
    /// Counters are per prefix and start at zero; names already taken are
    /// skipped. The returned name is reserved.
    pub fn allocate(&mut self, prefix: &str) -> String {
        let mut next = self.counters.get(prefix).copied().unwrap_or(0);
        let candidate = loop {
            let candidate = format!("{}{}", prefix, next);
            next += 1;
            if !self.is_taken(&candidate) {
                break candidate;
            }
        };
        self.counters.insert(prefix.to_string(), next);
        self.reserved.insert(candidate.clone());
        candidate
    }

    /// Register (or replace) a finished schema
    ///
    /// Replacing keeps the name's original position in the output.
    pub fn register(&mut self, name: impl Into<String>, schema: Value) {
        self.entries.insert(name.into(), Entry::Schema(schema));
    }

    /// Register a graph node to be materialised later
    pub fn register_node(&mut self, name: impl Into<String>, node: NodeId) {
        self.entries.insert(name.into(), Entry::Node(node));
    }

    /// Graph nodes registered but not yet replaced by a finished schema
    pub fn pending_nodes(&self) -> Vec<(String, NodeId)> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| match entry {
                Entry::Node(id) => Some((name.clone(), *id)),
                Entry::Schema(_) => None,
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// A finished schema by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.entries.get(name)? {
            Entry::Schema(schema) => Some(schema),
            Entry::Node(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The finished component map
    ///
    /// Entries still pending as graph nodes are left out.
    pub fn into_components(self) -> Components {
        let schemas = self
            .entries
            .into_iter()
            .filter_map(|(name, entry)| match entry {
                Entry::Schema(schema) => Some((name, schema)),
                Entry::Node(_) => None,
            })
            .collect();
        Components { schemas }
    }
}

/// Output of a conversion: the `components` object of an OpenAPI document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: IndexMap<String, Value>,
}

impl Components {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Component names referenced through `#/components/schemas/` that have no
    /// entry, in order of first appearance
    pub fn dangling_refs(&self) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for schema in self.schemas.values() {
            traverse::walk(schema, |node, _, _, _| {
                let Some(target) = node.get("$ref").and_then(Value::as_str) else {
                    return;
                };
                let Some(name) = target.strip_prefix(COMPONENT_REF_PREFIX) else {
                    return;
                };
                if !self.schemas.contains_key(name) && !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
            });
        }
        missing
    }

    /// Serialize as `{"schemas": {...}}`
    pub fn to_value(&self) -> Value {
        let schemas = self
            .schemas
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut map = serde_json::Map::new();
        map.insert("schemas".to_string(), Value::Object(schemas));
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allocate_is_monotonic() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(registry.allocate("cyclic_"), "cyclic_0");
        assert_eq!(registry.allocate("cyclic_"), "cyclic_1");
        assert_eq!(registry.allocate("if-"), "if-0");
    }

    #[test]
    fn test_allocate_skips_taken_names() {
        let mut registry = ComponentRegistry::new();
        registry.reserve("cyclic_0");
        registry.register("cyclic_1", json!({}));
        assert!(registry.is_taken("cyclic_0"));
        assert!(registry.is_taken("cyclic_1"));
        assert!(!registry.is_taken("cyclic_2"));

        assert_eq!(registry.allocate("cyclic_"), "cyclic_2");
        assert!(registry.is_taken("cyclic_2"));
        assert_eq!(registry.allocate("cyclic_"), "cyclic_3");
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = ComponentRegistry::new();
        registry.register("a", json!({ "type": "string" }));
        registry.register("b", json!({}));
        registry.register("a", json!({ "type": "number" }));

        let components = registry.into_components();
        assert_eq!(components.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(components.get("a"), Some(&json!({ "type": "number" })));
    }

    #[test]
    fn test_pending_nodes_are_not_emitted() {
        let mut registry = ComponentRegistry::new();
        let doc = crate::document::SchemaDocument::new();
        registry.register_node("cyclic_0", doc.root());
        assert_eq!(registry.pending_nodes(), vec![("cyclic_0".to_string(), doc.root())]);
        assert!(registry.get("cyclic_0").is_none());
        assert!(registry.into_components().is_empty());
    }

    #[test]
    fn test_dangling_refs() {
        let mut registry = ComponentRegistry::new();
        registry.register(
            "root",
            json!({
                "properties": {
                    "a": { "$ref": "#/components/schemas/present" },
                    "b": { "$ref": "#/components/schemas/missing" },
                    "c": { "$ref": "other.json#/x" }
                },
                "allOf": [{ "$ref": "#/components/schemas/missing" }]
            }),
        );
        registry.register("present", json!({}));

        let components = registry.into_components();
        assert_eq!(components.dangling_refs(), vec!["missing".to_string()]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut registry = ComponentRegistry::new();
        registry.register("basic", json!({ "type": "object" }));
        let components = registry.into_components();
        assert_eq!(
            serde_json::to_value(&components).unwrap(),
            json!({ "schemas": { "basic": { "type": "object" } } })
        );
        assert_eq!(components.to_value(), serde_json::to_value(&components).unwrap());
    }
}
