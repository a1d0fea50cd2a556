//! `dependencies`, `dependentSchemas`, `dependentRequired` → `anyOf`/`allOf`
//!
//! "if `key` is present then X must hold" is written as
//! `anyOf: [{not: {required: [key]}}, X]`.

use serde_json::{json, Map, Value};

use super::{push_all_of, RewriteContext, SchemaRewriteRule};

/// Source keywords, later ones overriding earlier ones per key
const DEPENDENCY_KEYWORDS: &[&str] = &["dependencies", "dependentSchemas", "dependentRequired"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Dependencies;

enum Constraint {
    /// Two-member `anyOf`
    Implies(Vec<Value>),
    /// The key must not be present
    Forbid(Value),
}

fn absent(key: &str) -> Value {
    json!({ "not": { "required": [key] } })
}

fn constraint(key: &str, dependency: Value) -> Option<Constraint> {
    match dependency {
        Value::Object(schema) => {
            Some(Constraint::Implies(vec![absent(key), Value::Object(schema)]))
        }
        Value::Array(names) if names.is_empty() => None,
        Value::Array(names) => Some(Constraint::Implies(vec![
            absent(key),
            json!({ "required": names }),
        ])),
        Value::String(name) => Some(Constraint::Implies(vec![
            absent(key),
            json!({ "required": [name] }),
        ])),
        Value::Bool(false) => Some(Constraint::Forbid(absent(key))),
        _ => None,
    }
}

impl SchemaRewriteRule for Dependencies {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        let mut merged = Map::new();
        let mut found = false;
        for keyword in DEPENDENCY_KEYWORDS {
            let Some(source) = node.remove(*keyword) else {
                continue;
            };
            found = true;
            if let Value::Object(entries) = source {
                merged.extend(entries);
            }
        }
        if !found {
            return;
        }

        let constraints: Vec<Constraint> = merged
            .into_iter()
            .filter_map(|(key, dependency)| constraint(&key, dependency))
            .collect();

        let implications = constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Implies(_)))
            .count();
        let set_any_of = implications == 1 && !node.contains_key("anyOf");

        for c in constraints {
            match c {
                Constraint::Implies(any_of) if set_any_of => {
                    node.insert("anyOf".to_string(), Value::Array(any_of));
                }
                Constraint::Implies(any_of) => {
                    push_all_of(node, json!({ "anyOf": any_of }));
                }
                Constraint::Forbid(schema) => push_all_of(node, schema),
            }
        }
    }
}
