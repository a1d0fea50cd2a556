//! Rewrite pipeline
//!
//! Every incompatibility between JSON Schema and the OpenAPI 3.0 schema dialect
//! is handled by one [`SchemaRewriteRule`]: a node-local, idempotent transform
//! that mutates a single schema object in place. The [`Pipeline`] applies its
//! rules in a fixed order to each node before the traversal descends into the
//! node's children, so subschemas produced by one rule (the `oneOf` branches
//! of a type array, the `then` schema of a conditional) pass through the whole
//! pipeline themselves.
//!
//! ## Order
//!
//! | # | Rule | Effect |
//! |---|------|--------|
//! | 1 | `const-to-enum` | `const: x` → `enum: [x]` |
//! | 2 | `tuple-items` | tuple `items` → one schema |
//! | 3 | `if-then-else` | conditional → `oneOf` over a hoisted `if` component |
//! | 4 | `type-array` | `type: [..]` → `oneOf` |
//! | 5 | `camel-case-keys` | `anyof` → `anyOf`, ... |
//! | 6 | `array-keywords` | scalar `enum`/`required`/... wrapped in arrays |
//! | 7 | `dependencies` | dependencies → `anyOf`/`allOf` |
//! | 8 | `empty-required` | drop `required: []` |
//! | 9 | `null-type` | `type: "null"` → `nullable: true` |
//! | 10 | `default-values` | coerce `default` to the declared type |
//! | 11 | `hoist-orphans` | move `default` into composition branches |
//! | 12 | `null-branches` | drop `type: "null"` branches of `oneOf`/`anyOf` |
//! | 13 | `strip-keywords` | remove everything outside the whitelist |

pub mod conditional;
pub mod const_enum;
pub mod defaults;
pub mod dependencies;
pub mod keys;
pub mod keywords;
pub mod nullable;
pub mod tuple;
pub mod type_union;

use serde_json::{Map, Value};

use crate::config::ConvertConfig;
use crate::registry::ComponentRegistry;
use crate::traverse;

pub use conditional::IfThenElse;
pub use const_enum::ConstToEnum;
pub use defaults::{DefaultValues, HoistOrphans};
pub use dependencies::Dependencies;
pub use keys::{ArrayKeywords, CamelCaseKeys, StripKeywords};
pub use nullable::{EmptyRequired, NullBranches, NullType};
pub use tuple::TupleItems;
pub use type_union::TypeArrays;

/// A node-local schema transform
pub trait SchemaRewriteRule: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Rewrite one schema object in place
    fn apply(&self, node: &mut Map<String, Value>, cx: &mut RewriteContext<'_>);
}

/// What a rule may reach beyond its node: the pipeline itself (to rewrite a
/// detached subschema) and the run's component registry
pub struct RewriteContext<'a> {
    pipeline: &'a Pipeline,
    registry: &'a mut ComponentRegistry,
}

impl<'a> RewriteContext<'a> {
    pub fn new(pipeline: &'a Pipeline, registry: &'a mut ComponentRegistry) -> Self {
        Self { pipeline, registry }
    }

    pub fn registry(&mut self) -> &mut ComponentRegistry {
        &mut *self.registry
    }

    /// Run the full pipeline over a schema tree
    pub fn rewrite(&mut self, schema: &mut Value) {
        let pipeline = self.pipeline;
        traverse::walk_mut(schema, |node, visit| {
            tracing::trace!(pointer = %visit.pointer, "rewriting node");
            pipeline.apply(node, self);
        });
    }
}

/// Ordered list of rewrite rules
pub struct Pipeline {
    rules: Vec<Box<dyn SchemaRewriteRule>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard(&ConvertConfig::default())
    }
}

impl Pipeline {
    /// A pipeline running exactly the given rules, in order
    pub fn new(rules: Vec<Box<dyn SchemaRewriteRule>>) -> Self {
        Self { rules }
    }

    /// The JSON Schema → OpenAPI 3.0 pipeline
    pub fn standard(config: &ConvertConfig) -> Self {
        Self::new(vec![
            Box::new(ConstToEnum),
            Box::new(TupleItems::new(config.tuple_items)),
            Box::new(IfThenElse::new(config.conditional_prefix.clone())),
            Box::new(TypeArrays::new(config.enum_split)),
            Box::new(CamelCaseKeys),
            Box::new(ArrayKeywords),
            Box::new(Dependencies),
            Box::new(EmptyRequired),
            Box::new(NullType),
            Box::new(DefaultValues::new()),
            Box::new(HoistOrphans),
            Box::new(NullBranches),
            Box::new(StripKeywords::from_config(config)),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Apply every rule to one node; non-objects are left alone
    pub fn apply(&self, node: &mut Value, cx: &mut RewriteContext<'_>) {
        let Value::Object(map) = node else {
            return;
        };
        for rule in &self.rules {
            rule.apply(map, cx);
        }
    }

    /// Rewrite a whole schema tree, registering hoisted components
    pub fn rewrite(&self, schema: &mut Value, registry: &mut ComponentRegistry) {
        RewriteContext::new(self, registry).rewrite(schema);
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Set `oneOf`, keeping an existing `oneOf` alive as an `allOf` member
pub(crate) fn set_one_of(node: &mut Map<String, Value>, branches: Vec<Value>) {
    if let Some(existing) = node.remove("oneOf") {
        let mut wrapper = Map::new();
        wrapper.insert("oneOf".to_string(), existing);
        push_all_of(node, Value::Object(wrapper));
    }
    node.insert("oneOf".to_string(), Value::Array(branches));
}

/// Append a member to `allOf`, creating or array-wrapping it as needed
pub(crate) fn push_all_of(node: &mut Map<String, Value>, member: Value) {
    match node.get_mut("allOf") {
        Some(Value::Array(members)) => members.push(member),
        Some(other) => {
            let previous = other.take();
            *other = Value::Array(vec![previous, member]);
        }
        None => {
            node.insert("allOf".to_string(), Value::Array(vec![member]));
        }
    }
}

/// Build a schema object from key/value pairs
pub(crate) fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Apply a single rule to a single node
    pub fn apply_rule(rule: &dyn SchemaRewriteRule, schema: Value) -> Value {
        let pipeline = Pipeline::new(Vec::new());
        let mut registry = ComponentRegistry::new();
        let mut cx = RewriteContext::new(&pipeline, &mut registry);
        let mut schema = schema;
        if let Value::Object(map) = &mut schema {
            rule.apply(map, &mut cx);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_order() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.rule_names(),
            vec![
                "const-to-enum",
                "tuple-items",
                "if-then-else",
                "type-array",
                "camel-case-keys",
                "array-keywords",
                "dependencies",
                "empty-required",
                "null-type",
                "default-values",
                "hoist-orphans",
                "null-branches",
                "strip-keywords",
            ]
        );
    }

    #[test]
    fn test_set_one_of_preserves_existing() {
        let mut node = json!({ "oneOf": [{ "type": "string" }] });
        let map = node.as_object_mut().unwrap();
        set_one_of(map, vec![json!({ "type": "number" })]);
        assert_eq!(
            node,
            json!({
                "allOf": [{ "oneOf": [{ "type": "string" }] }],
                "oneOf": [{ "type": "number" }]
            })
        );
    }

    #[test]
    fn test_push_all_of_wraps_scalar_member() {
        let mut node = json!({ "allOf": { "type": "string" } });
        push_all_of(node.as_object_mut().unwrap(), json!({ "minLength": 1 }));
        assert_eq!(
            node,
            json!({ "allOf": [{ "type": "string" }, { "minLength": 1 }] })
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let pipeline = Pipeline::default();
        let mut registry = ComponentRegistry::new();
        let mut schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": ["string", "null"], "default": "x" },
                "b": { "const": 3 },
                "c": { "type": "array", "default": 1 },
                "d": { "oneOf": [{ "type": "null" }, { "type": "integer" }] }
            },
            "dependentRequired": { "a": ["b"] }
        });
        pipeline.rewrite(&mut schema, &mut registry);
        let once = schema.clone();
        pipeline.rewrite(&mut schema, &mut registry);
        assert_eq!(schema, once);
    }
}
