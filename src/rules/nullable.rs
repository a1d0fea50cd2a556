//! Null handling: OpenAPI 3.0 has no `null` type, only `nullable`

use serde_json::{Map, Value};

use super::{RewriteContext, SchemaRewriteRule};

fn is_null_type(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn mark_nullable(node: &mut Map<String, Value>) {
    node.insert("nullable".to_string(), Value::Bool(true));
}

/// Drops `required: []`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRequired;

impl SchemaRewriteRule for EmptyRequired {
    fn name(&self) -> &'static str {
        "empty-required"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        if matches!(node.get("required"), Some(Value::Array(names)) if names.is_empty()) {
            node.remove("required");
        }
    }
}

/// `type: "null"` → `nullable: true`
#[derive(Debug, Clone, Copy, Default)]
pub struct NullType;

impl SchemaRewriteRule for NullType {
    fn name(&self) -> &'static str {
        "null-type"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        if node.get("type").and_then(Value::as_str) == Some("null") {
            node.remove("type");
            mark_nullable(node);
        }
    }
}

/// Collapses `type: "null"` branches of `oneOf` and `anyOf`
///
/// The null branch is removed and the surviving branches become
/// `nullable`. A composition made only of null branches disappears and the
/// node itself becomes `nullable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBranches;

impl SchemaRewriteRule for NullBranches {
    fn name(&self) -> &'static str {
        "null-branches"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        for keyword in ["oneOf", "anyOf"] {
            let Some(Value::Array(branches)) = node.get_mut(keyword) else {
                continue;
            };
            if !branches.iter().any(is_null_type) {
                continue;
            }

            branches.retain(|branch| !is_null_type(branch));
            for branch in branches.iter_mut() {
                if let Value::Object(branch) = branch {
                    mark_nullable(branch);
                }
            }

            if branches.is_empty() {
                node.remove(keyword);
                mark_nullable(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::apply_rule;
    use serde_json::json;

    #[test]
    fn test_empty_required_removed() {
        assert_eq!(apply_rule(&EmptyRequired, json!({ "required": [] })), json!({}));
        assert_eq!(
            apply_rule(&EmptyRequired, json!({ "required": ["a"] })),
            json!({ "required": ["a"] })
        );
    }

    #[test]
    fn test_null_type() {
        assert_eq!(
            apply_rule(&NullType, json!({ "type": "null", "description": "nothing" })),
            json!({ "nullable": true, "description": "nothing" })
        );
    }

    #[test]
    fn test_null_branch_in_one_of() {
        let out = apply_rule(
            &NullBranches,
            json!({ "oneOf": [{ "type": "string" }, { "type": "null" }, { "type": "integer" }] }),
        );
        assert_eq!(
            out,
            json!({
                "oneOf": [
                    { "type": "string", "nullable": true },
                    { "type": "integer", "nullable": true }
                ]
            })
        );
    }

    #[test]
    fn test_null_branch_in_one_of_and_any_of() {
        let out = apply_rule(
            &NullBranches,
            json!({
                "oneOf": [{ "type": "null" }, { "type": "string" }],
                "anyOf": [{ "type": "null" }, { "type": "number" }]
            }),
        );
        assert_eq!(
            out,
            json!({
                "oneOf": [{ "type": "string", "nullable": true }],
                "anyOf": [{ "type": "number", "nullable": true }]
            })
        );
    }

    #[test]
    fn test_only_null_branches() {
        let out = apply_rule(&NullBranches, json!({ "anyOf": [{ "type": "null" }] }));
        assert_eq!(out, json!({ "nullable": true }));
    }

    #[test]
    fn test_without_null_branch_untouched() {
        let schema = json!({ "oneOf": [{ "type": "string" }, { "type": "number" }] });
        assert_eq!(apply_rule(&NullBranches, schema.clone()), schema);
    }
}
