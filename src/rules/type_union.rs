//! `type: [..]` → `oneOf`

use serde_json::{Map, Value};

use super::keywords::value_matches_type;
use super::{set_one_of, RewriteContext, SchemaRewriteRule};
use crate::config::EnumSplitPolicy;

/// Splits a type array into one `oneOf` branch per type
///
/// `"null"` does not get a branch of its own; the remaining branches are
/// marked `nullable` instead. Type-specific keywords move into the branch of
/// their type: `enum` values and `default` by runtime type, `items` into the
/// array branch, `properties` into the object branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeArrays {
    enum_split: EnumSplitPolicy,
}

impl TypeArrays {
    pub fn new(enum_split: EnumSplitPolicy) -> Self {
        Self { enum_split }
    }

    fn split_enum(
        &self,
        types: &[String],
        values: &[Value],
        nullable: bool,
    ) -> Vec<Vec<Value>> {
        if self.enum_split == EnumSplitPolicy::Duplicate {
            return types.iter().map(|_| values.to_vec()).collect();
        }

        let with_null = nullable && values.iter().any(Value::is_null);
        types
            .iter()
            .map(|t| {
                let mut partition: Vec<Value> = values
                    .iter()
                    .filter(|v| value_matches_type(v, t))
                    .cloned()
                    .collect();
                if with_null && !partition.is_empty() {
                    partition.push(Value::Null);
                }
                partition
            })
            .collect()
    }
}

impl SchemaRewriteRule for TypeArrays {
    fn name(&self) -> &'static str {
        "type-array"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        let Some(Value::Array(declared)) = node.get("type") else {
            return;
        };

        let mut types: Vec<String> = Vec::new();
        let mut nullable = false;
        for t in declared.iter().filter_map(Value::as_str) {
            if t == "null" {
                nullable = true;
            } else if !types.iter().any(|seen| seen == t) {
                types.push(t.to_string());
            }
        }

        node.remove("type");

        if types.is_empty() {
            if nullable {
                node.insert("nullable".to_string(), Value::Bool(true));
            }
            return;
        }

        let enum_values = node.remove("enum").map(|v| match v {
            Value::Array(values) => values,
            other => vec![other],
        });
        let default = node.remove("default");
        let enums: Vec<Option<Vec<Value>>> = match &enum_values {
            Some(values) => self
                .split_enum(&types, values, nullable)
                .into_iter()
                .map(Some)
                .collect(),
            None => types.iter().map(|_| None).collect(),
        };

        let mut branches = Vec::with_capacity(types.len());
        for (t, branch_enum) in types.iter().zip(enums) {
            let mut branch = Map::new();
            branch.insert("type".to_string(), Value::String(t.clone()));
            if nullable {
                branch.insert("nullable".to_string(), Value::Bool(true));
            }
            // No enum value of this type: the branch matches nothing
            let unsatisfiable = matches!(&branch_enum, Some(values) if values.is_empty());
            match branch_enum {
                Some(values) if !values.is_empty() => {
                    branch.insert("enum".to_string(), Value::Array(values));
                }
                Some(_) => {
                    branch.insert("not".to_string(), Value::Object(Map::new()));
                }
                None => {}
            }
            if let Some(default) = default
                .as_ref()
                .filter(|d| !unsatisfiable && value_matches_type(d, t))
            {
                branch.insert("default".to_string(), default.clone());
            }
            match t.as_str() {
                "array" => {
                    if let Some(items) = node.remove("items") {
                        branch.insert("items".to_string(), items);
                    }
                }
                "object" => {
                    if let Some(properties) = node.remove("properties") {
                        branch.insert("properties".to_string(), properties);
                    }
                }
                _ => {}
            }
            branches.push(Value::Object(branch));
        }

        set_one_of(node, branches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::apply_rule;
    use serde_json::json;

    fn split(schema: Value) -> Value {
        apply_rule(&TypeArrays::default(), schema)
    }

    #[test]
    fn test_plain_type_array() {
        assert_eq!(
            split(json!({ "type": ["string", "number"] })),
            json!({ "oneOf": [{ "type": "string" }, { "type": "number" }] })
        );
    }

    #[test]
    fn test_null_becomes_nullable() {
        assert_eq!(
            split(json!({ "type": ["string", "null"] })),
            json!({ "oneOf": [{ "type": "string", "nullable": true }] })
        );
        assert_eq!(split(json!({ "type": ["null"] })), json!({ "nullable": true }));
    }

    #[test]
    fn test_duplicate_and_foreign_types_ignored() {
        assert_eq!(
            split(json!({ "type": ["string", "string", 4] })),
            json!({ "oneOf": [{ "type": "string" }] })
        );
    }

    #[test]
    fn test_enum_is_partitioned() {
        assert_eq!(
            split(json!({
                "type": ["string", "integer", "null"],
                "enum": ["a", 1, null, "b"]
            })),
            json!({
                "oneOf": [
                    { "type": "string", "nullable": true, "enum": ["a", "b", null] },
                    { "type": "integer", "nullable": true, "enum": [1, null] }
                ]
            })
        );
    }

    #[test]
    fn test_branch_without_enum_values_matches_nothing() {
        let out = split(json!({ "type": ["string", "boolean"], "enum": ["a"], "default": true }));
        assert_eq!(
            out,
            json!({
                "oneOf": [
                    { "type": "string", "enum": ["a"] },
                    { "type": "boolean", "not": {} }
                ]
            })
        );
        assert_eq!(out["oneOf"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_enum_matching_no_branch_stays_unsatisfiable() {
        assert_eq!(
            split(json!({ "type": ["string", "boolean", "null"], "enum": [1] })),
            json!({
                "oneOf": [
                    { "type": "string", "nullable": true, "not": {} },
                    { "type": "boolean", "nullable": true, "not": {} }
                ]
            })
        );
    }

    #[test]
    fn test_duplicate_enum_policy() {
        let out = apply_rule(
            &TypeArrays::new(EnumSplitPolicy::Duplicate),
            json!({ "type": ["string", "number"], "enum": ["a", 1] }),
        );
        assert_eq!(
            out,
            json!({
                "oneOf": [
                    { "type": "string", "enum": ["a", 1] },
                    { "type": "number", "enum": ["a", 1] }
                ]
            })
        );
    }

    #[test]
    fn test_default_goes_to_matching_branch() {
        assert_eq!(
            split(json!({ "type": ["boolean", "string"], "default": false })),
            json!({
                "oneOf": [
                    { "type": "boolean", "default": false },
                    { "type": "string" }
                ]
            })
        );
    }

    #[test]
    fn test_items_and_properties_move() {
        assert_eq!(
            split(json!({
                "type": ["array", "object"],
                "items": { "type": "string" },
                "properties": { "a": {} },
                "description": "either"
            })),
            json!({
                "description": "either",
                "oneOf": [
                    { "type": "array", "items": { "type": "string" } },
                    { "type": "object", "properties": { "a": {} } }
                ]
            })
        );
    }

    #[test]
    fn test_existing_one_of_is_preserved() {
        assert_eq!(
            split(json!({ "type": ["string", "number"], "oneOf": [{ "minimum": 1 }] })),
            json!({
                "allOf": [{ "oneOf": [{ "minimum": 1 }] }],
                "oneOf": [{ "type": "string" }, { "type": "number" }]
            })
        );
    }

    #[test]
    fn test_scalar_type_untouched() {
        assert_eq!(
            split(json!({ "type": "string", "enum": ["a"] })),
            json!({ "type": "string", "enum": ["a"] })
        );
    }
}
