//! `const` → `enum`

use serde_json::{Map, Value};

use super::{RewriteContext, SchemaRewriteRule};

/// OpenAPI 3.0 has no `const`; a one-value `enum` says the same thing
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstToEnum;

impl SchemaRewriteRule for ConstToEnum {
    fn name(&self) -> &'static str {
        "const-to-enum"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        if let Some(value) = node.remove("const") {
            node.insert("enum".to_string(), Value::Array(vec![value]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::apply_rule;
    use serde_json::json;

    #[test]
    fn test_const_becomes_enum() {
        let out = apply_rule(&ConstToEnum, json!({ "type": "string", "const": "blah" }));
        assert_eq!(out, json!({ "type": "string", "enum": ["blah"] }));
    }

    #[test]
    fn test_falsy_const_is_kept() {
        let out = apply_rule(&ConstToEnum, json!({ "const": false }));
        assert_eq!(out, json!({ "enum": [false] }));

        let out = apply_rule(&ConstToEnum, json!({ "const": null }));
        assert_eq!(out, json!({ "enum": [null] }));
    }

    #[test]
    fn test_without_const_untouched() {
        let out = apply_rule(&ConstToEnum, json!({ "enum": [1, 2] }));
        assert_eq!(out, json!({ "enum": [1, 2] }));
    }
}
