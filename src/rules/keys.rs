//! Keyword-level rules: spelling, array shape and the final whitelist

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::keywords::{ALWAYS_DROPPED, ARRAY_KEYWORDS, CAMEL_CASED_KEYWORDS, OPENAPI_KEYWORDS};
use super::{RewriteContext, SchemaRewriteRule};
use crate::config::ConvertConfig;

/// Renames mis-cased keywords (`anyof`, `AllOf`, ...) to their camelCase form
///
/// When both spellings are present the mis-cased value wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCaseKeys;

impl SchemaRewriteRule for CamelCaseKeys {
    fn name(&self) -> &'static str {
        "camel-case-keys"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        let renames: Vec<(String, &'static str)> = node
            .keys()
            .filter_map(|key| {
                CAMEL_CASED_KEYWORDS
                    .iter()
                    .find(|canonical| {
                        key.eq_ignore_ascii_case(canonical) && key.as_str() != **canonical
                    })
                    .map(|canonical| (key.clone(), *canonical))
            })
            .collect();

        for (key, canonical) in renames {
            if let Some(value) = node.remove(&key) {
                node.insert(canonical.to_string(), value);
            }
        }
    }
}

/// Wraps a non-array `allOf`/`oneOf`/`anyOf`/`enum`/`required` in an array
///
/// `required` additionally loses every entry that is not a property name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayKeywords;

impl SchemaRewriteRule for ArrayKeywords {
    fn name(&self) -> &'static str {
        "array-keywords"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        for keyword in ARRAY_KEYWORDS {
            if let Some(value) = node.get_mut(*keyword) {
                if !value.is_array() {
                    let single = value.take();
                    *value = Value::Array(vec![single]);
                }
            }
        }

        if let Some(Value::Array(required)) = node.get_mut("required") {
            required.retain(Value::is_string);
        }
    }
}

/// Removes every keyword OpenAPI 3.0 does not know
#[derive(Debug, Clone)]
pub struct StripKeywords {
    allowed: HashSet<String>,
    keep_extensions: bool,
}

impl Default for StripKeywords {
    fn default() -> Self {
        Self::from_config(&ConvertConfig::default())
    }
}

impl StripKeywords {
    pub fn from_config(config: &ConvertConfig) -> Self {
        let allowed = OPENAPI_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .chain(config.extra_keywords.iter().cloned())
            .filter(|k| !ALWAYS_DROPPED.contains(&k.as_str()))
            .collect();
        Self {
            allowed,
            keep_extensions: config.keep_extensions,
        }
    }

    fn keeps(&self, key: &str) -> bool {
        if ALWAYS_DROPPED.contains(&key) {
            return false;
        }
        self.allowed.contains(key) || (self.keep_extensions && key.starts_with("x-"))
    }
}

impl SchemaRewriteRule for StripKeywords {
    fn name(&self) -> &'static str {
        "strip-keywords"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        node.retain(|key, _| self.keeps(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::apply_rule;
    use serde_json::json;

    #[test]
    fn test_camel_case_keys() {
        let out = apply_rule(
            &CamelCaseKeys,
            json!({ "anyof": [{}], "ADDITIONALPROPERTIES": false, "maxLength": 3 }),
        );
        assert_eq!(
            out,
            json!({ "anyOf": [{}], "additionalProperties": false, "maxLength": 3 })
        );
    }

    #[test]
    fn test_mis_cased_value_wins() {
        let out = apply_rule(&CamelCaseKeys, json!({ "oneOf": [1], "oneof": [2] }));
        assert_eq!(out, json!({ "oneOf": [2] }));
    }

    #[test]
    fn test_array_keywords_wrapped() {
        let out = apply_rule(
            &ArrayKeywords,
            json!({
                "allOf": { "type": "string" },
                "enum": "a",
                "required": "name",
                "oneOf": [{}]
            }),
        );
        assert_eq!(
            out,
            json!({
                "allOf": [{ "type": "string" }],
                "enum": ["a"],
                "required": ["name"],
                "oneOf": [{}]
            })
        );
    }

    #[test]
    fn test_boolean_required_is_emptied() {
        let out = apply_rule(&ArrayKeywords, json!({ "required": true }));
        assert_eq!(out, json!({ "required": [] }));

        let out = apply_rule(&ArrayKeywords, json!({ "required": ["a", 1, "b"] }));
        assert_eq!(out, json!({ "required": ["a", "b"] }));
    }

    #[test]
    fn test_strip_keywords() {
        let out = apply_rule(
            &StripKeywords::default(),
            json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "$id": "urn:x",
                "type": "object",
                "nullable": true,
                "patternProperties": {},
                "examples": [1],
                "x-internal": true
            }),
        );
        assert_eq!(out, json!({ "type": "object", "nullable": true }));
    }

    #[test]
    fn test_strip_policy_extensions() {
        let config = ConvertConfig {
            keep_extensions: true,
            extra_keywords: vec!["const".to_string(), "examples".to_string()],
            ..ConvertConfig::default()
        };
        let out = apply_rule(
            &StripKeywords::from_config(&config),
            json!({ "x-internal": true, "const": 1, "examples": [1], "id": "a" }),
        );
        assert_eq!(out, json!({ "x-internal": true, "const": 1 }));
    }
}
