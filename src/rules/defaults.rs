//! `default` handling

use regex::Regex;
use serde_json::{Map, Value};

use super::{RewriteContext, SchemaRewriteRule};

/// Coerces `default` into the node's declared `type`
///
/// - `object`: a string naming one of the properties becomes
///   `{<property>: <zero value of the property's type>}`
/// - `array`: missing `items` become `{nullable: true}`; a scalar default is
///   wrapped in an array
/// - `boolean`: `"true"`/`"false"` become booleans
/// - `number`/`integer`: a string is parsed by its leading integer, `1` when
///   it has none
/// - `string`: anything else is rendered as JSON text
#[derive(Debug, Clone)]
pub struct DefaultValues {
    leading_integer: Regex,
}

impl Default for DefaultValues {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultValues {
    pub fn new() -> Self {
        Self {
            leading_integer: Regex::new(r"^\s*([+-]?\d+)")
                .expect("leading integer pattern is valid"),
        }
    }

    fn parse_leading_integer(&self, text: &str) -> Value {
        let Some(digits) = self.leading_integer.captures(text).and_then(|c| c.get(1)) else {
            return Value::from(1);
        };
        let digits = digits.as_str();
        if let Ok(n) = digits.parse::<i64>() {
            return Value::from(n);
        }
        match digits.parse::<f64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::from(1),
        }
    }
}

/// Zero value of a property, by the property's declared type
fn zero_value(property: Option<&Value>) -> Option<Value> {
    let type_name = property?.get("type")?.as_str()?;
    match type_name {
        "string" => Some(Value::String(String::new())),
        "number" | "integer" => Some(Value::from(0)),
        "array" => Some(Value::Array(Vec::new())),
        "object" => Some(Value::Object(Map::new())),
        "boolean" => Some(Value::Bool(true)),
        _ => None,
    }
}

impl SchemaRewriteRule for DefaultValues {
    fn name(&self) -> &'static str {
        "default-values"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        let Some(type_name) = node.get("type").and_then(Value::as_str).map(str::to_string) else {
            return;
        };

        match type_name.as_str() {
            "object" => {
                let Some(Value::String(property)) = node.get("default") else {
                    return;
                };
                let Some(Value::Object(properties)) = node.get("properties") else {
                    return;
                };
                if !properties.contains_key(property) {
                    return;
                }
                let mut default = Map::new();
                if let Some(zero) = zero_value(properties.get(property)) {
                    default.insert(property.clone(), zero);
                }
                node.insert("default".to_string(), Value::Object(default));
            }
            "array" => {
                if !node.contains_key("items") {
                    let mut items = Map::new();
                    items.insert("nullable".to_string(), Value::Bool(true));
                    node.insert("items".to_string(), Value::Object(items));
                }
                if let Some(default) = node.get_mut("default") {
                    if !default.is_array() && !default.is_null() {
                        let single = default.take();
                        *default = Value::Array(vec![single]);
                    }
                }
            }
            "boolean" => {
                if let Some(default) = node.get_mut("default") {
                    match default.as_str() {
                        Some("true") => *default = Value::Bool(true),
                        Some("false") => *default = Value::Bool(false),
                        _ => {}
                    }
                }
            }
            "number" | "integer" => {
                if let Some(default) = node.get_mut("default") {
                    if let Some(text) = default.as_str() {
                        *default = self.parse_leading_integer(text);
                    }
                }
            }
            "string" => {
                if let Some(default) = node.get_mut("default") {
                    if !default.is_string() {
                        *default = Value::String(default.to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

/// Moves a sibling `default` into the branches of a composition
///
/// `allOf` is preferred over `oneOf`, `oneOf` over `anyOf`. The value is
/// copied into every object branch and removed from the parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoistOrphans;

const ORPHAN_KEYWORDS: &[&str] = &["default"];

impl SchemaRewriteRule for HoistOrphans {
    fn name(&self) -> &'static str {
        "hoist-orphans"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        let Some(composition) = ["allOf", "oneOf", "anyOf"]
            .into_iter()
            .find(|k| node.get(*k).is_some_and(Value::is_array))
        else {
            return;
        };

        for keyword in ORPHAN_KEYWORDS {
            let Some(value) = node.remove(*keyword) else {
                continue;
            };
            if let Some(Value::Array(branches)) = node.get_mut(composition) {
                for branch in branches.iter_mut().filter_map(Value::as_object_mut) {
                    branch.insert(keyword.to_string(), value.clone());
                }
            }
        }
    }
}
