//! `if`/`then`/`else` → `oneOf`
//!
//! OpenAPI 3.0 has no conditional composition. The condition is hoisted into
//! its own component and referenced from both branches:
//!
//! ```json
//! { "oneOf": [
//!     { "allOf": [{ "$ref": "#/components/schemas/if-0" }, <then>] },
//!     { "allOf": [{ "not": { "$ref": "#/components/schemas/if-0" } }, <else>] }
//! ] }
//! ```
//!
//! This is an approximation: unlike `if`, `oneOf` also fails when both
//! branches match, which cannot happen here because the branches are
//! mutually exclusive on the condition.

use serde_json::{Map, Value};

use super::{object, set_one_of, RewriteContext, SchemaRewriteRule};
use crate::registry::component_ref_schema;

/// Name prefix of hoisted conditions
pub const DEFAULT_CONDITIONAL_PREFIX: &str = "if-";

#[derive(Debug, Clone)]
pub struct IfThenElse {
    prefix: String,
}

impl IfThenElse {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for IfThenElse {
    fn default() -> Self {
        Self::new(DEFAULT_CONDITIONAL_PREFIX)
    }
}

impl SchemaRewriteRule for IfThenElse {
    fn name(&self) -> &'static str {
        "if-then-else"
    }

    fn apply(&self, node: &mut Map<String, Value>, cx: &mut RewriteContext<'_>) {
        let condition = take_present(node, "if");
        let then_branch = take_present(node, "then");
        let else_branch = take_present(node, "else");

        let Some(condition) = condition else {
            return;
        };
        if then_branch.is_none() && else_branch.is_none() {
            return;
        }

        let name = cx.registry().allocate(&self.prefix);
        let mut condition = normalize_boolean(condition);
        cx.rewrite(&mut condition);
        cx.registry().register(name.clone(), condition);
        tracing::debug!(component = %name, "hoisted conditional");

        let mut branches = Vec::with_capacity(2);
        if let Some(then_branch) = then_branch {
            branches.push(object([(
                "allOf",
                Value::Array(vec![component_ref_schema(&name), normalize_boolean(then_branch)]),
            )]));
        }
        if let Some(else_branch) = else_branch {
            branches.push(object([(
                "allOf",
                Value::Array(vec![
                    object([("not", component_ref_schema(&name))]),
                    normalize_boolean(else_branch),
                ]),
            )]));
        }

        set_one_of(node, branches);
    }
}

/// Remove a keyword, treating `null` as absent
fn take_present(node: &mut Map<String, Value>, key: &str) -> Option<Value> {
    node.remove(key).filter(|v| !v.is_null())
}

/// `true` → `{}`, `false` → `{"not": {}}`
fn normalize_boolean(schema: Value) -> Value {
    match schema {
        Value::Bool(true) => Value::Object(Map::new()),
        Value::Bool(false) => object([("not", Value::Object(Map::new()))]),
        other => other,
    }
}
