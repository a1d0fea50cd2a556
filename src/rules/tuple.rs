//! Tuple `items` → single `items` schema

use serde_json::{Map, Value};

use super::{RewriteContext, SchemaRewriteRule};
use crate::config::TupleItemsPolicy;

/// OpenAPI only supports list validation, so a tuple of item schemas is
/// collapsed into one
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleItems {
    policy: TupleItemsPolicy,
}

impl TupleItems {
    pub fn new(policy: TupleItemsPolicy) -> Self {
        Self { policy }
    }
}

impl SchemaRewriteRule for TupleItems {
    fn name(&self) -> &'static str {
        "tuple-items"
    }

    fn apply(&self, node: &mut Map<String, Value>, _cx: &mut RewriteContext<'_>) {
        let Some(Value::Array(entries)) = node.get("items") else {
            return;
        };

        let merged = match self.policy {
            TupleItemsPolicy::First => entries
                .first()
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            TupleItemsPolicy::Merge => {
                let mut merged = Map::new();
                for entry in entries.iter().filter_map(Value::as_object) {
                    for (key, value) in entry {
                        if !merged.contains_key(key) {
                            merged.insert(key.clone(), value.clone());
                        }
                    }
                }
                merged
            }
        };

        node.insert("items".to_string(), Value::Object(merged));
    }
}
