//! Depth-first schema traversal
//!
//! Visits every subschema reachable through schema-bearing keywords, in
//! document order, using an explicit work stack of JSON pointers. The child
//! list of a node is computed once, right after its visitor returns, so a
//! visitor may freely rewrite the node it is given: children it creates are
//! visited, children it removes are not.
//!
//! Only JSON objects are visited. The input must be a tree; cycles are cut by
//! the extractor before anything is walked.

use serde_json::{Map, Value};

/// Keywords whose value is a list of subschemas
pub const SCHEMA_LIST_KEYWORDS: &[&str] = &["items", "prefixItems", "allOf", "anyOf", "oneOf"];

/// Keywords whose value is a map from names to subschemas
pub const SCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependencies",
    "dependentSchemas",
];

/// Keywords whose value is a single subschema
pub const SCHEMA_KEYWORDS: &[&str] = &[
    "items",
    "additionalItems",
    "additionalProperties",
    "contains",
    "propertyNames",
    "not",
    "if",
    "then",
    "else",
];

/// Where the visited node hangs in its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    /// JSON pointer of the parent node
    pub pointer: String,
    /// Keyword of the parent under which the node sits
    pub keyword: &'static str,
    /// Property name or list index below the keyword, if any
    pub property: Option<String>,
}

/// Position of a visited node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// JSON pointer of the node, `""` for the root
    pub pointer: String,
    /// `None` for the root
    pub parent: Option<ParentLink>,
}

impl Visit {
    fn root() -> Self {
        Self {
            pointer: String::new(),
            parent: None,
        }
    }
}

/// Escape one JSON pointer reference token
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Walk a schema tree mutably
///
/// The visitor receives the node and its [`Visit`]; the root and the parent
/// node can be reached through the pointers once the visitor has returned.
pub fn walk_mut<F>(root: &mut Value, mut visitor: F)
where
    F: FnMut(&mut Value, &Visit),
{
    let mut stack = vec![Visit::root()];

    while let Some(visit) = stack.pop() {
        let Some(node) = root.pointer_mut(&visit.pointer) else {
            continue;
        };
        if !node.is_object() {
            continue;
        }

        visitor(node, &visit);

        if let Value::Object(map) = node {
            let children = child_visits(&visit.pointer, map);
            stack.extend(children.into_iter().rev());
        }
    }
}

/// Walk a schema tree read-only
///
/// The visitor receives the node, its [`Visit`], the root and the parent
/// node (`None` for the root).
pub fn walk<'a, F>(root: &'a Value, mut visitor: F)
where
    F: FnMut(&'a Value, &Visit, &'a Value, Option<&'a Value>),
{
    let mut stack = vec![Visit::root()];

    while let Some(visit) = stack.pop() {
        let Some(node) = root.pointer(&visit.pointer) else {
            continue;
        };
        let Value::Object(map) = node else {
            continue;
        };

        let parent = visit.parent.as_ref().and_then(|p| root.pointer(&p.pointer));
        visitor(node, &visit, root, parent);

        let children = child_visits(&visit.pointer, map);
        stack.extend(children.into_iter().rev());
    }
}

fn child_visits(pointer: &str, node: &Map<String, Value>) -> Vec<Visit> {
    let mut out = Vec::new();
    let link = |keyword: &'static str, property: Option<String>| ParentLink {
        pointer: pointer.to_string(),
        keyword,
        property,
    };

    for (key, value) in node {
        match value {
            Value::Array(items) => {
                let Some(keyword) = lookup(SCHEMA_LIST_KEYWORDS, key) else {
                    continue;
                };
                for (i, item) in items.iter().enumerate() {
                    if item.is_object() {
                        out.push(Visit {
                            pointer: format!("{}/{}/{}", pointer, keyword, i),
                            parent: Some(link(keyword, Some(i.to_string()))),
                        });
                    }
                }
            }
            Value::Object(map) => {
                if let Some(keyword) = lookup(SCHEMA_MAP_KEYWORDS, key) {
                    for (name, item) in map {
                        if item.is_object() {
                            out.push(Visit {
                                pointer: format!(
                                    "{}/{}/{}",
                                    pointer,
                                    escape_pointer_token(keyword),
                                    escape_pointer_token(name)
                                ),
                                parent: Some(link(keyword, Some(name.clone()))),
                            });
                        }
                    }
                } else if let Some(keyword) = lookup(SCHEMA_KEYWORDS, key) {
                    out.push(Visit {
                        pointer: format!("{}/{}", pointer, keyword),
                        parent: Some(link(keyword, None)),
                    });
                }
            }
            _ => {}
        }
    }

    out
}

fn lookup(table: &[&'static str], key: &str) -> Option<&'static str> {
    table.iter().copied().find(|k| *k == key)
}
