//! Local `$ref` resolution
//!
//! Turns a JSON Schema whose recursion is spelled with `$ref` into the graph
//! the converter works on: every `{"$ref": "#/..."}` object whose pointer
//! resolves inside the same document is replaced by a link to the target
//! node. Recursive definitions therefore become real cycles, which the cycle
//! detector and extractor then cut into components.
//!
//! Keywords next to `$ref` are ignored (draft-07 semantics). References that
//! are external, point at nothing, or only point at each other stay in the
//! document as written.

use std::collections::{HashMap, HashSet};

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::document::{Item, NodeId, SchemaDocument};
use crate::error::Result;
use crate::traverse::escape_pointer_token;

/// Build a document from `value`, linking local references to their targets
pub fn dereference(value: &Value) -> Result<SchemaDocument> {
    let mut doc = SchemaDocument::from_value(value)?;
    let pointers = index_pointers(&doc);

    let mut targets = HashMap::new();
    for id in doc.node_ids() {
        if reference_of(&doc, id).is_none() {
            continue;
        }
        if let Some(target) = resolve_chain(&doc, &pointers, id) {
            targets.insert(id, target);
        }
    }

    tracing::debug!(resolved = targets.len(), "dereferenced local $refs");
    doc.redirect(&targets);
    Ok(doc)
}

/// The `$ref` string of a node, if it has one
fn reference_of(doc: &SchemaDocument, id: NodeId) -> Option<&str> {
    match doc.node(id).get("$ref")? {
        Item::Scalar(Value::String(reference)) => Some(reference),
        _ => None,
    }
}

/// Decoded JSON pointer of a same-document reference
///
/// `None` for references into other documents.
fn local_pointer(reference: &str) -> Option<String> {
    let fragment = reference.strip_prefix('#')?;
    let decoded = percent_decode_str(fragment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| fragment.to_string());
    Some(decoded)
}

/// Follow a chain of references to the first node that is not one
fn resolve_chain(
    doc: &SchemaDocument,
    pointers: &HashMap<String, NodeId>,
    start: NodeId,
) -> Option<NodeId> {
    let mut seen = HashSet::new();
    let mut current = start;

    while let Some(reference) = reference_of(doc, current) {
        if !seen.insert(current) {
            tracing::warn!(reference, "reference loop left in place");
            return None;
        }
        let Some(pointer) = local_pointer(reference) else {
            tracing::warn!(reference, "external reference left in place");
            return None;
        };
        let Some(&target) = pointers.get(&pointer) else {
            tracing::warn!(reference, "unresolvable reference left in place");
            return None;
        };
        current = target;
    }

    Some(current)
}

/// JSON pointer of every node, as laid out in the source document
fn index_pointers(doc: &SchemaDocument) -> HashMap<String, NodeId> {
    let mut pointers = HashMap::new();
    let mut stack: Vec<(String, &Item)> = Vec::new();

    let root = doc.root();
    pointers.insert(String::new(), root);
    for (key, item) in doc.node(root).iter() {
        stack.push((format!("/{}", escape_pointer_token(key)), item));
    }

    while let Some((pointer, item)) = stack.pop() {
        match item {
            Item::Node(id) => {
                for (key, child) in doc.node(*id).iter() {
                    stack.push((format!("{}/{}", pointer, escape_pointer_token(key)), child));
                }
                pointers.insert(pointer, *id);
            }
            Item::List(items) => {
                for (i, child) in items.iter().enumerate() {
                    stack.push((format!("{}/{}", pointer, i), child));
                }
            }
            Item::Scalar(_) => {}
        }
    }

    pointers
}
