//! Schema graph arena
//!
//! A JSON Schema that has been dereferenced is a graph, not a tree: the same
//! subschema may be reachable from several places and recursive definitions
//! point back at their own ancestors. Every JSON object of the document is
//! stored once in the arena and addressed by a [`NodeId`]; links between
//! objects are ids, so aliasing and cycles are plain data.
//!
//! The rewrite pipeline itself works on `serde_json::Value` trees. Once the
//! cycle extractor has cut every back-edge, [`SchemaDocument::to_value`]
//! materialises any node into such a tree.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{ConvertError, Result};

/// Stable identity of a schema node inside one [`SchemaDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value stored under a keyword of a [`SchemaNode`]
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `null`, boolean, number or string
    Scalar(Value),
    /// Ordered sequence
    List(Vec<Item>),
    /// Link to another node of the same document
    Node(NodeId),
}

impl Item {
    /// Shorthand for a string scalar
    pub fn string(s: impl Into<String>) -> Self {
        Item::Scalar(Value::String(s.into()))
    }
}

/// One JSON object of the document, keys in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    entries: IndexMap<String, Item>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a keyword, keeping the position of an existing key
    pub fn insert(&mut self, key: impl Into<String>, item: Item) -> Option<Item> {
        self.entries.insert(key.into(), item)
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.entries.get_mut(key)
    }

    /// Remove a keyword, preserving the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<Item> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Item)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Item)> for SchemaNode {
    fn from_iter<T: IntoIterator<Item = (K, Item)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// =============================================================================
// Paths
// =============================================================================

/// A step from a container to one of its values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A keyword (or property name) of a node
    Key(String),
    /// A position in a sequence
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Path from the document root to a value
pub type NodePath = Vec<PathSegment>;

/// Format a path dot-separated, `<root>` for the empty path
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return String::from("<root>");
    }
    path.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

/// The location of a value: the node that owns it plus the key and list
/// indices leading to it from there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub owner: NodeId,
    pub key: String,
    pub indices: Vec<usize>,
}

// =============================================================================
// Document
// =============================================================================

/// Arena holding every node of one schema document
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    nodes: Vec<SchemaNode>,
    root: NodeId,
}

impl Default for SchemaDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaDocument {
    /// A document whose root is an empty node
    pub fn new() -> Self {
        Self {
            nodes: vec![SchemaNode::new()],
            root: NodeId(0),
        }
    }

    /// Deep-copy a JSON value into a fresh arena
    ///
    /// Boolean roots are normalised: `true` becomes `{}` and `false` becomes
    /// `{"not": {}}`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = match value {
            Value::Object(map) => doc.import_object(map),
            Value::Bool(b) => {
                let node = boolean_schema_node(&mut doc.nodes, *b);
                doc.add_node(node)
            }
            other => return Err(ConvertError::InvalidRoot(json_type_name(other).to_string())),
        };
        Ok(doc)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, reachable or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, node: SchemaNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Ids are only minted by this arena, so indexing cannot go out of bounds
    /// for ids obtained from it.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// Every id of the arena, in allocation order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Re-point every link (and the root) that targets a key of `targets`
    /// at the mapped node
    pub fn redirect(&mut self, targets: &HashMap<NodeId, NodeId>) {
        if targets.is_empty() {
            return;
        }
        for node in &mut self.nodes {
            for item in node.entries.values_mut() {
                redirect_item(item, targets);
            }
        }
        if let Some(&target) = targets.get(&self.root) {
            self.root = target;
        }
    }

    /// Copy a JSON value into the arena, allocating a node per object
    pub fn import(&mut self, value: &Value) -> Item {
        match value {
            Value::Object(map) => Item::Node(self.import_object(map)),
            Value::Array(items) => Item::List(items.iter().map(|v| self.import(v)).collect()),
            scalar => Item::Scalar(scalar.clone()),
        }
    }

    fn import_object(&mut self, map: &Map<String, Value>) -> NodeId {
        let node = map
            .iter()
            .map(|(k, v)| (k.clone(), self.import(v)))
            .collect::<SchemaNode>();
        self.add_node(node)
    }

    /// Every node linked directly from `id`, with the relative path to it,
    /// in document order
    pub fn children(&self, id: NodeId) -> Vec<(NodePath, NodeId)> {
        let mut out = Vec::new();
        for (key, item) in self.node(id).iter() {
            collect_links(item, vec![PathSegment::Key(key.clone())], &mut out);
        }
        out
    }

    /// Locate the value at `path`, measured from the root
    ///
    /// Returns `None` for the empty path (the root has no owner) and for any
    /// path that does not exist.
    pub fn resolve_slot(&self, path: &[PathSegment]) -> Option<Slot> {
        let mut current = Item::Node(self.root);
        let mut slot: Option<Slot> = None;

        for segment in path {
            let next = match (&current, segment) {
                (Item::Node(id), PathSegment::Key(key)) => {
                    slot = Some(Slot {
                        owner: *id,
                        key: key.clone(),
                        indices: Vec::new(),
                    });
                    self.node(*id).get(key)?.clone()
                }
                (Item::List(items), PathSegment::Index(i)) => {
                    slot.as_mut()?.indices.push(*i);
                    items.get(*i)?.clone()
                }
                // Numeric keys address list positions too
                (Item::List(items), PathSegment::Key(key)) => {
                    let i: usize = key.parse().ok()?;
                    slot.as_mut()?.indices.push(i);
                    items.get(i)?.clone()
                }
                _ => return None,
            };
            current = next;
        }

        slot
    }

    /// Overwrite the value at a slot; `false` if the slot no longer exists
    pub fn replace(&mut self, slot: &Slot, item: Item) -> bool {
        let Some(mut target) = self.node_mut(slot.owner).get_mut(&slot.key) else {
            return false;
        };
        for &i in &slot.indices {
            target = match target {
                Item::List(items) => match items.get_mut(i) {
                    Some(next) => next,
                    None => return false,
                },
                _ => return false,
            };
        }
        *target = item;
        true
    }

    /// Materialise the tree rooted at `id` as JSON
    ///
    /// Aliased nodes are copied at every place they occur. A node that is
    /// reachable from itself cannot be materialised and yields
    /// [`ConvertError::UnresolvedCycle`].
    pub fn to_value(&self, id: NodeId) -> Result<Value> {
        let mut on_path = HashSet::new();
        self.materialise(&Item::Node(id), &mut on_path)
    }

    fn materialise(&self, item: &Item, on_path: &mut HashSet<NodeId>) -> Result<Value> {
        match item {
            Item::Scalar(v) => Ok(v.clone()),
            Item::List(items) => items
                .iter()
                .map(|i| self.materialise(i, on_path))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Item::Node(id) => {
                if !on_path.insert(*id) {
                    return Err(ConvertError::UnresolvedCycle { node: id.0 });
                }
                let mut map = Map::new();
                for (key, child) in self.node(*id).iter() {
                    map.insert(key.clone(), self.materialise(child, on_path)?);
                }
                on_path.remove(id);
                Ok(Value::Object(map))
            }
        }
    }
}

fn collect_links(item: &Item, path: NodePath, out: &mut Vec<(NodePath, NodeId)>) {
    match item {
        Item::Node(id) => out.push((path, *id)),
        Item::List(items) => {
            for (i, child) in items.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(PathSegment::Index(i));
                collect_links(child, child_path, out);
            }
        }
        Item::Scalar(_) => {}
    }
}

fn redirect_item(item: &mut Item, targets: &HashMap<NodeId, NodeId>) {
    match item {
        Item::Node(id) => {
            if let Some(&target) = targets.get(id) {
                *id = target;
            }
        }
        Item::List(items) => {
            for child in items {
                redirect_item(child, targets);
            }
        }
        Item::Scalar(_) => {}
    }
}

fn boolean_schema_node(nodes: &mut Vec<SchemaNode>, accept: bool) -> SchemaNode {
    if accept {
        return SchemaNode::new();
    }
    nodes.push(SchemaNode::new());
    let empty = NodeId(nodes.len() - 1);
    std::iter::once(("not", Item::Node(empty))).collect()
}

/// JSON type name of a value, as used in error messages and type matching
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
