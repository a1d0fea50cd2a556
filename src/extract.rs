//! Cyclic component extraction
//!
//! Cuts every back-edge found by the cycle detector. Each distinct repeated
//! node becomes a named component (the node itself, not a copy) and every
//! place it recurs is overwritten with a `$ref` to that component. Afterwards
//! the graph reachable from the root is acyclic and can be materialised.

use std::collections::HashMap;

use crate::cycles::CycleReport;
use crate::document::{format_path, Item, NodeId, SchemaDocument, SchemaNode, Slot};
use crate::error::{ConvertError, Result};
use crate::registry::{component_ref, ComponentRegistry};

/// Default name prefix of extracted cyclic components
pub const DEFAULT_CYCLIC_PREFIX: &str = "cyclic_";

/// Hoists cyclic subtrees into components
#[derive(Debug, Clone)]
pub struct ComponentExtractor {
    prefix: String,
}

impl Default for ComponentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLIC_PREFIX)
    }
}

impl ComponentExtractor {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Close every cycle of the report, in report order
    ///
    /// All duplicate paths are resolved against the graph before the first
    /// cut, so aliased paths through an already cut location still resolve.
    /// Returns the `(name, node)` pairs registered, in allocation order.
    pub fn extract(
        &self,
        doc: &mut SchemaDocument,
        report: &CycleReport,
        registry: &mut ComponentRegistry,
    ) -> Result<Vec<(String, NodeId)>> {
        let slots = report
            .iter()
            .map(|entry| {
                doc.resolve_slot(&entry.duplicate)
                    .ok_or_else(|| ConvertError::CyclePathNotFound {
                        path: format_path(&entry.duplicate),
                    })
            })
            .collect::<Result<Vec<Slot>>>()?;

        let mut names: HashMap<NodeId, String> = HashMap::new();
        let mut extracted = Vec::new();

        for (entry, slot) in report.iter().zip(&slots) {
            let name = match names.get(&entry.instance) {
                Some(name) => name.clone(),
                None => {
                    let name = registry.allocate(&self.prefix);
                    registry.register_node(name.clone(), entry.instance);
                    tracing::debug!(
                        component = %name,
                        source = %format_path(&entry.source),
                        "extracted cyclic schema"
                    );
                    names.insert(entry.instance, name.clone());
                    extracted.push((name.clone(), entry.instance));
                    name
                }
            };

            let reference = doc.add_node(
                [("$ref", Item::string(component_ref(&name)))]
                    .into_iter()
                    .collect::<SchemaNode>(),
            );
            if !doc.replace(slot, Item::Node(reference)) {
                return Err(ConvertError::CyclePathNotFound {
                    path: format_path(&entry.duplicate),
                });
            }
        }

        Ok(extracted)
    }
}
