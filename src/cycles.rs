//! Cycle detection
//!
//! Identity-based depth-first search over a [`SchemaDocument`]. Every edge that
//! leads back to a node currently on the DFS stack is a back-edge and gets a
//! [`CycleReportEntry`]. A node is explored once: reaching a finished node
//! again along another path (shared subtrees) is neither re-explored nor
//! reported, since its back-edges sit in slots every path shares.

use std::collections::HashSet;

use crate::document::{format_path, NodeId, NodePath, SchemaDocument};

/// One back-edge of the schema graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReportEntry {
    /// The node reachable from itself
    pub instance: NodeId,
    /// Path at which the instance was entered on the current DFS branch
    pub source: NodePath,
    /// Path at which the instance recurs
    pub duplicate: NodePath,
}

impl std::fmt::Display for CycleReportEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} first seen at {}, recurs at {}",
            self.instance,
            format_path(&self.source),
            format_path(&self.duplicate)
        )
    }
}

/// All back-edges of one document, in DFS discovery order
pub type CycleReport = Vec<CycleReportEntry>;

struct Frame {
    node: NodeId,
    path: NodePath,
    children: Vec<(NodePath, NodeId)>,
    next: usize,
}

impl Frame {
    fn enter(doc: &SchemaDocument, node: NodeId, path: NodePath) -> Self {
        Self {
            node,
            children: doc.children(node),
            path,
            next: 0,
        }
    }
}

/// Report every back-edge reachable from the document root
pub fn detect_cycles(doc: &SchemaDocument) -> CycleReport {
    let mut report = CycleReport::new();
    let mut on_stack: HashSet<NodeId> = HashSet::new();
    let mut finished: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    on_stack.insert(doc.root());
    stack.push(Frame::enter(doc, doc.root(), NodePath::new()));

    while let Some(frame) = stack.last_mut() {
        let Some((relative, child)) = frame.children.get(frame.next).cloned() else {
            on_stack.remove(&frame.node);
            finished.insert(frame.node);
            stack.pop();
            continue;
        };
        frame.next += 1;

        let mut path = frame.path.clone();
        path.extend(relative);

        if on_stack.contains(&child) {
            let source = stack
                .iter()
                .find(|f| f.node == child)
                .map(|f| f.path.clone())
                .unwrap_or_default();
            tracing::trace!(node = %child, at = %format_path(&path), "back-edge");
            report.push(CycleReportEntry {
                instance: child,
                source,
                duplicate: path,
            });
        } else if !finished.contains(&child) {
            on_stack.insert(child);
            stack.push(Frame::enter(doc, child, path));
        }
    }

    report
}

/// Whether any node of the document is reachable from itself
pub fn is_cyclic(doc: &SchemaDocument) -> bool {
    !detect_cycles(doc).is_empty()
}
