//! Selection model.
//!
//! A selection is either empty, a set of nodes, or exactly one edge. The enum
//! makes node and edge selection mutually exclusive by construction. Selection
//! is session state and is never persisted.

use crate::types::{EdgeId, NodeId};
use std::collections::BTreeSet;

/// What the user currently has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing selected
    #[default]
    Empty,
    /// One or more nodes (never empty)
    Nodes(BTreeSet<NodeId>),
    /// A single edge
    Edge(EdgeId),
}

impl Selection {
    /// Selects exactly one node, dropping any other selection.
    pub fn select_node(&mut self, id: &str) {
        *self = Selection::Nodes(BTreeSet::from([id.to_string()]));
    }

    /// Selects exactly one edge, dropping any other selection.
    pub fn select_edge(&mut self, id: &str) {
        *self = Selection::Edge(id.to_string());
    }

    /// Toggles a node in or out of the node set when `additive` is set;
    /// otherwise behaves like [`Selection::select_node`].
    pub fn select_toggle_additive(&mut self, id: &str, additive: bool) {
        if !additive {
            self.select_node(id);
            return;
        }

        let mut nodes = match std::mem::take(self) {
            Selection::Nodes(nodes) => nodes,
            Selection::Empty | Selection::Edge(_) => BTreeSet::new(),
        };
        if !nodes.remove(id) {
            nodes.insert(id.to_string());
        }
        if !nodes.is_empty() {
            *self = Selection::Nodes(nodes);
        }
    }

    /// Empties the selection.
    pub fn clear(&mut self) {
        *self = Selection::Empty;
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    /// Whether the given node is part of the selection.
    pub fn contains_node(&self, id: &str) -> bool {
        match self {
            Selection::Nodes(nodes) => nodes.contains(id),
            _ => false,
        }
    }

    /// The selected node ids, in a stable order; empty unless nodes are selected.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> + '_ {
        let nodes = match self {
            Selection::Nodes(nodes) => Some(nodes.iter()),
            _ => None,
        };
        nodes.into_iter().flatten()
    }

    /// The selected edge, if an edge is selected.
    pub fn edge(&self) -> Option<&EdgeId> {
        match self {
            Selection::Edge(id) => Some(id),
            _ => None,
        }
    }

    /// Drops ids the predicate rejects, e.g. after the underlying records vanished.
    pub fn retain_existing(
        &mut self,
        node_exists: impl Fn(&str) -> bool,
        edge_exists: impl Fn(&str) -> bool,
    ) {
        match self {
            Selection::Nodes(nodes) => {
                nodes.retain(|id| node_exists(id));
                if nodes.is_empty() {
                    self.clear();
                }
            }
            Selection::Edge(id) => {
                if !edge_exists(id) {
                    self.clear();
                }
            }
            Selection::Empty => {}
        }
    }
}
