//! Core data types for the canvas.
//!
//! This module defines the persisted records (nodes and edges) and the [`Diagram`]
//! container that owns them, including the geometric queries used for hit-testing.

use crate::constants::{EDGE_HIT_DISTANCE, NODE_HEIGHT, NODE_WIDTH};
use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for canvas nodes.
pub type NodeId = String;

/// Unique identifier for edges between nodes.
pub type EdgeId = String;

/// Generates a fresh random identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A single text box on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,
    /// World-space x coordinate of the top-left corner
    pub x: f32,
    /// World-space y coordinate of the top-left corner
    pub y: f32,
    /// User-editable label
    pub text: String,
}

impl Node {
    /// Creates a node with a generated id at the given world position.
    pub fn new(text: impl Into<String>, position: Pos2) -> Self {
        Self {
            id: new_id(),
            x: position.x,
            y: position.y,
            text: text.into(),
        }
    }

    /// World position of the node's anchor (top-left corner).
    pub fn position(&self) -> Pos2 {
        egui::pos2(self.x, self.y)
    }

    /// Moves the node's anchor to `position`.
    pub fn set_position(&mut self, position: Pos2) {
        self.x = position.x;
        self.y = position.y;
    }

    /// The node's box in world space; this is also its hit area.
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position(), egui::vec2(NODE_WIDTH, NODE_HEIGHT))
    }
}

/// A directed link between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// ID of the source node
    pub from: NodeId,
    /// ID of the destination node
    pub to: NodeId,
}

impl Edge {
    /// Creates a new edge with a generated id.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            id: new_id(),
            from,
            to,
        }
    }

    /// Whether either endpoint is `node_id`.
    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Ordered collections of nodes and edges.
///
/// Order is significant: later nodes are drawn on top and win hit-tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagram {
    /// All nodes, in draw order
    pub nodes: Vec<Node>,
    /// All edges, in draw order
    pub edges: Vec<Edge>,
}

impl Diagram {
    /// Creates an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a diagram from already-loaded records.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Looks up a node by id for mutation.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Whether a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Appends a node and returns its ID.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    /// Adds an edge between two existing, distinct nodes.
    ///
    /// # Returns
    ///
    /// The new edge's ID, or a short reason why the edge was rejected.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<EdgeId, String> {
        if !self.contains_node(from) {
            return Err("Source node does not exist".to_string());
        }
        if !self.contains_node(to) {
            return Err("Destination node does not exist".to_string());
        }
        if from == to {
            return Err("Cannot connect a node to itself".to_string());
        }
        if self.edges.iter().any(|e| e.from == from && e.to == to) {
            return Err("Edge already exists".to_string());
        }

        let edge = Edge::new(from.to_string(), to.to_string());
        let id = edge.id.clone();
        self.edges.push(edge);
        Ok(id)
    }

    /// Removes a node and every edge that references it.
    ///
    /// # Returns
    ///
    /// `true` if the node was found and removed.
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != node_id);
        let removed = self.nodes.len() != before;
        if removed {
            self.edges.retain(|e| !e.touches(node_id));
        }
        removed
    }

    /// Removes a single edge, leaving its endpoints alone.
    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != edge_id);
        self.edges.len() != before
    }

    /// Empties the diagram.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Finds the topmost node whose box contains the world position.
    pub fn find_node_at(&self, pos: Pos2) -> Option<&Node> {
        self.nodes.iter().rev().find(|n| n.rect().contains(pos))
    }

    /// Edges whose endpoints both exist, paired with those endpoints.
    ///
    /// Edges with a dangling endpoint are skipped rather than repaired.
    pub fn resolved_edges(&self) -> impl Iterator<Item = (&Edge, &Node, &Node)> + '_ {
        self.edges.iter().filter_map(move |edge| {
            let from = self.node(&edge.from)?;
            let to = self.node(&edge.to)?;
            Some((edge, from, to))
        })
    }

    /// Finds the topmost edge passing within [`EDGE_HIT_DISTANCE`] of the world position.
    ///
    /// Edges are measured between node centers.
    pub fn find_edge_at(&self, pos: Pos2) -> Option<&Edge> {
        let hits: Vec<&Edge> = self
            .resolved_edges()
            .filter(|(_, from, to)| {
                point_to_segment_distance(pos, from.rect().center(), to.rect().center())
                    < EDGE_HIT_DISTANCE
            })
            .map(|(edge, _, _)| edge)
            .collect();
        hits.last().copied()
    }
}

/// Distance from a point to a line segment, using a clamped projection.
pub fn point_to_segment_distance(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let line_vec = end - start;
    let point_vec = point - start;
    let line_len_sq = line_vec.length_sq();

    if line_len_sq < 0.0001 {
        return point_vec.length();
    }

    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = start + line_vec * t;
    (point - projection).length()
}
