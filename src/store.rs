//! The diagram store: canonical owner of nodes, edges, viewport and selection.
//!
//! Every mutation of persisted data writes through to the backing
//! [`KeyValueStore`]. Selection is kept here for convenience but never persisted.

use crate::config::CanvasConfig;
use crate::constants::DEFAULT_NODE_TEXT;
use crate::selection::Selection;
use crate::storage::{self, KeyValueStore};
use crate::types::{Diagram, Edge, EdgeId, Node, NodeId};
use crate::viewport::Viewport;
use egui::Pos2;

/// Owns the diagram state and persists it on every change.
#[derive(Debug)]
pub struct DiagramStore<S: KeyValueStore> {
    diagram: Diagram,
    viewport: Viewport,
    selection: Selection,
    config: CanvasConfig,
    storage: S,
}

impl<S: KeyValueStore> DiagramStore<S> {
    /// Loads state from `storage`, falling back to an empty diagram for anything unreadable.
    pub fn load(storage: S, config: CanvasConfig) -> Self {
        let nodes = storage::load_nodes(&storage);
        let edges = storage::load_edges(&storage);
        let viewport = storage::load_viewport(&storage, &config);
        log::info!(
            "Loaded canvas with {} nodes and {} edges",
            nodes.len(),
            edges.len()
        );
        Self {
            diagram: Diagram::from_parts(nodes, edges),
            viewport,
            selection: Selection::default(),
            config,
            storage,
        }
    }

    /// Current diagram contents.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// All nodes in draw order.
    pub fn nodes(&self) -> &[Node] {
        &self.diagram.nodes
    }

    /// All stored edges, including any with dangling endpoints.
    pub fn edges(&self) -> &[Edge] {
        &self.diagram.edges
    }

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Interaction settings the store was created with.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// The backing key-value store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The backing key-value store, mutably (used to flush it to disk).
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Selects exactly one node.
    pub fn select_node(&mut self, id: &str) {
        self.selection.select_node(id);
    }

    /// Selects exactly one edge.
    pub fn select_edge(&mut self, id: &str) {
        self.selection.select_edge(id);
    }

    /// Toggles a node within the selection when `additive`, otherwise selects it alone.
    pub fn select_toggle_additive(&mut self, id: &str, additive: bool) {
        self.selection.select_toggle_additive(id, additive);
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Creates a node at a world position and selects it exclusively.
    pub fn create_node(&mut self, world_pos: Pos2) -> NodeId {
        let id = self.diagram.add_node(Node::new(DEFAULT_NODE_TEXT, world_pos));
        log::info!("Created node {id} at ({:.1}, {:.1})", world_pos.x, world_pos.y);
        self.selection.select_node(&id);
        self.persist_nodes();
        id
    }

    /// Replaces a node's text.
    ///
    /// # Returns
    ///
    /// `false` if no such node exists.
    pub fn update_node_text(&mut self, id: &str, text: &str) -> bool {
        let Some(node) = self.diagram.node_mut(id) else {
            return false;
        };
        if node.text == text {
            return true;
        }
        node.text = text.to_string();
        self.persist_nodes();
        true
    }

    /// Moves a single node.
    pub fn move_node(&mut self, id: &str, pos: Pos2) -> bool {
        self.move_nodes(std::iter::once((id.to_string(), pos))) > 0
    }

    /// Moves several nodes at once, persisting a single time.
    ///
    /// # Returns
    ///
    /// The number of nodes that were found and moved.
    pub fn move_nodes(&mut self, moves: impl IntoIterator<Item = (NodeId, Pos2)>) -> usize {
        let mut moved = 0;
        for (id, pos) in moves {
            if let Some(node) = self.diagram.node_mut(&id) {
                node.set_position(pos);
                moved += 1;
            }
        }
        if moved > 0 {
            self.persist_nodes();
        }
        moved
    }

    /// Connects two nodes with a new edge.
    pub fn create_edge(&mut self, from: &str, to: &str) -> Result<EdgeId, String> {
        let id = self.diagram.add_edge(from, to)?;
        log::info!("Created edge {id} from {from} to {to}");
        self.persist_edges();
        Ok(id)
    }

    /// Deletes whatever is selected, then clears the selection.
    ///
    /// A selected edge is removed on its own; selected nodes take every edge
    /// touching them along.
    pub fn delete_selected(&mut self) {
        match std::mem::take(&mut self.selection) {
            Selection::Edge(edge_id) => {
                if self.diagram.remove_edge(&edge_id) {
                    log::info!("Deleted edge {edge_id}");
                    self.persist_edges();
                }
            }
            Selection::Nodes(node_ids) => {
                let edges_before = self.diagram.edges.len();
                let removed = node_ids
                    .iter()
                    .filter(|id| self.diagram.remove_node(id))
                    .count();
                let edges_removed = edges_before - self.diagram.edges.len();
                log::info!("Deleted {removed} nodes and {edges_removed} edges");
                if removed > 0 {
                    self.persist_nodes();
                }
                if edges_removed > 0 {
                    self.persist_edges();
                }
            }
            Selection::Empty => {}
        }
    }

    /// Removes every node and edge, clears the selection and erases persisted state.
    ///
    /// The viewport returns to the default so memory matches what a reload would see.
    pub fn clear_all(&mut self) {
        self.diagram.clear();
        self.selection.clear();
        self.viewport = Viewport::default();
        storage::clear(&mut self.storage);
        log::info!("Cleared canvas");
    }

    /// Replaces the viewport and persists it.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized(&self.config);
        self.persist_viewport();
    }

    /// Runs `f` against the viewport and persists the result.
    pub fn update_viewport<R>(&mut self, f: impl FnOnce(&mut Viewport, &CanvasConfig) -> R) -> R {
        let result = f(&mut self.viewport, &self.config);
        self.persist_viewport();
        result
    }

    fn persist_nodes(&mut self) {
        if let Err(err) = storage::save_nodes(&mut self.storage, &self.diagram.nodes) {
            log::error!("Failed to save nodes: {err}");
        }
    }

    fn persist_edges(&mut self) {
        if let Err(err) = storage::save_edges(&mut self.storage, &self.diagram.edges) {
            log::error!("Failed to save edges: {err}");
        }
    }

    fn persist_viewport(&mut self) {
        if let Err(err) = storage::save_viewport(&mut self.storage, &self.viewport) {
            log::error!("Failed to save viewport: {err}");
        }
    }
}
