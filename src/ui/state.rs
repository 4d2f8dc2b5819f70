//! Application state management structures.
//!
//! Holds the editor plus the purely presentational state the canvas needs:
//! inline text editing and the shortcut help overlay.

use crate::editor::Editor;
use crate::storage::MemoryStore;
use crate::types::NodeId;

/// Inline text editing of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEditState {
    /// Node whose text is being edited
    pub node_id: NodeId,
    /// Working copy of the text, written through on every change
    pub buffer: String,
    /// Whether keyboard focus was already requested for this edit session
    pub focus_requested: bool,
}

impl TextEditState {
    /// Starts editing with the node's current text.
    pub fn new(node_id: NodeId, text: &str) -> Self {
        Self {
            node_id,
            buffer: text.to_string(),
            focus_requested: false,
        }
    }
}

/// The main application structure.
///
/// This struct implements the `eframe::App` trait and wires host input into the
/// [`Editor`], then renders the store's state.
pub struct CanvasApp {
    /// Interaction state machine and diagram store
    pub editor: Editor<MemoryStore>,
    /// Node currently being edited inline, if any
    pub text_edit: Option<TextEditState>,
    /// Whether the keyboard shortcut overlay is open
    pub show_help: bool,
    /// Whether the background grid is drawn
    pub show_grid: bool,
}

impl Default for CanvasApp {
    fn default() -> Self {
        Self::with_storage(MemoryStore::new())
    }
}

impl CanvasApp {
    /// Creates the app on top of an already populated store.
    pub fn with_storage(storage: MemoryStore) -> Self {
        Self {
            editor: Editor::load(storage),
            text_edit: None,
            show_help: false,
            show_grid: true,
        }
    }

    /// Creates the app, restoring the canvas from eframe's persisted storage.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let storage = cc
            .storage
            .map(MemoryStore::from_eframe)
            .unwrap_or_default();
        Self::with_storage(storage)
    }

    /// Opens the inline editor for a node.
    pub fn start_editing_node_text(&mut self, node_id: NodeId) {
        let Some(node) = self.editor.store().diagram().node(&node_id) else {
            return;
        };
        self.text_edit = Some(TextEditState::new(node_id, &node.text));
    }

    /// Closes the inline editor, if open.
    pub fn stop_editing_node_text(&mut self) {
        self.text_edit = None;
    }

    /// Removes everything from the canvas and its persisted state.
    pub fn clear_canvas(&mut self) {
        self.text_edit = None;
        self.editor.pointer_cancel();
        self.editor.store_mut().clear_all();
    }
}
