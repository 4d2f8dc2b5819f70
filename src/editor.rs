//! Gesture state machine.
//!
//! The [`Editor`] turns normalized [`InputEvent`]s into hit-tests, selection
//! changes, drags, pans, zooms and store mutations. At most one gesture is
//! active at a time; it is created on pointer-down, advanced on pointer-move
//! and dropped on pointer-up or cancel.

use crate::config::CanvasConfig;
use crate::drag::DragState;
use crate::input::{EditorKey, InputEvent, Modifiers};
use crate::storage::KeyValueStore;
use crate::store::DiagramStore;
use crate::types::NodeId;
use crate::viewport::{PanGesture, ZoomDirection};
use egui::Pos2;

/// The gesture currently in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// No button held
    #[default]
    Idle,
    /// Moving nodes
    Drag(DragState),
    /// Moving the viewport; a pan that never travels is a click
    Pan(PanGesture),
    /// Drawing an edge
    Connect {
        /// Source node
        from: NodeId,
        /// Pointer in screen space
        cursor: Pos2,
    },
}

/// Side effects the host has to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing for the host to do
    None,
    /// Open the inline text editor for this node
    EditText(NodeId),
}

/// Interaction controller owning the diagram store.
#[derive(Debug)]
pub struct Editor<S: KeyValueStore> {
    store: DiagramStore<S>,
    gesture: Gesture,
}

impl<S: KeyValueStore> Editor<S> {
    /// Wraps an already loaded store.
    pub fn new(store: DiagramStore<S>) -> Self {
        Self {
            store,
            gesture: Gesture::Idle,
        }
    }

    /// Loads the store from `storage` with default settings.
    pub fn load(storage: S) -> Self {
        Self::with_config(storage, CanvasConfig::default())
    }

    /// Loads the store from `storage` with custom settings.
    pub fn with_config(storage: S, config: CanvasConfig) -> Self {
        Self::new(DiagramStore::load(storage, config))
    }

    /// The diagram store.
    pub fn store(&self) -> &DiagramStore<S> {
        &self.store
    }

    /// The diagram store, mutably (inline text edits, clear-all).
    pub fn store_mut(&mut self) -> &mut DiagramStore<S> {
        &mut self.store
    }

    /// The gesture in progress.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether the node is being carried by the active drag.
    pub fn is_dragging(&self, id: &str) -> bool {
        matches!(&self.gesture, Gesture::Drag(drag) if drag.contains(id))
    }

    /// Source node and screen cursor of an edge being drawn.
    pub fn connection_preview(&self) -> Option<(&NodeId, Pos2)> {
        match &self.gesture {
            Gesture::Connect { from, cursor } => Some((from, *cursor)),
            _ => None,
        }
    }

    /// Dispatches a single input event.
    pub fn handle(&mut self, event: InputEvent) -> Effect {
        match event {
            InputEvent::PointerDown { pos, modifiers } => self.pointer_down(pos, modifiers),
            InputEvent::PointerMove { pos } => self.pointer_move(pos),
            InputEvent::PointerUp { pos } => self.pointer_up(pos),
            InputEvent::PointerCancel => self.pointer_cancel(),
            InputEvent::DoubleClick { pos } => {
                return match self.double_click(pos) {
                    Some(id) => Effect::EditText(id),
                    None => Effect::None,
                };
            }
            InputEvent::Wheel { delta_y, anchor } => {
                self.wheel(delta_y, anchor);
            }
            InputEvent::Key(key) => self.key(key),
        }
        Effect::None
    }

    /// Starts a gesture based on what lies under the pointer.
    pub fn pointer_down(&mut self, pos: Pos2, modifiers: Modifiers) {
        if self.gesture != Gesture::Idle {
            // A release went missing; never let two gestures overlap.
            self.pointer_cancel();
        }

        let world = self.store.viewport().to_world(pos);
        let diagram = self.store.diagram();

        if let Some(node) = diagram.find_node_at(world) {
            let id = node.id.clone();
            if modifiers.command {
                log::debug!("connect gesture from {id}");
                self.gesture = Gesture::Connect {
                    from: id,
                    cursor: pos,
                };
                return;
            }

            if modifiers.shift {
                self.store.select_toggle_additive(&id, true);
            } else if !self.store.selection().contains_node(&id) {
                self.store.select_node(&id);
            }

            let drag = DragState::begin(pos, self.store.selection().nodes(), self.store.diagram());
            log::debug!("drag gesture over {} nodes", drag.len());
            self.gesture = Gesture::Drag(drag);
        } else if let Some(edge) = diagram.find_edge_at(world) {
            let id = edge.id.clone();
            self.store.select_edge(&id);
        } else {
            log::debug!("pan gesture at ({:.1}, {:.1})", pos.x, pos.y);
            self.gesture = Gesture::Pan(PanGesture::begin(pos));
        }
    }

    /// Advances the active gesture; does nothing when idle.
    pub fn pointer_move(&mut self, pos: Pos2) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drag(drag) => {
                let moves = drag.update(
                    pos,
                    self.store.viewport(),
                    self.store.diagram(),
                    self.store.selection(),
                    self.store.config().group_distance,
                );
                self.store.move_nodes(moves);
            }
            Gesture::Pan(pan) => {
                self.store.update_viewport(|viewport, _| pan.update(pos, viewport));
            }
            Gesture::Connect { cursor, .. } => *cursor = pos,
        }
    }

    /// Finishes the active gesture.
    ///
    /// A pan that stayed within the click threshold creates a node where the
    /// pointer went down; a connect gesture released over another node adds an edge.
    pub fn pointer_up(&mut self, pos: Pos2) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Drag(drag) => {
                log::debug!("drag ended with {} nodes", drag.len());
            }
            Gesture::Pan(pan) => {
                if pan.is_click() {
                    let world = self.store.viewport().to_world(pan.origin());
                    self.store.create_node(world);
                }
            }
            Gesture::Connect { from, .. } => {
                let world = self.store.viewport().to_world(pos);
                let target = self.store.diagram().find_node_at(world).map(|n| n.id.clone());
                if let Some(to) = target {
                    if let Err(reason) = self.store.create_edge(&from, &to) {
                        log::debug!("edge {from} -> {to} rejected: {reason}");
                    }
                }
            }
        }
    }

    /// Abandons the active gesture without click or connect semantics.
    pub fn pointer_cancel(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("gesture cancelled");
        }
        self.gesture = Gesture::Idle;
    }

    /// Zooms one step around `anchor`.
    ///
    /// # Returns
    ///
    /// `true` if the scale changed.
    pub fn wheel(&mut self, delta_y: f32, anchor: Option<Pos2>) -> bool {
        let Some(direction) = ZoomDirection::from_wheel(delta_y) else {
            return false;
        };
        self.store
            .update_viewport(|viewport, config| viewport.zoom(direction, anchor, config))
    }

    /// The node under a double-click, whose text should be edited.
    pub fn double_click(&mut self, pos: Pos2) -> Option<NodeId> {
        let world = self.store.viewport().to_world(pos);
        let id = self.store.diagram().find_node_at(world)?.id.clone();
        self.store.select_node(&id);
        Some(id)
    }

    /// Handles a key press.
    pub fn key(&mut self, key: EditorKey) {
        match key {
            EditorKey::Delete | EditorKey::Backspace => self.store.delete_selected(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GROUP_DISTANCE, NODE_HEIGHT, NODE_WIDTH};
    use crate::storage::{self, MemoryStore};
    use crate::types::Node;
    use crate::viewport::Viewport;
    use egui::pos2;

    fn editor() -> Editor<MemoryStore> {
        Editor::load(MemoryStore::new())
    }

    /// An editor whose storage already holds the given nodes and viewport.
    fn editor_with(nodes: &[Node], viewport: Viewport) -> Editor<MemoryStore> {
        let mut backing = MemoryStore::new();
        storage::save_nodes(&mut backing, nodes).unwrap();
        storage::save_viewport(&mut backing, &viewport).unwrap();
        Editor::load(backing)
    }

    fn node(id: &str, x: f32, y: f32) -> Node {
        Node {
            id: id.into(),
            x,
            y,
            text: id.into(),
        }
    }

    fn position(editor: &Editor<MemoryStore>, id: &str) -> Pos2 {
        editor.store().diagram().node(id).unwrap().position()
    }

    fn selected(editor: &Editor<MemoryStore>) -> Vec<String> {
        editor.store().selection().nodes().cloned().collect()
    }

    fn click(editor: &mut Editor<MemoryStore>, pos: Pos2, modifiers: Modifiers) {
        editor.handle(InputEvent::PointerDown { pos, modifiers });
        editor.handle(InputEvent::PointerUp { pos });
    }

    fn drag(editor: &mut Editor<MemoryStore>, from: Pos2, to: Pos2, modifiers: Modifiers) {
        editor.handle(InputEvent::PointerDown {
            pos: from,
            modifiers,
        });
        editor.handle(InputEvent::PointerMove {
            pos: from + (to - from) * 0.5,
        });
        editor.handle(InputEvent::PointerMove { pos: to });
        editor.handle(InputEvent::PointerUp { pos: to });
    }

    #[test]
    fn test_click_on_empty_canvas_creates_selected_node() {
        let mut editor = editor();

        click(&mut editor, pos2(100.0, 100.0), Modifiers::NONE);

        let nodes = editor.store().nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].position(), pos2(100.0, 100.0));
        assert_eq!(selected(&editor), vec![nodes[0].id.clone()]);
        assert_eq!(*editor.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_click_creates_node_in_world_space() {
        let mut editor = editor_with(&[], Viewport::new(50.0, -20.0, 2.0));

        click(&mut editor, pos2(150.0, 80.0), Modifiers::NONE);

        assert_eq!(editor.store().nodes()[0].position(), pos2(50.0, 50.0));
    }

    #[test]
    fn test_drag_on_empty_canvas_pans_without_creating() {
        let mut editor = editor_with(&[], Viewport::new(0.0, 0.0, 2.0));

        drag(&mut editor, pos2(10.0, 10.0), pos2(110.0, 60.0), Modifiers::NONE);

        assert!(editor.store().nodes().is_empty());
        assert_eq!(*editor.store().viewport(), Viewport::new(100.0, 50.0, 2.0));
    }

    #[test]
    fn test_pointer_down_on_node_never_pans() {
        let mut editor = editor_with(&[node("a", 0.0, 0.0)], Viewport::default());

        drag(&mut editor, pos2(10.0, 10.0), pos2(60.0, 10.0), Modifiers::NONE);

        assert_eq!(*editor.store().viewport(), Viewport::default());
        assert_eq!(position(&editor, "a"), pos2(50.0, 0.0));
        assert_eq!(selected(&editor), vec!["a"]);
    }

    #[test]
    fn test_multi_drag_at_zoom() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 10.0, 10.0)],
            Viewport::new(0.0, 0.0, 2.0),
        );
        editor.store_mut().select_node("a");
        editor.store_mut().select_toggle_additive("b", true);

        // Screen (50, 50) is world (25, 25): inside both boxes, b on top.
        drag(&mut editor, pos2(50.0, 50.0), pos2(150.0, 150.0), Modifiers::NONE);

        assert_eq!(position(&editor, "a"), pos2(50.0, 50.0));
        assert_eq!(position(&editor, "b"), pos2(60.0, 60.0));
        assert_eq!(selected(&editor), vec!["a", "b"]);
    }

    #[test]
    fn test_clicking_unselected_node_replaces_selection() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 500.0, 0.0)],
            Viewport::default(),
        );
        editor.store_mut().select_node("a");

        click(&mut editor, pos2(510.0, 10.0), Modifiers::NONE);

        assert_eq!(selected(&editor), vec!["b"]);
    }

    #[test]
    fn test_shift_click_toggles_membership() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 500.0, 0.0)],
            Viewport::default(),
        );

        click(&mut editor, pos2(10.0, 10.0), Modifiers::NONE);
        click(&mut editor, pos2(510.0, 10.0), Modifiers::SHIFT);
        assert_eq!(selected(&editor), vec!["a", "b"]);

        click(&mut editor, pos2(10.0, 10.0), Modifiers::SHIFT);
        assert_eq!(selected(&editor), vec!["b"]);
    }

    #[test]
    fn test_drag_recruits_nearby_unselected_node() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 30.0, 30.0), node("far", 900.0, 0.0)],
            Viewport::default(),
        );
        assert!(30.0_f32.hypot(30.0) < GROUP_DISTANCE);

        // Press a where b does not overlap it.
        editor.handle(InputEvent::PointerDown {
            pos: pos2(5.0, 5.0),
            modifiers: Modifiers::NONE,
        });
        assert!(!editor.is_dragging("b"));
        editor.handle(InputEvent::PointerMove { pos: pos2(25.0, 5.0) });
        assert!(editor.is_dragging("b"));
        editor.handle(InputEvent::PointerMove { pos: pos2(45.0, 15.0) });
        editor.handle(InputEvent::PointerUp { pos: pos2(45.0, 15.0) });

        assert_eq!(position(&editor, "a"), pos2(40.0, 10.0));
        assert_eq!(position(&editor, "b"), pos2(70.0, 40.0));
        assert_eq!(position(&editor, "far"), pos2(900.0, 0.0));
        // Recruits move along but are not selected.
        assert_eq!(selected(&editor), vec!["a"]);
    }

    #[test]
    fn test_command_drag_connects_nodes() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 400.0, 0.0)],
            Viewport::default(),
        );

        editor.handle(InputEvent::PointerDown {
            pos: pos2(10.0, 10.0),
            modifiers: Modifiers::COMMAND,
        });
        editor.handle(InputEvent::PointerMove { pos: pos2(200.0, 10.0) });
        let (from, cursor) = editor.connection_preview().unwrap();
        assert_eq!(from, "a");
        assert_eq!(cursor, pos2(200.0, 10.0));
        editor.handle(InputEvent::PointerUp { pos: pos2(410.0, 10.0) });

        let edges = editor.store().edges();
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].from.as_str(), edges[0].to.as_str()), ("a", "b"));
        // Nodes did not move.
        assert_eq!(position(&editor, "a"), pos2(0.0, 0.0));
    }

    #[test]
    fn test_connect_released_on_empty_canvas_or_self_adds_nothing() {
        let mut editor = editor_with(&[node("a", 0.0, 0.0)], Viewport::default());

        drag(&mut editor, pos2(10.0, 10.0), pos2(300.0, 300.0), Modifiers::COMMAND);
        drag(&mut editor, pos2(10.0, 10.0), pos2(20.0, 20.0), Modifiers::COMMAND);

        assert!(editor.store().edges().is_empty());
        assert_eq!(editor.store().nodes().len(), 1);
    }

    #[test]
    fn test_clicking_edge_selects_it_exclusively() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 400.0, 0.0)],
            Viewport::default(),
        );
        let edge = editor.store_mut().create_edge("a", "b").unwrap();
        editor.store_mut().select_node("a");

        let on_edge = pos2(260.0, NODE_HEIGHT / 2.0);
        click(&mut editor, on_edge, Modifiers::NONE);

        assert_eq!(editor.store().selection().edge(), Some(&edge));
        assert!(selected(&editor).is_empty());
        // Not treated as a canvas click.
        assert_eq!(editor.store().nodes().len(), 2);
    }

    #[test]
    fn test_delete_key_cascades_to_edges() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 400.0, 0.0), node("c", 800.0, 0.0)],
            Viewport::default(),
        );
        editor.store_mut().create_edge("a", "b").unwrap();
        editor.store_mut().create_edge("b", "c").unwrap();

        click(&mut editor, pos2(410.0, 10.0), Modifiers::NONE);
        editor.handle(InputEvent::Key(EditorKey::Backspace));

        assert!(editor.store().diagram().node("b").is_none());
        assert!(editor.store().edges().is_empty());
        assert!(editor.store().selection().is_empty());
    }

    #[test]
    fn test_delete_key_removes_selected_edge_only() {
        let mut editor = editor_with(
            &[node("a", 0.0, 0.0), node("b", 400.0, 0.0)],
            Viewport::default(),
        );
        let edge = editor.store_mut().create_edge("a", "b").unwrap();
        editor.store_mut().select_edge(&edge);

        editor.handle(InputEvent::Key(EditorKey::Delete));

        assert!(editor.store().edges().is_empty());
        assert_eq!(editor.store().nodes().len(), 2);
    }

    #[test]
    fn test_wheel_zoom_steps() {
        let mut editor = editor();

        assert!(editor.wheel(1.0, None));
        assert!((editor.store().viewport().scale - 1.1).abs() < 1e-5);

        assert!(editor.wheel(-1.0, None));
        assert!((editor.store().viewport().scale - 0.99).abs() < 1e-5);

        assert!(!editor.wheel(0.0, None));
    }

    #[test]
    fn test_wheel_zoom_is_anchored_and_persisted() {
        let mut editor = editor();
        let anchor = pos2(200.0, 100.0);

        editor.handle(InputEvent::Wheel {
            delta_y: 120.0,
            anchor: Some(anchor),
        });

        let viewport = *editor.store().viewport();
        let world = viewport.to_world(anchor);
        assert!((world.x - 200.0).abs() < 1e-3 && (world.y - 100.0).abs() < 1e-3);

        let reloaded = storage::load_viewport(editor.store().storage(), &CanvasConfig::default());
        assert_eq!(reloaded, viewport);
    }

    #[test]
    fn test_double_click_requests_text_edit() {
        let mut editor = editor_with(&[node("a", 0.0, 0.0)], Viewport::default());

        let inside = pos2(NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0);
        assert_eq!(
            editor.handle(InputEvent::DoubleClick { pos: inside }),
            Effect::EditText("a".into())
        );
        assert_eq!(
            editor.handle(InputEvent::DoubleClick {
                pos: pos2(500.0, 500.0)
            }),
            Effect::None
        );
    }

    #[test]
    fn test_moves_without_gesture_are_ignored() {
        let mut editor = editor_with(&[node("a", 0.0, 0.0)], Viewport::default());

        editor.handle(InputEvent::PointerMove { pos: pos2(300.0, 300.0) });
        editor.handle(InputEvent::PointerUp { pos: pos2(300.0, 300.0) });

        assert_eq!(position(&editor, "a"), pos2(0.0, 0.0));
        assert_eq!(*editor.store().viewport(), Viewport::default());
        assert_eq!(editor.store().nodes().len(), 1);
    }

    #[test]
    fn test_cancelled_click_creates_nothing() {
        let mut editor = editor();

        editor.handle(InputEvent::PointerDown {
            pos: pos2(100.0, 100.0),
            modifiers: Modifiers::NONE,
        });
        editor.handle(InputEvent::PointerCancel);
        editor.handle(InputEvent::PointerUp { pos: pos2(100.0, 100.0) });

        assert!(editor.store().nodes().is_empty());
        assert_eq!(*editor.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_dragged_positions_survive_reload() {
        let mut editor = editor_with(&[node("a", 0.0, 0.0)], Viewport::default());

        drag(&mut editor, pos2(5.0, 5.0), pos2(45.0, 25.0), Modifiers::NONE);

        let reloaded = Editor::load(editor.store().storage().clone());
        assert_eq!(
            reloaded.store().diagram().node("a").unwrap().position(),
            pos2(40.0, 20.0)
        );
        assert!(reloaded.store().selection().is_empty());
    }
}
