//! Canvas interaction.
//!
//! Translates egui pointer, wheel and keyboard input into [`InputEvent`]s for
//! the editor. Editor positions are relative to the canvas' top-left corner,
//! so the default viewport maps canvas pixels one-to-one onto world units.

use super::state::CanvasApp;
use crate::editor::{Effect, Gesture};
use crate::input::{EditorKey, InputEvent, Modifiers};
use eframe::egui;

/// Vertical delta of every mouse-wheel event this frame, one entry per event.
///
/// Each wheel event is one zoom step, so events are not summed.
fn wheel_steps(events: &[egui::Event]) -> Vec<f32> {
    events
        .iter()
        .filter_map(|event| match event {
            egui::Event::MouseWheel { delta, .. } if delta.y != 0.0 => Some(delta.y),
            _ => None,
        })
        .collect()
}

impl CanvasApp {
    /// Renders the canvas and feeds this frame's input into the editor.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        for event in self.collect_pointer_events(ui, &response) {
            if let Effect::EditText(node_id) = self.editor.handle(event) {
                self.start_editing_node_text(node_id);
            }
        }

        self.render_canvas(&painter, response.rect);
        self.draw_text_editor(ui, response.rect);
    }

    /// Reads pointer state for this frame and turns it into editor events.
    fn collect_pointer_events(
        &self,
        ui: &egui::Ui,
        response: &egui::Response,
    ) -> Vec<InputEvent> {
        let origin = response.rect.min.to_vec2();
        let (pressed, released, primary_down, latest_pos, modifiers, wheel) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.latest_pos(),
                i.modifiers,
                wheel_steps(&i.events),
            )
        });
        let local = latest_pos.map(|p| p - origin);
        let gesture_active = *self.editor.gesture() != Gesture::Idle;
        let mut events = Vec::new();

        if let Some(pos) = local {
            if gesture_active {
                events.push(InputEvent::PointerMove { pos });
            }
            if released && gesture_active {
                events.push(InputEvent::PointerUp { pos });
            }
            if pressed && response.hovered() {
                events.push(InputEvent::PointerDown {
                    pos,
                    modifiers: Modifiers::from(modifiers),
                });
            }
            if response.double_clicked() {
                events.push(InputEvent::DoubleClick { pos });
            }
            if response.hovered() {
                events.extend(wheel.into_iter().map(|delta_y| InputEvent::Wheel {
                    delta_y,
                    anchor: Some(pos),
                }));
            }
        }

        // The button came up somewhere we never saw (e.g. outside the window).
        if gesture_active && !primary_down && !released {
            events.push(InputEvent::PointerCancel);
        }
        events
    }

    /// Handles keyboard shortcuts that are not consumed by a focused text field.
    ///
    /// `?` opens the help overlay, Escape closes it, Delete/Backspace remove
    /// the selection.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for checking input
    pub fn handle_shortcut_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let (help, escape, delete, backspace) = ctx.input(|i| {
            (
                i.events
                    .iter()
                    .any(|e| matches!(e, egui::Event::Text(t) if t == "?")),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Delete),
                i.key_pressed(egui::Key::Backspace),
            )
        });

        if help {
            self.show_help = true;
        }
        if escape {
            self.show_help = false;
        }
        if self.show_help {
            return;
        }
        if delete {
            self.editor.handle(InputEvent::Key(EditorKey::Delete));
        } else if backspace {
            self.editor.handle(InputEvent::Key(EditorKey::Backspace));
        }
    }

    /// Shows the inline single-line editor over the node being edited.
    ///
    /// Every keystroke writes through to the store; losing focus ends editing.
    fn draw_text_editor(&mut self, ui: &mut egui::Ui, canvas_rect: egui::Rect) {
        let Some(edit) = self.text_edit.as_mut() else {
            return;
        };
        let store = self.editor.store();
        let Some(node) = store.diagram().node(&edit.node_id) else {
            self.text_edit = None;
            return;
        };

        let viewport = store.viewport();
        let origin = canvas_rect.min.to_vec2();
        let world_rect = node.rect();
        let screen_rect = egui::Rect::from_min_max(
            viewport.to_screen(world_rect.min) + origin,
            viewport.to_screen(world_rect.max) + origin,
        );
        let font_size = (14.0 * viewport.scale).clamp(6.0, 48.0);

        let response = ui.put(
            screen_rect.shrink(2.0),
            egui::TextEdit::singleline(&mut edit.buffer)
                .font(egui::FontId::proportional(font_size))
                .frame(false),
        );
        if !edit.focus_requested {
            response.request_focus();
            edit.focus_requested = true;
        }

        if response.changed() {
            let node_id = edit.node_id.clone();
            let text = edit.buffer.clone();
            self.editor.store_mut().update_node_text(&node_id, &text);
        }
        if response.lost_focus() {
            self.stop_editing_node_text();
        }
    }
}
