//! Canvas rendering for nodes, edges, the grid and overlays.
//!
//! Everything is painted from the store's state each frame; nothing here
//! mutates the diagram.

use super::state::CanvasApp;
use crate::constants::{GRID_SIZE, NODE_CORNER_RADIUS, NODE_PADDING};
use crate::types::Node;
use crate::viewport::Viewport;
use eframe::egui;
use eframe::epaint::StrokeKind;

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(66, 133, 244);
const BORDER_COLOR: egui::Color32 = egui::Color32::from_rgb(160, 160, 160);
const EDGE_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 90, 90);
const BACKGROUND_COLOR: egui::Color32 = egui::Color32::from_rgb(248, 248, 246);

/// Shortcut reference shown in the help overlay.
const SHORTCUTS: &[(&str, &str)] = &[
    ("Click empty canvas", "Create a node"),
    ("Drag empty canvas", "Pan"),
    ("Mouse wheel", "Zoom around the cursor"),
    ("Click node or edge", "Select"),
    ("Shift + click", "Add or remove from selection"),
    ("Drag node", "Move the selection, pulling in nearby nodes"),
    ("Ctrl/Cmd + drag node", "Connect to another node"),
    ("Double-click node", "Edit text"),
    ("Delete / Backspace", "Delete the selection"),
    ("?", "Show this help"),
    ("Escape", "Close this help"),
];

/// Upper bound on grid lines per axis; anything beyond is not worth drawing.
const MAX_GRID_LINES: usize = 2000;

/// World coordinates of the grid lines covering `[start, end]` on one axis.
///
/// Lines are indexed by integer so the walk terminates even where adding
/// [`GRID_SIZE`] no longer changes an `f32` coordinate.
fn grid_lines(start: f32, end: f32) -> impl Iterator<Item = f32> {
    let first = (start / GRID_SIZE).floor();
    let last = (end / GRID_SIZE).ceil();
    let span = last - first;
    let count = if (0.0..=MAX_GRID_LINES as f32).contains(&span) {
        span as usize + 1
    } else {
        0
    };
    (0..count).map(move |i| (first + i as f32) * GRID_SIZE)
}

/// Maps a world position to an absolute screen position inside the canvas.
fn world_to_canvas(viewport: &Viewport, origin: egui::Vec2, world: egui::Pos2) -> egui::Pos2 {
    viewport.to_screen(world) + origin
}

impl CanvasApp {
    /// Renders all canvas layers: background, edges, edge preview, nodes, hint.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `canvas_rect` - The screen-space rectangle of the canvas area
    pub fn render_canvas(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        painter.rect_filled(canvas_rect, 0.0, BACKGROUND_COLOR);
        if self.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        let store = self.editor.store();
        let selected_edge = store.selection().edge();
        for (edge, from, to) in store.diagram().resolved_edges() {
            let is_selected = selected_edge == Some(&edge.id);
            self.draw_edge(painter, canvas_rect, from, to, is_selected);
        }

        if let Some((from, cursor)) = self.editor.connection_preview() {
            if let Some(node) = store.diagram().node(from) {
                self.draw_connection_preview(painter, canvas_rect, node, cursor);
            }
        }

        for node in store.nodes() {
            self.draw_node(painter, canvas_rect, node);
        }

        if store.nodes().is_empty() {
            let center = canvas_rect.center();
            painter.text(
                center,
                egui::Align2::CENTER_BOTTOM,
                "Click anywhere to create a node",
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(140),
            );
            painter.text(
                center + egui::vec2(0.0, 6.0),
                egui::Align2::CENTER_TOP,
                "Press ? for help",
                egui::FontId::proportional(13.0),
                egui::Color32::from_gray(170),
            );
        }
    }

    /// Draws a zoom-aware grid behind the diagram.
    ///
    /// Lines are placed every [`GRID_SIZE`] world units and skipped entirely
    /// when zoomed out so far that they would merge.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let viewport = self.editor.store().viewport();
        let screen_grid_size = GRID_SIZE * viewport.scale;
        if screen_grid_size < 4.0 {
            return;
        }

        let origin = canvas_rect.min.to_vec2();
        let stroke = egui::Stroke::new(
            1.0,
            egui::Color32::from_rgba_unmultiplied(128, 128, 128, 28),
        );

        let top_left = viewport.to_world(canvas_rect.min - origin);
        let bottom_right = viewport.to_world(canvas_rect.max - origin);

        for x in grid_lines(top_left.x, bottom_right.x) {
            let screen_x = world_to_canvas(viewport, origin, egui::pos2(x, 0.0)).x;
            painter.line_segment(
                [
                    egui::pos2(screen_x, canvas_rect.min.y),
                    egui::pos2(screen_x, canvas_rect.max.y),
                ],
                stroke,
            );
        }

        for y in grid_lines(top_left.y, bottom_right.y) {
            let screen_y = world_to_canvas(viewport, origin, egui::pos2(0.0, y)).y;
            painter.line_segment(
                [
                    egui::pos2(canvas_rect.min.x, screen_y),
                    egui::pos2(canvas_rect.max.x, screen_y),
                ],
                stroke,
            );
        }
    }

    /// Draws an edge as a straight line between node centers with a
    /// direction arrow at its midpoint.
    pub fn draw_edge(
        &self,
        painter: &egui::Painter,
        canvas_rect: egui::Rect,
        from: &Node,
        to: &Node,
        is_selected: bool,
    ) {
        let viewport = self.editor.store().viewport();
        let origin = canvas_rect.min.to_vec2();
        let start = world_to_canvas(viewport, origin, from.rect().center());
        let end = world_to_canvas(viewport, origin, to.rect().center());

        let (color, width) = if is_selected {
            (SELECTION_COLOR, 3.0)
        } else {
            (EDGE_COLOR, 1.5)
        };
        painter.line_segment([start, end], egui::Stroke::new(width, color));
        self.draw_arrow_at_center(painter, start, end, color);
    }

    fn draw_arrow_at_center(
        &self,
        painter: &egui::Painter,
        start: egui::Pos2,
        end: egui::Pos2,
        color: egui::Color32,
    ) {
        if start == end {
            return;
        }
        let scale = self.editor.store().viewport().scale;
        let center = start + (end - start) * 0.5;
        let direction = (end - start).normalized();
        let perpendicular = egui::vec2(-direction.y, direction.x);

        let arrow_size = 7.0 * scale;
        let arrow_width = 5.0 * scale;

        let tip = center + direction * arrow_size;
        let left = center - direction * arrow_size + perpendicular * arrow_width;
        let right = center - direction * arrow_size - perpendicular * arrow_width;

        painter.add(egui::Shape::convex_polygon(
            vec![tip, left, right],
            color,
            egui::Stroke::NONE,
        ));
    }

    /// Draws the rubber-band line of an edge being created.
    ///
    /// `cursor` is in canvas-local screen space.
    pub fn draw_connection_preview(
        &self,
        painter: &egui::Painter,
        canvas_rect: egui::Rect,
        from: &Node,
        cursor: egui::Pos2,
    ) {
        let viewport = self.editor.store().viewport();
        let origin = canvas_rect.min.to_vec2();
        let start = world_to_canvas(viewport, origin, from.rect().center());
        let end = cursor + origin;

        let stroke = egui::Stroke::new(2.0, SELECTION_COLOR);
        painter.line_segment([start, end], stroke);
        painter.circle_filled(end, 4.0, SELECTION_COLOR);
    }

    /// Draws a node box with its text.
    ///
    /// Selected nodes get a thicker blue border; nodes carried by the active
    /// drag are slightly darkened.
    pub fn draw_node(&self, painter: &egui::Painter, canvas_rect: egui::Rect, node: &Node) {
        let store = self.editor.store();
        let viewport = store.viewport();
        let origin = canvas_rect.min.to_vec2();
        let world_rect = node.rect();
        let rect = egui::Rect::from_min_max(
            world_to_canvas(viewport, origin, world_rect.min),
            world_to_canvas(viewport, origin, world_rect.max),
        );
        if !rect.intersects(canvas_rect) {
            return;
        }

        let mut fill = egui::Color32::WHITE;
        if self.editor.is_dragging(&node.id) {
            fill = egui::Color32::from_gray(235);
        }
        let rounding = NODE_CORNER_RADIUS * viewport.scale;
        painter.rect_filled(rect, rounding, fill);

        let (stroke_color, stroke_width) = if store.selection().contains_node(&node.id) {
            (SELECTION_COLOR, 2.0)
        } else {
            (BORDER_COLOR, 1.0)
        };
        painter.rect_stroke(
            rect,
            rounding,
            egui::Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        let editing = self
            .text_edit
            .as_ref()
            .is_some_and(|edit| edit.node_id == node.id);
        if !editing {
            self.draw_node_text(painter, node, rect);
        }
    }

    /// Renders the node's text, centered and clipped to the padded box.
    fn draw_node_text(&self, painter: &egui::Painter, node: &Node, rect: egui::Rect) {
        let scale = self.editor.store().viewport().scale;
        let font_size = 14.0 * scale;
        if font_size < 4.0 {
            return;
        }

        let inner = rect.shrink(NODE_PADDING * scale);
        painter.with_clip_rect(inner.intersect(painter.clip_rect())).text(
            inner.center(),
            egui::Align2::CENTER_CENTER,
            &node.text,
            egui::FontId::proportional(font_size),
            egui::Color32::from_gray(30),
        );
    }

    /// Shows the keyboard shortcut overlay when open.
    ///
    /// Escape or a click on the backdrop closes it.
    pub fn draw_help_overlay(&mut self, ctx: &egui::Context) {
        if !self.show_help {
            return;
        }

        let modal = egui::Modal::new(egui::Id::new("help_overlay")).show(ctx, |ui| {
            ui.set_width(380.0);
            ui.heading("Keyboard & mouse");
            ui.add_space(6.0);
            egui::Grid::new("help_shortcuts")
                .num_columns(2)
                .spacing([16.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    for (input, action) in SHORTCUTS {
                        ui.strong(*input);
                        ui.label(*action);
                        ui.end_row();
                    }
                });
            ui.add_space(8.0);
            ui.button("Close").clicked()
        });

        if modal.inner || modal.should_close() {
            self.show_help = false;
        }
    }
}
