//! User interface for the node canvas.
//!
//! # Module Organization
//!
//! - `state` - The main CanvasApp and inline text editing state
//! - `canvas` - Input translation and the inline text editor
//! - `rendering` - Drawing nodes, edges, grid and the help overlay

mod canvas;
mod rendering;
mod state;


pub use state::{CanvasApp, TextEditState};

use crate::constants::AUTO_SAVE_INTERVAL_SECS;
use eframe::egui;

impl eframe::App for CanvasApp {
    /// Writes pending canvas changes into eframe's persistent storage.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let written = self.editor.store_mut().storage_mut().flush_to(storage);
        if written > 0 {
            log::debug!("persisted {written} canvas entries");
        }
    }

    fn auto_save_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(AUTO_SAVE_INTERVAL_SECS)
    }

    /// Main update function called by egui for each frame.
    ///
    /// Lays out the toolbar and the canvas, then the help overlay on top.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::light());

        self.handle_shortcut_keys(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });

        self.draw_help_overlay(ctx);
    }
}

impl CanvasApp {
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.show_grid, "Grid");

            ui.separator();
            let store = self.editor.store();
            ui.label(format!(
                "{} nodes, {} edges",
                store.nodes().len(),
                store.edges().len()
            ));
            ui.label(format!("Zoom: {:.0}%", store.viewport().scale * 100.0));
            let has_content = !store.nodes().is_empty() || !store.edges().is_empty();

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(has_content, egui::Button::new("Clear canvas"))
                    .clicked()
                {
                    self.clear_canvas();
                }
                if ui.button("?").on_hover_text("Keyboard shortcuts").clicked() {
                    self.show_help = true;
                }
            });
        });
    }
}
