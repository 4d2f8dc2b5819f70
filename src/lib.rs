//! # Node Canvas
//!
//! An infinite, pannable and zoomable canvas of text nodes connected by
//! directed edges.
//!
//! ## Features
//! - Click empty space to create a node, drag empty space to pan
//! - Mouse-wheel zoom anchored at the cursor
//! - Single, additive (Shift) and edge selection
//! - Group dragging that pulls nearby selected nodes into the drag
//! - Ctrl/Cmd-drag between nodes to connect them
//! - Inline text editing on double-click
//! - Nodes, edges and the viewport persist across restarts
//!
//! The interaction logic ([`Editor`], [`DiagramStore`], [`DragState`],
//! [`Viewport`]) is independent of the window toolkit and is driven by
//! normalized [`InputEvent`]s; the `ui` module adapts egui input onto it.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod drag;
pub mod editor;
pub mod input;
pub mod selection;
pub mod storage;
pub mod store;
pub mod types;
pub mod viewport;
mod ui;

// Re-export public types and functions
pub use config::CanvasConfig;
pub use drag::DragState;
pub use editor::{Editor, Effect, Gesture};
pub use input::{EditorKey, InputEvent, Modifiers};
pub use selection::Selection;
pub use storage::{KeyValueStore, MemoryStore};
pub use store::DiagramStore;
pub use types::*;
pub use ui::{CanvasApp, TextEditState};
pub use viewport::{PanGesture, Viewport, ZoomDirection};

/// Runs the canvas application with default settings.
///
/// This function opens the native window and starts the main event loop. The
/// previous session's canvas is restored from eframe's storage.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use node_canvas::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Node Canvas"),
        ..Default::default()
    };
    eframe::run_native(
        "node_canvas",
        options,
        Box::new(|cc| Ok(Box::new(CanvasApp::new(cc)))),
    )
}
