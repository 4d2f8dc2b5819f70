//! Shared application-wide constants.
//! Centralizes tweakable values used across geometry, interaction and rendering.

// Viewport
/// Smallest allowed viewport scale.
pub const MIN_SCALE: f32 = 0.1;
/// Largest allowed viewport scale.
pub const MAX_SCALE: f32 = 4.0;
/// Scale multiplier applied for one zoom-in step.
pub const ZOOM_IN_FACTOR: f32 = 1.1;
/// Scale multiplier applied for one zoom-out step.
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

// Dragging
/// World-space radius within which an unselected node is swept into an active drag.
pub const GROUP_DISTANCE: f32 = 60.0;

// Node dimensions
/// Node box width in world units.
pub const NODE_WIDTH: f32 = 120.0;
/// Node box height in world units.
pub const NODE_HEIGHT: f32 = 36.0;
/// Inner padding between the node border and its text, in world units.
pub const NODE_PADDING: f32 = 8.0;
/// Corner radius for node rectangles (in world units, scaled on draw).
pub const NODE_CORNER_RADIUS: f32 = 6.0;
/// Text given to freshly created nodes.
pub const DEFAULT_NODE_TEXT: &str = "New Node";

// Canvas interactions
/// Pointer travel (screen pixels) below which a press on empty canvas counts as a click.
pub const CLICK_THRESHOLD: f32 = 4.0;
/// World-space distance from an edge segment that still counts as a hit.
pub const EDGE_HIT_DISTANCE: f32 = 6.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;

// Persistence
/// Namespace prepended to every persisted key.
pub const STORAGE_PREFIX: &str = "canvas:";
/// How often eframe flushes the write-through buffer to disk, in seconds.
pub const AUTO_SAVE_INTERVAL_SECS: u64 = 2;
