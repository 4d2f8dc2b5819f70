//! Runtime-tunable interaction settings.

use crate::constants;

/// Interaction parameters; [`Default`] mirrors the values in [`crate::constants`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// World-space radius for proximity recruitment during a drag
    pub group_distance: f32,
    /// Lower bound for the viewport scale
    pub min_scale: f32,
    /// Upper bound for the viewport scale
    pub max_scale: f32,
    /// Multiplier applied per zoom-in step
    pub zoom_in_factor: f32,
    /// Multiplier applied per zoom-out step
    pub zoom_out_factor: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            group_distance: constants::GROUP_DISTANCE,
            min_scale: constants::MIN_SCALE,
            max_scale: constants::MAX_SCALE,
            zoom_in_factor: constants::ZOOM_IN_FACTOR,
            zoom_out_factor: constants::ZOOM_OUT_FACTOR,
        }
    }
}

impl CanvasConfig {
    /// Clamps a scale into `[min_scale, max_scale]`.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}
