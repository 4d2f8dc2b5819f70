//! Viewport transform, panning and zooming.
//!
//! The viewport maps world (diagram) coordinates to screen coordinates with a
//! uniform scale followed by a translation: `screen = world * scale + (x, y)`.
//! Panning works in screen space and is therefore unaffected by the scale.

use crate::config::CanvasConfig;
use crate::constants::CLICK_THRESHOLD;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// Translation plus uniform scale from world space to screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen-space x translation
    pub x: f32,
    /// Screen-space y translation
    pub y: f32,
    /// Uniform scale (1.0 = 100%)
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

/// Direction of a single zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Magnify (scale grows)
    In,
    /// Shrink (scale decreases)
    Out,
}

impl ZoomDirection {
    /// Interprets a wheel delta: positive zooms in, negative zooms out, zero does nothing.
    pub fn from_wheel(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(Self::In)
        } else if delta_y < 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

impl Viewport {
    /// Creates a viewport from its raw parts.
    pub fn new(x: f32, y: f32, scale: f32) -> Self {
        Self { x, y, scale }
    }

    /// The translation component as a vector.
    pub fn translation(&self) -> Vec2 {
        egui::vec2(self.x, self.y)
    }

    /// Converts screen coordinates to world coordinates.
    pub fn to_world(&self, screen_pos: Pos2) -> Pos2 {
        ((screen_pos - self.translation()).to_vec2() / self.scale).to_pos2()
    }

    /// Converts world coordinates to screen coordinates.
    pub fn to_screen(&self, world_pos: Pos2) -> Pos2 {
        (world_pos.to_vec2() * self.scale + self.translation()).to_pos2()
    }

    /// Converts a screen-space displacement into the matching world-space displacement.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.scale
    }

    /// Shifts the view by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Applies one zoom step, clamping the scale to the configured range.
    ///
    /// With an `anchor`, the world point under that screen position stays put;
    /// without one, the translation is left unchanged.
    ///
    /// # Returns
    ///
    /// `true` if the scale actually changed.
    pub fn zoom(
        &mut self,
        direction: ZoomDirection,
        anchor: Option<Pos2>,
        config: &CanvasConfig,
    ) -> bool {
        let factor = match direction {
            ZoomDirection::In => config.zoom_in_factor,
            ZoomDirection::Out => config.zoom_out_factor,
        };
        let old_scale = self.scale;
        let new_scale = config.clamp_scale(old_scale * factor);
        if (new_scale - old_scale).abs() <= f32::EPSILON {
            return false;
        }

        if let Some(anchor) = anchor {
            let ratio = new_scale / old_scale;
            let translation = anchor.to_vec2() - (anchor.to_vec2() - self.translation()) * ratio;
            self.x = translation.x;
            self.y = translation.y;
        }
        self.scale = new_scale;
        log::debug!("zoom {:?} -> scale {:.3}", direction, self.scale);
        true
    }

    /// Returns a usable copy of a possibly corrupt viewport.
    ///
    /// Non-finite values or a non-positive scale yield the default viewport;
    /// an out-of-range scale is clamped.
    pub fn sanitized(self, config: &CanvasConfig) -> Self {
        let finite = self.x.is_finite() && self.y.is_finite() && self.scale.is_finite();
        if !finite || self.scale <= 0.0 {
            return Self::default();
        }
        Self {
            scale: config.clamp_scale(self.scale),
            ..self
        }
    }
}

/// An in-progress pan gesture.
///
/// Each update applies the delta since the previous update, so the viewport
/// translation accumulates incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    origin: Pos2,
    last: Pos2,
    max_travel: f32,
}

impl PanGesture {
    /// Starts panning from the pointer position.
    pub fn begin(pointer: Pos2) -> Self {
        Self {
            origin: pointer,
            last: pointer,
            max_travel: 0.0,
        }
    }

    /// Where the pointer went down.
    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// Moves the viewport by the pointer travel since the last update.
    pub fn update(&mut self, pointer: Pos2, viewport: &mut Viewport) -> Vec2 {
        let delta = pointer - self.last;
        viewport.pan_by(delta);
        self.last = pointer;
        self.max_travel = self.max_travel.max((pointer - self.origin).length());
        delta
    }

    /// Whether the pointer stayed close enough to its origin for the gesture to count as a click.
    pub fn is_click(&self) -> bool {
        self.max_travel < CLICK_THRESHOLD
    }
}
