//! Pixel sizes of on-court elements for a given container width.
//!
//! Everything scales linearly with the container width against a 400px
//! reference, with per-element floors so tokens stay legible on small
//! screens. Stored positions never depend on these values.

use serde::{Deserialize, Serialize};

/// Container width at which every element has its base size.
pub const REFERENCE_WIDTH: f64 = 400.0;

/// Scaled element sizes in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Container width / [`REFERENCE_WIDTH`], or 1 while the width is unknown.
    pub scale: f64,
    /// Width of the court the sizes were computed for.
    pub court_width: f64,
    /// Player token box (and marker hit box).
    pub item_size: f64,
    pub shuttle_size: f64,
    /// Marker disc diameter.
    pub marker_size: f64,
    /// Path-end and echo token box.
    pub ghost_size: f64,
    pub marker_font: f64,
    pub label_font: f64,
    /// Grab width of a line body.
    pub line_handle_size: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::for_width(0.0)
    }
}

impl Metrics {
    /// Compute sizes for a container `width` pixels wide.
    pub fn for_width(width: f64) -> Self {
        let scale = if width > 0.0 { width / REFERENCE_WIDTH } else { 1.0 };
        let sized = |floor: f64, base: f64| (base * scale).max(floor);
        Self {
            scale,
            court_width: width.max(0.0),
            item_size: sized(24.0, 40.0),
            shuttle_size: sized(14.0, 22.0),
            marker_size: sized(14.0, 23.0),
            ghost_size: sized(24.0, 40.0),
            marker_font: sized(8.0, 10.0),
            label_font: sized(10.0, 12.0),
            line_handle_size: sized(12.0, 20.0),
        }
    }

    /// Stroke width of a ghost path.
    pub fn path_stroke_width(&self) -> f64 {
        3.0 * self.scale
    }

    /// Dash and gap length of a ghost path.
    pub fn path_dash(&self) -> f64 {
        6.0 * self.scale
    }

    /// Dash and gap length of a dashed annotation line.
    pub fn line_dash(&self) -> f64 {
        12.0 * self.scale
    }

    /// Radius of the dot marking where a line starts.
    pub fn line_start_dot_radius(&self) -> f64 {
        6.0 * self.scale
    }

    /// Grab radius of a line endpoint handle.
    pub fn line_endpoint_radius(&self) -> f64 {
        12.0 * self.scale
    }

    /// Font size of the depth badge on path ends and players.
    pub fn badge_font(&self) -> f64 {
        self.label_font * 0.8
    }
}
