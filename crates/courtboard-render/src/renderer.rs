//! Renderer trait abstraction.

use courtboard_core::geometry::{Axis, Grid};
use kurbo::{Point, Rect, Size};
use peniko::Color;
use thiserror::Error;

use crate::overlay::Overlay;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Court grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid.
    #[default]
    None,
    /// Full grid lines.
    Lines,
    /// Only grid intersections.
    Dots,
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The projected overlay to draw.
    pub overlay: &'a Overlay,
    /// Court interior in viewport pixels.
    pub container: Rect,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Background color.
    pub background_color: Color,
    /// Court grid display style.
    pub grid_style: GridStyle,
    /// Snap grid the court grid is drawn from.
    pub grid: Grid,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(overlay: &'a Overlay, container: Rect, viewport_size: Size) -> Self {
        Self {
            overlay,
            container,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(13, 18, 15, 255),
            grid_style: GridStyle::None,
            grid: Grid::default(),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the grid style.
    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    /// Set the snap grid to draw.
    pub fn with_snap_grid(mut self, grid: Grid) -> Self {
        self.grid = grid;
        self
    }

    /// Map a court position to viewport pixels.
    pub fn to_viewport(&self, position: Point) -> Point {
        courtboard_core::hit::to_client(position, self.container)
    }

    /// Grid line offsets in viewport pixels along one axis, edges included.
    pub fn grid_offsets(&self, axis: Axis) -> Vec<f64> {
        let (origin, extent) = match axis {
            Axis::X => (self.container.x0, self.container.width()),
            Axis::Y => (self.container.y0, self.container.height()),
        };
        let step = self.grid.cell_size(axis);
        if step <= 0.0 {
            return Vec::new();
        }
        // Tolerate rounding so a whole number of cells keeps its far edge.
        let count = (100.0 / step + 1e-9).floor() as usize;
        (0..=count)
            .map(|i| origin + i as f64 * step / 100.0 * extent)
            .collect()
    }

    /// Reject frames with nothing to draw into.
    pub fn validate(&self) -> RenderResult<()> {
        if self.container.width() <= 0.0 || self.container.height() <= 0.0 {
            return Err(RendererError::RenderFailed(format!(
                "court container {:?} has no area",
                self.container
            )));
        }
        Ok(())
    }
}

/// Trait for rendering backends.
///
/// Implementations can use Vello, wgpu directly, or other rendering engines.
pub trait Renderer {
    /// Build the scene/command buffer for a frame.
    ///
    /// This method is called once per frame and should prepare all drawing commands.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_viewport() {
        let overlay = Overlay::default();
        let ctx = RenderContext::new(&overlay, Rect::new(10.0, 20.0, 210.0, 420.0), Size::new(400.0, 600.0));
        assert_eq!(ctx.to_viewport(Point::new(50.0, 50.0)), Point::new(110.0, 220.0));
    }

    #[test]
    fn test_grid_offsets() {
        let overlay = Overlay::default();
        let ctx = RenderContext::new(&overlay, Rect::new(0.0, 0.0, 600.0, 1200.0), Size::new(600.0, 1200.0))
            .with_snap_grid(Grid::new(60));
        let columns = ctx.grid_offsets(Axis::X);
        assert_eq!(columns.len(), 61);
        assert!((columns[1] - 10.0).abs() < 1e-9);
        assert!((columns[60] - 600.0).abs() < 1e-6);
        // Rows are finer than columns in percent space.
        let rows = ctx.grid_offsets(Axis::Y);
        assert!(rows.len() > columns.len());
    }

    #[test]
    fn test_empty_container_rejected() {
        let overlay = Overlay::default();
        let ctx = RenderContext::new(&overlay, Rect::ZERO, Size::new(400.0, 600.0));
        assert!(matches!(ctx.validate(), Err(RendererError::RenderFailed(_))));
    }
}
