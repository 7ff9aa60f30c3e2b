//! Court geometry: percent conversion, grid snapping and magnetic hand targets.
//!
//! Positions live in percent space: `(0, 0)` is the top-left corner of the
//! court's interior and `(100, 100)` the bottom-right. Percent space is not
//! square, so anything measured in metres goes through [`COURT_WIDTH_M`] and
//! [`COURT_LENGTH_M`].

use kurbo::{Point, Rect, Vec2};

use crate::config::SnapConfig;

/// A point in court percent space.
pub type Position = Point;

/// Physical court width in metres (the horizontal percent axis).
pub const COURT_WIDTH_M: f64 = 6.10;
/// Physical court length in metres (the vertical percent axis).
pub const COURT_LENGTH_M: f64 = 13.40;
/// Default number of grid columns across the court.
pub const GRID_COLUMNS: u32 = 60;
/// Spacing between ghost echoes along a path, in percent units.
pub const GHOST_SPACING: f64 = 11.25;
/// Physical distance at which line strokes reach full width.
const STROKE_REFERENCE_M: f64 = 14.0;

/// Clamp a single coordinate to the court.
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Clamp a position to the court.
pub fn clamp_position(point: Position) -> Position {
    Point::new(clamp_percent(point.x), clamp_percent(point.y))
}

/// Convert a client-space pointer position to a clamped court percentage.
///
/// A container with no area maps everything to the origin.
pub fn to_percent(pointer: Point, container: Rect) -> Position {
    let (width, height) = (container.width(), container.height());
    if width <= 0.0 || height <= 0.0 {
        return Point::ZERO;
    }
    clamp_position(Point::new(
        (pointer.x - container.x0) / width * 100.0,
        (pointer.y - container.y0) / height * 100.0,
    ))
}

/// Convert a client-space pointer delta to a percent delta, unclamped.
pub fn to_percent_delta(delta: Vec2, container: Rect) -> Vec2 {
    let (width, height) = (container.width(), container.height());
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(delta.x / width * 100.0, delta.y / height * 100.0)
}

/// Grid axis. The vertical axis has smaller cells in percent space so that
/// cells are square on the physical court.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// The snapping grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    columns: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GRID_COLUMNS)
    }
}

impl Grid {
    /// Create a grid with the given number of columns (at least one).
    pub fn new(columns: u32) -> Self {
        Self {
            columns: columns.max(1),
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Cell size along an axis, in percent units.
    pub fn cell_size(&self, axis: Axis) -> f64 {
        let size_x = 100.0 / self.columns as f64;
        match axis {
            Axis::X => size_x,
            Axis::Y => size_x * (COURT_WIDTH_M / COURT_LENGTH_M),
        }
    }

    /// Round a coordinate to the nearest multiple of the cell size.
    pub fn snap(&self, value: f64, axis: Axis) -> f64 {
        let size = self.cell_size(axis);
        (value / size).round() * size
    }

    /// Snap both coordinates of a position.
    pub fn snap_point(&self, point: Position) -> Position {
        Point::new(self.snap(point.x, Axis::X), self.snap(point.y, Axis::Y))
    }
}

/// Snap a coordinate to the default grid.
pub fn snap_to_grid(value: f64, axis: Axis) -> f64 {
    Grid::default().snap(value, axis)
}

/// Which hand of a token a snap target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

/// A hand position a shuttle can be pulled onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandTarget {
    /// The anchor token centre the hand belongs to.
    pub anchor: Position,
    pub hand: Hand,
    /// The hand position itself.
    pub point: Position,
}

/// Both hand positions for a token centred at `anchor`, left first.
pub fn hand_targets(anchor: Position, offset: Vec2) -> [HandTarget; 2] {
    [
        HandTarget {
            anchor,
            hand: Hand::Left,
            point: Point::new(anchor.x - offset.x, anchor.y + offset.y),
        },
        HandTarget {
            anchor,
            hand: Hand::Right,
            point: Point::new(anchor.x + offset.x, anchor.y + offset.y),
        },
    ]
}

/// Where a snapped position came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapSource {
    /// Nearest grid intersection.
    Grid,
    /// A token's hand.
    Hand(HandTarget),
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Position,
    pub source: SnapSource,
}

impl SnapResult {
    /// Check if a hand captured the point.
    pub fn is_magnetic(&self) -> bool {
        matches!(self.source, SnapSource::Hand(_))
    }
}

/// Snap a raw shuttle position onto the nearest hand of any anchor.
///
/// Anchors are visited in order with the left hand before the right. The
/// first target strictly closer than the current best wins, starting from the
/// magnet radius, so a target exactly on the radius never captures. With no
/// capture the raw position is grid snapped.
pub fn resolve_magnetic_snap(
    raw: Position,
    anchors: impl IntoIterator<Item = Position>,
    config: &SnapConfig,
) -> SnapResult {
    let offset = config.hand_offset();
    let mut best: Option<HandTarget> = None;
    let mut best_dist = config.magnet_radius;

    for anchor in anchors {
        for target in hand_targets(anchor, offset) {
            let dist = target.point.distance(raw);
            if dist < best_dist {
                best_dist = dist;
                best = Some(target);
            }
        }
    }

    match best {
        Some(target) => SnapResult {
            point: target.point,
            source: SnapSource::Hand(target),
        },
        None => SnapResult {
            point: config.grid().snap_point(raw),
            source: SnapSource::Grid,
        },
    }
}

/// Whether `point` sits on either hand of a token at `anchor`.
pub fn is_attached(anchor: Position, point: Position, config: &SnapConfig) -> bool {
    hand_targets(anchor, config.hand_offset())
        .iter()
        .any(|target| target.point.distance(point) < config.attach_threshold)
}

/// Physical distance in metres between two court positions.
pub fn physical_distance(a: Position, b: Position) -> f64 {
    let dx = (b.x - a.x) * COURT_WIDTH_M / 100.0;
    let dy = (b.y - a.y) * COURT_LENGTH_M / 100.0;
    dx.hypot(dy)
}

/// Stroke width in pixels for an annotation line on a court `court_width_px` wide.
///
/// Longer lines (in metres) draw thicker: 0.4% of the court width for a
/// zero-length line up to 1.2% at the reference distance and beyond, eased
/// with a 0.8 power curve. Never thinner than one pixel.
pub fn line_stroke_width(start: Position, end: Position, court_width_px: f64) -> f64 {
    let normalized = (physical_distance(start, end) / STROKE_REFERENCE_M).min(1.0);
    let intensity = normalized.powf(0.8);
    let fraction = 0.004 + intensity * 0.008;
    (court_width_px * fraction).max(1.0)
}

/// Evenly spaced echo positions strictly between `start` and `end`.
pub fn ghost_positions(start: Position, end: Position) -> Vec<Position> {
    let delta = end - start;
    let count = (delta.hypot() / GHOST_SPACING).floor() as usize;
    (1..=count)
        .map(|i| start + delta * (i as f64 / (count + 1) as f64))
        .collect()
}
