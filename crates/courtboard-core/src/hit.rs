//! Hit testing in client pixels.
//!
//! Targets are checked in the order they are stacked on screen, topmost first:
//! shuttles, other items (latest on top), path-end tokens, line labels, then
//! line handles and bodies (latest line on top, end handle over start handle
//! over body). Anything else inside the court is background.

use kurbo::{ParamCurveNearest, Point, Rect, Size};

use crate::geometry::Position;
use crate::metrics::Metrics;
use crate::scene::{EntityId, ItemKind, Line, Scene};

/// What sits under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    Item(EntityId),
    PathEnd(EntityId),
    LineLabel(EntityId),
    LineStart(EntityId),
    LineEnd(EntityId),
    LineBody(EntityId),
    Background,
}

impl HitTarget {
    /// The entity under the pointer, if any.
    pub fn entity(&self) -> Option<EntityId> {
        match *self {
            HitTarget::Item(id)
            | HitTarget::PathEnd(id)
            | HitTarget::LineLabel(id)
            | HitTarget::LineStart(id)
            | HitTarget::LineEnd(id)
            | HitTarget::LineBody(id) => Some(id),
            HitTarget::Background => None,
        }
    }

    /// Whether the target belongs to a line.
    pub fn is_line(&self) -> bool {
        matches!(
            self,
            HitTarget::LineLabel(_) | HitTarget::LineStart(_) | HitTarget::LineEnd(_) | HitTarget::LineBody(_)
        )
    }
}

/// Map a court position to client pixels.
pub fn to_client(position: Position, container: Rect) -> Point {
    Point::new(
        container.x0 + position.x / 100.0 * container.width(),
        container.y0 + position.y / 100.0 * container.height(),
    )
}

/// Approximate on-screen box of a line label centred on the line midpoint.
pub fn label_rect(line: &Line, metrics: &Metrics, container: Rect) -> Rect {
    let chars = line.label.chars().count().max(1) as f64;
    let size = Size::new(
        chars * metrics.label_font * 0.6 + 10.0,
        metrics.label_font * 1.2 + 6.0,
    );
    Rect::from_center_size(to_client(line.midpoint(), container), size)
}

fn within(point: Point, center: Point, radius: f64) -> bool {
    point.distance(center) <= radius
}

/// Inclusive point-in-rect test.
pub fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Find the topmost target under `client`.
///
/// Returns `None` when nothing is hit and the pointer is outside the court.
pub fn hit_test(scene: &Scene, metrics: &Metrics, container: Rect, client: Point) -> Option<HitTarget> {
    let shuttle_radius = metrics.shuttle_size / 2.0;
    let item_radius = metrics.item_size / 2.0;

    let shuttle = scene
        .items()
        .rev()
        .filter(|item| item.kind == ItemKind::Shuttle)
        .find(|item| within(client, to_client(item.position, container), shuttle_radius));
    if let Some(item) = shuttle {
        return Some(HitTarget::Item(item.id));
    }

    let token = scene
        .items()
        .rev()
        .filter(|item| item.kind != ItemKind::Shuttle)
        .find(|item| within(client, to_client(item.position, container), item_radius));
    if let Some(item) = token {
        return Some(HitTarget::Item(item.id));
    }

    let meta = scene.path_metadata();
    let ghost_radius = metrics.ghost_size / 2.0;
    let path_end = scene
        .paths()
        .rev()
        .filter(|path| meta.contains_key(&path.id))
        .filter(|path| scene.resolve_source(path.source_id, path.source_type).is_some())
        .find(|path| within(client, to_client(path.end_position, container), ghost_radius));
    if let Some(path) = path_end {
        return Some(HitTarget::PathEnd(path.id));
    }

    let label = scene
        .lines()
        .rev()
        .find(|line| contains_inclusive(label_rect(line, metrics, container), client));
    if let Some(line) = label {
        return Some(HitTarget::LineLabel(line.id));
    }

    let handle_radius = metrics.line_endpoint_radius();
    let body_half_width = metrics.line_handle_size / 2.0;
    for line in scene.lines().rev() {
        let start = to_client(line.start, container);
        let end = to_client(line.end, container);
        if within(client, end, handle_radius) {
            return Some(HitTarget::LineEnd(line.id));
        }
        if within(client, start, handle_radius) {
            return Some(HitTarget::LineStart(line.id));
        }
        let segment = kurbo::Line::new(start, end);
        if segment.nearest(client, 1e-6).distance_sq <= body_half_width * body_half_width {
            return Some(HitTarget::LineBody(line.id));
        }
    }

    contains_inclusive(container, client).then_some(HitTarget::Background)
}
