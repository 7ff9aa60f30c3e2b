//! Pointer events and double-click detection.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

use crate::config::GestureConfig;
use crate::hit::HitTarget;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => position,
        }
    }

    /// Whether this is a primary-button press or release. Moves always count.
    pub fn is_primary(&self) -> bool {
        match *self {
            PointerEvent::Down { button, .. } | PointerEvent::Up { button, .. } => button == MouseButton::Left,
            PointerEvent::Move { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Click {
    at: Instant,
    position: Point,
    target: HitTarget,
}

/// Detects two presses on the same target in quick succession.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    last: Option<Click>,
    max_gap: Duration,
    max_distance: f64,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

impl ClickTracker {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            last: None,
            max_gap: config.double_click_duration(),
            max_distance: config.double_click_slop_px,
        }
    }

    /// Record a press and report whether it completes a double click.
    pub fn register(&mut self, now: Instant, position: Point, target: HitTarget) -> bool {
        let is_double = self.last.is_some_and(|last| {
            last.target == target
                && now.saturating_duration_since(last.at) < self.max_gap
                && last.position.distance(position) < self.max_distance
        });

        if is_double {
            // Reset to prevent triple-click being detected as another double-click
            self.last = None;
        } else {
            self.last = Some(Click {
                at: now,
                position,
                target,
            });
        }
        is_double
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_event_position() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(PointerEvent::Move { position: p }.position(), p);
        assert!(PointerEvent::Down { position: p, button: MouseButton::Left }.is_primary());
        assert!(!PointerEvent::Up { position: p, button: MouseButton::Right }.is_primary());
    }

    #[test]
    fn test_double_click_detection() {
        let mut clicks = ClickTracker::default();
        let target = HitTarget::Item(Uuid::new_v4());
        let start = Instant::now();
        let pos = Point::new(100.0, 100.0);

        assert!(!clicks.register(start, pos, target));
        assert!(clicks.register(start + Duration::from_millis(200), pos, target));
        // A third press starts over.
        assert!(!clicks.register(start + Duration::from_millis(300), pos, target));
    }

    #[test]
    fn test_double_click_too_slow() {
        let mut clicks = ClickTracker::default();
        let start = Instant::now();
        let pos = Point::new(100.0, 100.0);
        clicks.register(start, pos, HitTarget::Background);
        assert!(!clicks.register(start + Duration::from_millis(600), pos, HitTarget::Background));
    }

    #[test]
    fn test_double_click_too_far() {
        let mut clicks = ClickTracker::default();
        let start = Instant::now();
        clicks.register(start, Point::new(100.0, 100.0), HitTarget::Background);
        assert!(!clicks.register(
            start + Duration::from_millis(100),
            Point::new(200.0, 200.0),
            HitTarget::Background
        ));
    }

    #[test]
    fn test_double_click_needs_same_target() {
        let mut clicks = ClickTracker::default();
        let start = Instant::now();
        let pos = Point::new(100.0, 100.0);
        clicks.register(start, pos, HitTarget::Item(Uuid::new_v4()));
        assert!(!clicks.register(start + Duration::from_millis(100), pos, HitTarget::Item(Uuid::new_v4())));
    }
}
