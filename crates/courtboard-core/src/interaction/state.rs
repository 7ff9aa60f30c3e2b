//! Interaction states.

use kurbo::Point;

use super::long_press::LongPress;
use crate::geometry::Position;
use crate::scene::{EntityId, ItemKind, ItemPosition, SourceType};

/// The single active gesture. Each variant carries exactly the data its
/// gesture needs, including the shuttles that travel with a dragged token.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging an item.
    DragItem {
        id: EntityId,
        kind: ItemKind,
        /// Item position when the drag started.
        initial_position: Position,
        /// Client-space pointer position the drag is measured from.
        initial_pointer: Point,
        /// Shuttles held by the item, with their starting positions.
        attached: Vec<ItemPosition>,
    },
    /// Drawing a new line from the background.
    DrawLine { start: Position, end: Position },
    /// Moving a whole line.
    MoveLine {
        id: EntityId,
        start_ref: Position,
        end_ref: Position,
        pointer_ref: Position,
    },
    /// Dragging a line's start handle.
    ResizeLineStart { id: EntityId },
    /// Dragging a line's end handle.
    ResizeLineEnd { id: EntityId },
    /// Pressed on a player or path end; waiting to see whether it becomes a
    /// long press or a drag.
    AwaitingLongPress {
        source_id: EntityId,
        source_type: SourceType,
        /// Client-space press position, for the movement threshold.
        origin: Point,
        /// Court position of the press, where a new path starts out.
        press_position: Position,
        timer: LongPress,
        attached: Vec<ItemPosition>,
    },
    /// Long press fired; the pointer steers the end of a new path.
    CreatingPath {
        source_id: EntityId,
        source_type: SourceType,
        current_end: Position,
    },
    /// Dragging the end of an existing path.
    DragPathEnd {
        id: EntityId,
        initial_end: Position,
        initial_pointer: Point,
        attached: Vec<ItemPosition>,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "Idle",
            InteractionState::DragItem { .. } => "DragItem",
            InteractionState::DrawLine { .. } => "DrawLine",
            InteractionState::MoveLine { .. } => "MoveLine",
            InteractionState::ResizeLineStart { .. } => "ResizeLineStart",
            InteractionState::ResizeLineEnd { .. } => "ResizeLineEnd",
            InteractionState::AwaitingLongPress { .. } => "AwaitingLongPress",
            InteractionState::CreatingPath { .. } => "CreatingPath",
            InteractionState::DragPathEnd { .. } => "DragPathEnd",
        }
    }

    /// The entity being manipulated, if the gesture has one.
    pub fn target(&self) -> Option<EntityId> {
        match *self {
            InteractionState::Idle | InteractionState::DrawLine { .. } => None,
            InteractionState::DragItem { id, .. }
            | InteractionState::MoveLine { id, .. }
            | InteractionState::ResizeLineStart { id }
            | InteractionState::ResizeLineEnd { id }
            | InteractionState::DragPathEnd { id, .. } => Some(id),
            InteractionState::AwaitingLongPress { source_id, .. }
            | InteractionState::CreatingPath { source_id, .. } => Some(source_id),
        }
    }

    /// Shuttles travelling with the current gesture.
    pub fn attached(&self) -> &[ItemPosition] {
        match self {
            InteractionState::DragItem { attached, .. }
            | InteractionState::AwaitingLongPress { attached, .. }
            | InteractionState::DragPathEnd { attached, .. } => attached,
            _ => &[],
        }
    }
}
