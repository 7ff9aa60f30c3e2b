//! Tokens placed on the court: players, markers and the shuttle.

use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityId;
use crate::geometry::{Position, clamp_position};

/// Kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Player,
    Marker,
    Shuttle,
}

/// Player slot colors. Slot `n` (1-based) always gets the `n`th entry of
/// [`PlayerColor::SLOTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerColor {
    Red,
    Blue,
    Yellow,
    Orange,
}

impl PlayerColor {
    /// Colors for P1..P4.
    pub const SLOTS: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Yellow,
        PlayerColor::Orange,
    ];

    /// Color for a 1-based player slot. Slots past the table fall back to red.
    pub fn for_slot(slot: usize) -> Self {
        slot.checked_sub(1)
            .and_then(|index| Self::SLOTS.get(index))
            .copied()
            .unwrap_or(PlayerColor::Red)
    }

    pub fn to_color(self) -> Color {
        match self {
            PlayerColor::Red => Color::from_rgba8(239, 68, 68, 255),
            PlayerColor::Blue => Color::from_rgba8(59, 130, 246, 255),
            PlayerColor::Yellow => Color::from_rgba8(250, 204, 21, 255),
            PlayerColor::Orange => Color::from_rgba8(249, 115, 22, 255),
        }
    }
}

/// A token on the court.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub kind: ItemKind,
    pub position: Position,
    /// Slot color, players only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<PlayerColor>,
    /// "P1".."P4" for players, "1".."N" for markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Item {
    /// Create a new item with a fresh id at a clamped position.
    pub fn new(kind: ItemKind, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position: clamp_position(position),
            color: None,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: PlayerColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == ItemKind::Player
    }

    pub fn is_shuttle(&self) -> bool {
        self.kind == ItemKind::Shuttle
    }

    /// Numeric value of the label for slot bookkeeping: the digits after "P"
    /// for players, the whole label for markers.
    pub(crate) fn label_number(&self) -> Option<usize> {
        let label = self.label.as_deref()?;
        let digits = match self.kind {
            ItemKind::Player => label.strip_prefix('P')?,
            ItemKind::Marker => label,
            ItemKind::Shuttle => return None,
        };
        digits.trim().parse().ok()
    }

    /// Apply a patch, leaving `None` fields untouched.
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(position) = patch.position {
            self.position = clamp_position(position);
        }
        if let Some(label) = &patch.label {
            self.label = Some(label.clone());
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
    }
}

/// Partial update for an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub position: Option<Position>,
    pub label: Option<String>,
    pub color: Option<PlayerColor>,
}

impl ItemPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.label.is_none() && self.color.is_none()
    }
}

/// An item id paired with a position: one entry of a batch move, or the
/// position an item had when a gesture started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemPosition {
    pub id: EntityId,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_for_slot() {
        assert_eq!(PlayerColor::for_slot(1), PlayerColor::Red);
        assert_eq!(PlayerColor::for_slot(2), PlayerColor::Blue);
        assert_eq!(PlayerColor::for_slot(3), PlayerColor::Yellow);
        assert_eq!(PlayerColor::for_slot(4), PlayerColor::Orange);
        assert_eq!(PlayerColor::for_slot(5), PlayerColor::Red);
        assert_eq!(PlayerColor::for_slot(0), PlayerColor::Red);
    }

    #[test]
    fn test_new_item_clamps() {
        let item = Item::new(ItemKind::Marker, Point::new(-5.0, 120.0));
        assert_eq!(item.position, Point::new(0.0, 100.0));
    }

    #[test]
    fn test_label_number() {
        let player = Item::new(ItemKind::Player, Point::ZERO).with_label("P3");
        assert_eq!(player.label_number(), Some(3));

        let renamed = Item::new(ItemKind::Player, Point::ZERO).with_label("Server");
        assert_eq!(renamed.label_number(), None);

        let marker = Item::new(ItemKind::Marker, Point::ZERO).with_label("7");
        assert_eq!(marker.label_number(), Some(7));

        let shuttle = Item::new(ItemKind::Shuttle, Point::ZERO);
        assert_eq!(shuttle.label_number(), None);
    }

    #[test]
    fn test_apply_patch() {
        let mut item = Item::new(ItemKind::Player, Point::new(10.0, 10.0))
            .with_label("P1")
            .with_color(PlayerColor::Red);
        item.apply_patch(&ItemPatch::label("Server"));
        assert_eq!(item.label.as_deref(), Some("Server"));
        assert_eq!(item.position, Point::new(10.0, 10.0));
        assert_eq!(item.color, Some(PlayerColor::Red));

        item.apply_patch(&ItemPatch {
            position: Some(Point::new(150.0, 20.0)),
            ..ItemPatch::default()
        });
        assert_eq!(item.position, Point::new(100.0, 20.0));
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        let json = serde_json::to_string(&ItemKind::Shuttle).unwrap();
        assert_eq!(json, "\"SHUTTLE\"");
    }
}
