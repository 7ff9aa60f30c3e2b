//! Free-form annotation lines.

use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityId;
use crate::geometry::{Position, clamp_position};

/// Line palette. The first entry is the default for new lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineColor {
    #[default]
    Yellow,
    White,
    Red,
    Blue,
    Orange,
    Purple,
    Green,
    Gray,
}

impl LineColor {
    /// The full palette in display order.
    pub const PALETTE: [LineColor; 8] = [
        LineColor::Yellow,
        LineColor::White,
        LineColor::Red,
        LineColor::Blue,
        LineColor::Orange,
        LineColor::Purple,
        LineColor::Green,
        LineColor::Gray,
    ];

    pub fn to_color(self) -> Color {
        match self {
            LineColor::Yellow => Color::from_rgba8(250, 204, 21, 255),
            LineColor::White => Color::from_rgba8(255, 255, 255, 255),
            LineColor::Red => Color::from_rgba8(239, 68, 68, 255),
            LineColor::Blue => Color::from_rgba8(59, 130, 246, 255),
            LineColor::Orange => Color::from_rgba8(249, 115, 22, 255),
            LineColor::Purple => Color::from_rgba8(168, 85, 247, 255),
            LineColor::Green => Color::from_rgba8(74, 222, 128, 255),
            LineColor::Gray => Color::from_rgba8(156, 163, 175, 255),
        }
    }
}

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
}

/// Color and pattern applied to newly drawn lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: LineColor,
    pub line_type: LineType,
}

/// An annotation segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: EntityId,
    pub start: Position,
    pub end: Position,
    pub label: String,
    pub color: LineColor,
    #[serde(rename = "type")]
    pub line_type: LineType,
}

impl Line {
    /// Create a new line with a fresh id.
    pub fn new(start: Position, end: Position, label: impl Into<String>, style: LineStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            start: clamp_position(start),
            end: clamp_position(end),
            label: label.into(),
            color: style.color,
            line_type: style.line_type,
        }
    }

    /// Straight-line length in percent units.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Position {
        self.start.midpoint(self.end)
    }

    /// Apply a patch, leaving `None` fields untouched.
    pub fn apply_patch(&mut self, patch: &LinePatch) {
        if let Some(start) = patch.start {
            self.start = clamp_position(start);
        }
        if let Some(end) = patch.end {
            self.end = clamp_position(end);
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(line_type) = patch.line_type {
            self.line_type = line_type;
        }
    }
}

/// Partial update for a line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinePatch {
    pub start: Option<Position>,
    pub end: Option<Position>,
    pub label: Option<String>,
    pub color: Option<LineColor>,
    pub line_type: Option<LineType>,
}

impl LinePatch {
    pub fn endpoints(start: Position, end: Position) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn start(start: Position) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn end(end: Position) -> Self {
        Self {
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}
