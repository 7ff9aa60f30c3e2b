//! Projection of a scene and the live gesture into drawable overlay elements.
//!
//! Positions stay in court percent; sizes are pixels from [`Metrics`]. The
//! projection is a pure function, so a resize only needs fresh metrics.

use std::collections::HashMap;

use courtboard_core::geometry::{ghost_positions, line_stroke_width};
use courtboard_core::{
    Board, EntityId, InteractionState, Item, ItemKind, LineStyle, LineType, Metrics, PathMeta, PlayerColor, Position,
    Scene, SourceType,
};
use peniko::Color;

/// Stroke for a path whose owner cannot be resolved.
pub fn unowned_path_color() -> Color {
    Color::from_rgba8(75, 85, 99, 255)
}

/// Player fill when no slot color is set.
pub fn default_player_color() -> Color {
    Color::from_rgba8(37, 99, 235, 255)
}

fn white() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

fn black() -> Color {
    Color::from_rgba8(0, 0, 0, 255)
}

/// Stacking levels, lowest painted first.
pub mod z {
    pub const ECHO: u8 = 20;
    pub const TOKEN: u8 = 30;
    pub const SHUTTLE: u8 = 40;
}

/// How a token is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    Player,
    Marker,
    Shuttle,
    /// Path ends, echoes and path previews.
    Ghost,
}

/// A short text run with its size and color.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font_size: f64,
    pub color: Color,
}

impl TextRun {
    fn new(text: impl Into<String>, font_size: f64, color: Color) -> Self {
        Self {
            text: text.into(),
            font_size,
            color,
        }
    }
}

/// A positioned token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Item or path the token stands for. `None` for echoes and previews.
    pub entity: Option<EntityId>,
    pub shape: TokenShape,
    pub position: Position,
    /// Box size in pixels.
    pub size: f64,
    pub color: Color,
    pub opacity: f32,
    pub z: u8,
    /// Text centred on the token.
    pub badge: Option<TextRun>,
    /// Text below the token.
    pub caption: Option<TextRun>,
    /// Being dragged right now.
    pub active: bool,
}

/// A straight stroke: a line, a path, or a preview of either.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub entity: Option<EntityId>,
    pub start: Position,
    pub end: Position,
    pub color: Color,
    pub width: f64,
    /// Dash and gap length, when dashed.
    pub dash: Option<f64>,
    pub opacity: f32,
    pub arrowhead: bool,
    /// Radius of the dot marking the start, if any.
    pub start_dot: Option<f64>,
}

/// A line's label, centred on its midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLabel {
    pub line: EntityId,
    pub position: Position,
    pub text: TextRun,
    pub editable: bool,
}

/// Grab areas of an editable line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHandles {
    pub line: EntityId,
    pub start: Position,
    pub end: Position,
    pub radius: f64,
    pub body_width: f64,
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Strokes in paint order: paths, path preview, lines, line preview.
    pub segments: Vec<Segment>,
    pub handles: Vec<LineHandles>,
    pub labels: Vec<LineLabel>,
    /// Tokens sorted by stacking level, stable within a level.
    pub tokens: Vec<Token>,
}

/// View flags that change how the scene is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayOptions {
    pub locked: bool,
    /// Style of the line being drawn.
    pub line_style: LineStyle,
}

impl Overlay {
    /// Project a board with its current gesture.
    pub fn for_board(board: &Board) -> Self {
        build_overlay(
            board.scene(),
            board.interaction(),
            board.metrics(),
            OverlayOptions {
                locked: board.is_locked(),
                line_style: board.line_style(),
            },
        )
    }

    /// Tokens standing for `entity`.
    pub fn tokens_for(&self, entity: EntityId) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter(move |token| token.entity == Some(entity))
    }
}

fn player_color(item: &Item) -> Color {
    item.color.map_or_else(default_player_color, PlayerColor::to_color)
}

struct Projector<'a> {
    scene: &'a Scene,
    metrics: &'a Metrics,
    meta: HashMap<EntityId, PathMeta>,
    overlay: Overlay,
}

impl<'a> Projector<'a> {
    fn root_player(&self, path_id: EntityId) -> Option<&'a Item> {
        let scene: &'a Scene = self.scene;
        let meta = self.meta.get(&path_id)?;
        scene.item(meta.root_player_id)
    }

    /// Color of whatever a new path from this source would belong to.
    fn source_color(&self, source_id: EntityId, source_type: SourceType) -> Option<Color> {
        let player = match source_type {
            SourceType::Player => self.scene.item(source_id),
            SourceType::Path => self.root_player(source_id),
        };
        player.map(player_color)
    }

    fn path_segment(&self, entity: Option<EntityId>, start: Position, end: Position, color: Color) -> Segment {
        Segment {
            entity,
            start,
            end,
            color,
            width: self.metrics.path_stroke_width(),
            dash: Some(self.metrics.path_dash()),
            opacity: 0.9,
            arrowhead: true,
            start_dot: None,
        }
    }

    fn ghost(&self, entity: Option<EntityId>, position: Position, color: Color, opacity: f32, z: u8) -> Token {
        Token {
            entity,
            shape: TokenShape::Ghost,
            position,
            size: self.metrics.ghost_size,
            color,
            opacity,
            z,
            badge: None,
            caption: None,
            active: false,
        }
    }

    fn echoes(&mut self, start: Position, end: Position, color: Color) {
        for position in ghost_positions(start, end) {
            let echo = self.ghost(None, position, color, 0.5, z::ECHO);
            self.overlay.tokens.push(echo);
        }
    }

    fn paths(&mut self, interaction: &InteractionState) {
        let dragged_path = match interaction {
            InteractionState::DragPathEnd { id, .. } => Some(*id),
            _ => None,
        };

        let scene = self.scene;
        for path in scene.paths() {
            let Some(start) = scene.resolve_source(path.source_id, path.source_type) else {
                continue;
            };
            let owner = self.root_player(path.id);
            let color = owner.map_or_else(unowned_path_color, player_color);
            let segment = self.path_segment(Some(path.id), start, path.end_position, color);
            self.overlay.segments.push(segment);

            // Echoes and the end token need an owning player.
            if owner.is_none() {
                continue;
            }
            self.echoes(start, path.end_position, color);
            let depth = self.meta.get(&path.id).map_or(0, |meta| meta.depth);
            let mut end = self.ghost(Some(path.id), path.end_position, color, 0.9, z::TOKEN);
            end.badge = Some(TextRun::new(depth.to_string(), self.metrics.badge_font(), white()));
            end.active = dragged_path == Some(path.id);
            self.overlay.tokens.push(end);
        }
    }

    fn path_preview(&mut self, interaction: &InteractionState) {
        let InteractionState::CreatingPath {
            source_id,
            source_type,
            current_end,
        } = *interaction
        else {
            return;
        };
        let Some(start) = self.scene.resolve_source(source_id, source_type) else {
            return;
        };
        let color = self.source_color(source_id, source_type).unwrap_or_else(white);
        let segment = self.path_segment(None, start, current_end, color);
        self.overlay.segments.push(segment);
        self.echoes(start, current_end, color);
        let end = self.ghost(None, current_end, color, 0.8, z::ECHO);
        self.overlay.tokens.push(end);
    }

    fn line_segment(&self, start: Position, end: Position, style: LineStyle) -> Segment {
        Segment {
            entity: None,
            start,
            end,
            color: style.color.to_color(),
            width: line_stroke_width(start, end, self.metrics.court_width),
            dash: (style.line_type == LineType::Dashed).then(|| self.metrics.line_dash()),
            opacity: 1.0,
            arrowhead: true,
            start_dot: Some(self.metrics.line_start_dot_radius()),
        }
    }

    fn lines(&mut self, options: OverlayOptions) {
        let scene = self.scene;
        for line in scene.lines() {
            let style = LineStyle {
                color: line.color,
                line_type: line.line_type,
            };
            let mut segment = self.line_segment(line.start, line.end, style);
            segment.entity = Some(line.id);
            self.overlay.segments.push(segment);

            if !options.locked {
                self.overlay.handles.push(LineHandles {
                    line: line.id,
                    start: line.start,
                    end: line.end,
                    radius: self.metrics.line_endpoint_radius(),
                    body_width: self.metrics.line_handle_size,
                });
            }
            self.overlay.labels.push(LineLabel {
                line: line.id,
                position: line.midpoint(),
                text: TextRun::new(line.label.clone(), self.metrics.label_font, white()),
                editable: !options.locked,
            });
        }
    }

    fn line_preview(&mut self, interaction: &InteractionState, style: LineStyle) {
        if let InteractionState::DrawLine { start, end } = *interaction {
            let mut segment = self.line_segment(start, end, style);
            segment.opacity = 0.8;
            segment.arrowhead = false;
            self.overlay.segments.push(segment);
        }
    }

    fn items(&mut self, interaction: &InteractionState) {
        let dragged_item = match interaction {
            InteractionState::DragItem { id, .. } => Some(*id),
            _ => None,
        };

        let (scene, metrics) = (self.scene, self.metrics);
        for item in scene.items() {
            let mut token = Token {
                entity: Some(item.id),
                shape: TokenShape::Player,
                position: item.position,
                size: metrics.item_size,
                color: white(),
                opacity: 1.0,
                z: z::TOKEN,
                badge: None,
                caption: None,
                active: dragged_item == Some(item.id),
            };
            match item.kind {
                ItemKind::Player => {
                    token.color = player_color(item);
                    token.badge = scene
                        .has_paths(item.id)
                        .then(|| TextRun::new("0", metrics.badge_font(), white()));
                    token.caption = item
                        .label
                        .as_ref()
                        .map(|label| TextRun::new(label.clone(), metrics.label_font, white()));
                }
                ItemKind::Marker => {
                    token.shape = TokenShape::Marker;
                    token.size = metrics.marker_size;
                    token.badge = item
                        .label
                        .as_ref()
                        .map(|label| TextRun::new(label.clone(), metrics.marker_font, black()));
                }
                ItemKind::Shuttle => {
                    token.shape = TokenShape::Shuttle;
                    token.size = metrics.shuttle_size;
                    token.z = z::SHUTTLE;
                }
            }
            self.overlay.tokens.push(token);
        }
    }
}

/// Project `scene` and the live `interaction` into an [`Overlay`].
///
/// Paths whose source is gone draw nothing. Paths without an owning player
/// keep their gray stroke but get no end token or echoes.
pub fn build_overlay(
    scene: &Scene,
    interaction: &InteractionState,
    metrics: &Metrics,
    options: OverlayOptions,
) -> Overlay {
    let mut projector = Projector {
        scene,
        metrics,
        meta: scene.path_metadata(),
        overlay: Overlay::default(),
    };

    projector.paths(interaction);
    projector.path_preview(interaction);
    projector.lines(options);
    projector.line_preview(interaction, options.line_style);
    projector.items(interaction);

    let mut overlay = projector.overlay;
    overlay.tokens.sort_by_key(|token| token.z);
    overlay
}
