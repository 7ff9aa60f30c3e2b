//! Vello-based renderer implementation.

use crate::overlay::{LineLabel, Segment, TextRun, Token, TokenShape, z};
use crate::renderer::{GridStyle, RenderContext, RenderResult, Renderer};
use courtboard_core::geometry::Axis;
use kurbo::{Affine, BezPath, Cap, Circle, Point, Rect, RoundedRect, Shape, Size, Stroke, Vec2};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, Layout, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use vello::Scene;

/// Font stack for every label; resolved against the system fonts.
const FONT_STACK: &str = "system-ui, sans-serif";

/// Vello-based renderer for the court overlay.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Font context for text rendering.
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Viewport transform for the frame being built (HiDPI scale).
    transform: Affine,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            transform: Affine::IDENTITY,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn render_grid(&mut self, ctx: &RenderContext) {
        let columns = ctx.grid_offsets(Axis::X);
        let rows = ctx.grid_offsets(Axis::Y);
        let court = ctx.container;

        match ctx.grid_style {
            GridStyle::None => {}
            GridStyle::Lines => {
                let color = Color::from_rgba8(255, 255, 255, 20);
                let stroke = Stroke::new(1.0);
                for &x in &columns {
                    let line = kurbo::Line::new((x, court.y0), (x, court.y1));
                    self.scene.stroke(&stroke, self.transform, color, None, &line);
                }
                for &y in &rows {
                    let line = kurbo::Line::new((court.x0, y), (court.x1, y));
                    self.scene.stroke(&stroke, self.transform, color, None, &line);
                }
            }
            GridStyle::Dots => {
                let color = Color::from_rgba8(255, 255, 255, 40);
                for &x in &columns {
                    for &y in &rows {
                        let dot = Circle::new((x, y), 1.0);
                        self.scene.fill(Fill::NonZero, self.transform, color, None, &dot);
                    }
                }
            }
        }
    }

    /// Stroke a line or path, with its start dot and arrowhead.
    fn render_segment(&mut self, segment: &Segment, ctx: &RenderContext) {
        let start = ctx.to_viewport(segment.start);
        let end = ctx.to_viewport(segment.end);
        let color = segment.color.multiply_alpha(segment.opacity);

        let mut stroke = Stroke::new(segment.width);
        if segment.start_dot.is_some() {
            stroke = stroke.with_caps(Cap::Round);
        }
        if let Some(dash) = segment.dash {
            stroke = stroke.with_dashes(0.0, [dash, dash]);
        }
        self.scene
            .stroke(&stroke, self.transform, color, None, &kurbo::Line::new(start, end));

        if let Some(radius) = segment.start_dot {
            self.scene
                .fill(Fill::NonZero, self.transform, color, None, &Circle::new(start, radius));
        }
        if segment.arrowhead {
            self.render_arrowhead(start, end, segment.width, color);
        }
    }

    /// Triangle six stroke widths long and four wide, its tip one width past `end`.
    fn render_arrowhead(&mut self, start: Point, end: Point, width: f64, color: Color) {
        let along = end - start;
        if along.hypot() < f64::EPSILON {
            return;
        }
        let dir = along.normalize();
        let normal = Vec2::new(-dir.y, dir.x);
        let tip = end + dir * width;
        let base = end - dir * (5.0 * width);

        let mut head = BezPath::new();
        head.move_to(tip);
        head.line_to(base + normal * (2.0 * width));
        head.line_to(base - normal * (2.0 * width));
        head.close_path();
        self.scene.fill(Fill::NonZero, self.transform, color, None, &head);
    }

    fn render_label(&mut self, label: &LineLabel, ctx: &RenderContext) {
        let center = ctx.to_viewport(label.position);
        let layout = self.layout_text(&label.text);
        let size = Size::new(layout.width() as f64, layout.height() as f64);
        let padding = Vec2::new(4.0, 2.0);
        let plate = Rect::from_center_size(center, size + Size::new(2.0 * padding.x, 2.0 * padding.y));
        let plate = RoundedRect::from_rect(plate, 4.0);

        self.scene
            .fill(Fill::NonZero, self.transform, Color::from_rgba8(28, 38, 32, 255), None, &plate);
        self.scene.stroke(
            &Stroke::new(1.0),
            self.transform,
            Color::from_rgba8(75, 85, 99, 255),
            None,
            &plate,
        );
        self.draw_layout(&layout, center - size.to_vec2() / 2.0, &label.text);
    }

    fn render_token(&mut self, token: &Token, ctx: &RenderContext) {
        let center = ctx.to_viewport(token.position);
        let size = if token.active { token.size * 1.1 } else { token.size };
        let color = token.color.multiply_alpha(token.opacity);

        match token.shape {
            TokenShape::Player | TokenShape::Ghost => self.render_figure(center, size, color, token.opacity),
            TokenShape::Marker => {
                let disc = Circle::new(center, size / 2.0);
                self.scene.fill(Fill::NonZero, self.transform, color, None, &disc);
                self.scene.stroke(
                    &Stroke::new(1.0),
                    self.transform,
                    Color::from_rgba8(209, 213, 219, 255),
                    None,
                    &disc,
                );
            }
            TokenShape::Shuttle => self.render_shuttle(center, size, color),
        }

        if let Some(badge) = &token.badge {
            self.render_centered_text(badge, center);
        }
        if let Some(caption) = &token.caption {
            let layout = self.layout_text(caption);
            let text_size = Size::new(layout.width() as f64, layout.height() as f64);
            let top_left = Point::new(center.x - text_size.width / 2.0, center.y + size / 2.0 + 4.0);
            let plate = Rect::from_origin_size(top_left, text_size).inflate(2.0, 0.0);
            self.scene.fill(
                Fill::NonZero,
                self.transform,
                Color::from_rgba8(0, 0, 0, 204),
                None,
                &plate,
            );
            self.draw_layout(&layout, top_left, caption);
        }
    }

    /// A standing figure: head over a rounded body.
    fn render_figure(&mut self, center: Point, size: f64, color: Color, opacity: f32) {
        let head = Circle::new(center - Vec2::new(0.0, size * 0.25), size * 0.14);
        let body = RoundedRect::from_rect(
            Rect::from_center_size(center + Vec2::new(0.0, size * 0.12), Size::new(size * 0.42, size * 0.5)),
            size * 0.12,
        );
        let outline = Color::from_rgba8(0, 0, 0, 128).multiply_alpha(opacity);
        for path in [body.to_path(0.1), head.to_path(0.1)] {
            self.scene.fill(Fill::NonZero, self.transform, color, None, &path);
            self.scene
                .stroke(&Stroke::new(1.0), self.transform, outline, None, &path);
        }
    }

    /// Shuttlecock on a 24-unit grid, tilted 45 degrees.
    fn render_shuttle(&mut self, center: Point, size: f64, color: Color) {
        let mut cork = BezPath::new();
        cork.move_to((8.0, 19.0));
        cork.curve_to((8.0, 21.2), (9.8, 23.0), (12.0, 23.0));
        cork.curve_to((14.2, 23.0), (16.0, 21.2), (16.0, 19.0));
        cork.close_path();

        let mut skirt = BezPath::new();
        skirt.move_to((16.0, 18.0));
        for point in [
            (19.5, 4.0),
            (16.5, 4.0),
            (14.5, 12.0),
            (13.5, 4.0),
            (10.5, 4.0),
            (9.5, 12.0),
            (7.5, 4.0),
            (4.5, 4.0),
            (8.0, 18.0),
        ] {
            skirt.line_to(point);
        }
        skirt.close_path();

        let placement = self.transform
            * Affine::translate(center.to_vec2())
            * Affine::rotate(std::f64::consts::FRAC_PI_4)
            * Affine::scale(size / 24.0)
            * Affine::translate((-12.0, -12.0));
        self.scene.fill(Fill::NonZero, placement, color, None, &cork);
        self.scene.fill(Fill::NonZero, placement, color, None, &skirt);

        let ribs = Color::from_rgba8(0, 0, 0, 77);
        for y in [10.0, 14.0] {
            let inset = if y < 12.0 { 6.0 } else { 7.0 };
            let rib = kurbo::Line::new((inset, y), (24.0 - inset, y));
            self.scene.stroke(&Stroke::new(1.0), placement, ribs, None, &rib);
        }
    }

    fn render_centered_text(&mut self, run: &TextRun, center: Point) {
        let layout = self.layout_text(run);
        let half = Vec2::new(layout.width() as f64 / 2.0, layout.height() as f64 / 2.0);
        self.draw_layout(&layout, center - half, run);
    }

    fn layout_text(&mut self, run: &TextRun) -> Layout<Brush> {
        let brush = Brush::Solid(run.color);
        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, &run.text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(run.font_size as f32));
        builder.push_default(StyleProperty::Brush(brush));
        builder.push_default(StyleProperty::FontWeight(parley::FontWeight::BOLD));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::from(FONT_STACK)));
        let mut layout = builder.build(&run.text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }

    /// Draw a laid-out run with its top-left corner at `origin`.
    fn draw_layout(&mut self, layout: &Layout<Brush>, origin: Point, run: &TextRun) {
        let brush = Brush::Solid(run.color);
        let text_transform = self.transform * Affine::translate(origin.to_vec2());
        let mut glyph_count = 0;

        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let glyph_layout = glyph_run.run();
                let font = glyph_layout.font();
                let font_size = glyph_layout.font_size();
                let synthesis = glyph_layout.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();
                glyph_count += glyphs.len();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(glyph_layout.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        if glyph_count == 0 && !run.text.is_empty() {
            log::trace!("No glyphs for label {:?}; is a sans-serif font installed?", run.text);
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        ctx.validate()?;
        self.scene.reset();
        self.transform = Affine::scale(ctx.scale_factor);

        self.render_grid(ctx);

        let overlay = ctx.overlay;
        for segment in &overlay.segments {
            self.render_segment(segment, ctx);
        }

        // Echoes sit under the labels; every other token above them.
        let split = overlay.tokens.partition_point(|token| token.z <= z::ECHO);
        let (under, over) = overlay.tokens.split_at(split);
        for token in under {
            self.render_token(token, ctx);
        }
        for label in &overlay.labels {
            self.render_label(label, ctx);
        }
        for token in over {
            self.render_token(token, ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Overlay;
    use courtboard_core::{Board, ItemKind, SceneCommand, SourceType};

    fn board() -> Board {
        let mut board = Board::default();
        board.set_container_rect(Rect::new(0.0, 0.0, 400.0, 800.0));
        board
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::new();
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_empty_scene() {
        let mut renderer = VelloRenderer::new();
        let overlay = Overlay::default();
        let ctx = RenderContext::new(&overlay, Rect::new(0.0, 0.0, 400.0, 800.0), Size::new(400.0, 800.0));
        assert!(renderer.build_scene(&ctx).is_ok());
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_items() {
        let mut renderer = VelloRenderer::new();
        let mut board = board();
        let player = board.drop_item(ItemKind::Player, Point::new(200.0, 600.0)).unwrap();
        board.drop_item(ItemKind::Marker, Point::new(100.0, 100.0)).unwrap();
        board.drop_item(ItemKind::Shuttle, Point::new(300.0, 300.0)).unwrap();
        assert!(board.apply(&SceneCommand::CreatePath {
            source_id: player,
            source_type: SourceType::Player,
            end: Point::new(50.0, 30.0),
        }));
        assert!(board.apply(&SceneCommand::CreateLine {
            start: Point::new(10.0, 10.0),
            end: Point::new(60.0, 40.0),
            style: Default::default(),
        }));

        let overlay = Overlay::for_board(&board);
        let ctx = RenderContext::new(&overlay, board.container(), Size::new(400.0, 800.0)).with_grid(GridStyle::Dots);
        renderer.build_scene(&ctx).unwrap();
        assert!(!renderer.scene().encoding().is_empty());

        let scene = renderer.take_scene();
        assert!(!scene.encoding().is_empty());
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_empty_container_fails() {
        let mut renderer = VelloRenderer::new();
        let overlay = Overlay::default();
        let ctx = RenderContext::new(&overlay, Rect::ZERO, Size::new(400.0, 800.0));
        assert!(renderer.build_scene(&ctx).is_err());
    }
}
