//! The pointer-driven interaction state machine.
//!
//! Pointer events come in with client coordinates; scene commands come out.
//! The machine only reads the scene it is handed, so hosts stay in charge of
//! applying (or vetoing) every mutation.

use kurbo::{Point, Rect, Vec2};

use super::long_press::{LongPress, LongPressToken, TokenSource};
use super::state::InteractionState;
use crate::config::{BoardConfig, GestureConfig, SnapConfig};
use crate::geometry::{Position, to_percent, to_percent_delta};
use crate::hit::{HitTarget, contains_inclusive};
use crate::input::Instant;
use crate::scene::{
    EntityId, ItemKind, ItemPosition, LinePatch, LineStyle, Scene, SceneCommand, SourceType,
};

/// Everything the machine reads from its surroundings for one event.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub scene: &'a Scene,
    /// Court interior in client coordinates.
    pub container: Rect,
    /// Trash drop zone in client coordinates.
    pub trash: Option<Rect>,
    /// While set, every event is ignored and releases only reset the machine.
    pub locked: bool,
    /// Style for newly drawn lines.
    pub line_style: LineStyle,
}

impl<'a> GestureContext<'a> {
    pub fn new(scene: &'a Scene, container: Rect) -> Self {
        Self {
            scene,
            container,
            trash: None,
            locked: false,
            line_style: LineStyle::default(),
        }
    }

    pub fn with_trash(mut self, trash: Option<Rect>) -> Self {
        self.trash = trash;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_line_style(mut self, style: LineStyle) -> Self {
        self.line_style = style;
        self
    }

    fn percent(&self, client: Point) -> Position {
        to_percent(client, self.container)
    }

    fn in_trash(&self, client: Point) -> bool {
        self.trash.is_some_and(|zone| contains_inclusive(zone, client))
    }
}

/// A path being created, for live previews.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPreview {
    pub source_id: EntityId,
    pub source_type: SourceType,
    pub end: Position,
}

/// Turns pointer events into scene commands.
#[derive(Debug, Clone)]
pub struct InteractionMachine {
    state: InteractionState,
    tokens: TokenSource,
    gesture: GestureConfig,
    snap: SnapConfig,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

impl InteractionMachine {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            tokens: TokenSource::default(),
            gesture: config.gesture,
            snap: config.snap,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// The pending long press, while one is armed.
    pub fn pending_long_press(&self) -> Option<LongPress> {
        match self.state {
            InteractionState::AwaitingLongPress { timer, .. } => Some(timer),
            _ => None,
        }
    }

    /// The segment being drawn.
    pub fn line_preview(&self) -> Option<(Position, Position)> {
        match self.state {
            InteractionState::DrawLine { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// The path being created.
    pub fn path_preview(&self) -> Option<PathPreview> {
        match self.state {
            InteractionState::CreatingPath {
                source_id,
                source_type,
                current_end,
            } => Some(PathPreview {
                source_id,
                source_type,
                end: current_end,
            }),
            _ => None,
        }
    }

    /// Abandon the current gesture without committing anything.
    pub fn cancel(&mut self) {
        self.transition(InteractionState::Idle);
    }

    fn transition(&mut self, next: InteractionState) {
        if self.state.name() != next.name() {
            log::debug!("Interaction {} -> {}", self.state.name(), next.name());
        }
        self.state = next;
    }

    /// Start a gesture on whatever was pressed. Returns whether one started.
    ///
    /// A press while another gesture is active abandons that gesture.
    pub fn pointer_down(&mut self, target: HitTarget, client: Point, now: Instant, ctx: &GestureContext) -> bool {
        if ctx.locked {
            return false;
        }
        let scene = ctx.scene;

        let next = match target {
            HitTarget::Item(id) => {
                let Some(item) = scene.item(id) else {
                    return false;
                };
                if item.kind == ItemKind::Player {
                    InteractionState::AwaitingLongPress {
                        source_id: id,
                        source_type: SourceType::Player,
                        origin: client,
                        press_position: ctx.percent(client),
                        timer: self.tokens.start(now, self.gesture.long_press_duration()),
                        attached: scene.attached_shuttles(item.position, &self.snap),
                    }
                } else {
                    InteractionState::DragItem {
                        id,
                        kind: item.kind,
                        initial_position: item.position,
                        initial_pointer: client,
                        attached: Vec::new(),
                    }
                }
            }
            HitTarget::PathEnd(id) => {
                let Some(path) = scene.path(id) else {
                    return false;
                };
                InteractionState::AwaitingLongPress {
                    source_id: id,
                    source_type: SourceType::Path,
                    origin: client,
                    press_position: ctx.percent(client),
                    timer: self.tokens.start(now, self.gesture.long_press_duration()),
                    attached: scene.attached_shuttles(path.end_position, &self.snap),
                }
            }
            HitTarget::LineBody(id) => {
                let Some(line) = scene.line(id) else {
                    return false;
                };
                InteractionState::MoveLine {
                    id,
                    start_ref: line.start,
                    end_ref: line.end,
                    pointer_ref: ctx.percent(client),
                }
            }
            HitTarget::LineStart(id) if scene.line(id).is_some() => InteractionState::ResizeLineStart { id },
            HitTarget::LineEnd(id) if scene.line(id).is_some() => InteractionState::ResizeLineEnd { id },
            HitTarget::Background => {
                let start = ctx.percent(client);
                InteractionState::DrawLine { start, end: start }
            }
            HitTarget::LineStart(_) | HitTarget::LineEnd(_) | HitTarget::LineLabel(_) => return false,
        };

        self.transition(next);
        true
    }

    /// Follow the pointer. Returns the commands the move produces.
    pub fn pointer_move(&mut self, client: Point, ctx: &GestureContext) -> Vec<SceneCommand> {
        if ctx.locked {
            return Vec::new();
        }
        if matches!(self.state, InteractionState::AwaitingLongPress { .. }) {
            self.resolve_drag(client, ctx);
            return Vec::new();
        }
        let pos = ctx.percent(client);
        let grid = self.snap.grid();

        match &mut self.state {
            InteractionState::Idle | InteractionState::AwaitingLongPress { .. } => Vec::new(),
            InteractionState::CreatingPath { current_end, .. } => {
                *current_end = pos;
                Vec::new()
            }
            InteractionState::DrawLine { end, .. } => {
                *end = pos;
                Vec::new()
            }
            InteractionState::DragPathEnd {
                id,
                initial_end,
                initial_pointer,
                attached,
            } => {
                let delta = to_percent_delta(client - *initial_pointer, ctx.container);
                let end = grid.snap_point(*initial_end + delta);
                let mut commands = vec![SceneCommand::UpdatePath { id: *id, end }];
                if !attached.is_empty() {
                    commands.push(SceneCommand::MoveItems(shifted(attached, end - *initial_end)));
                }
                commands
            }
            InteractionState::DragItem {
                id,
                kind,
                initial_position,
                initial_pointer,
                attached,
            } => {
                let delta = to_percent_delta(client - *initial_pointer, ctx.container);
                let raw = *initial_position + delta;
                let snapped = grid.snap_point(raw);

                if *kind == ItemKind::Player && !attached.is_empty() {
                    let mut moves = vec![ItemPosition {
                        id: *id,
                        position: snapped,
                    }];
                    moves.extend(shifted(attached, snapped - *initial_position));
                    vec![SceneCommand::MoveItems(moves)]
                } else {
                    let position = if *kind == ItemKind::Shuttle {
                        ctx.scene.resolve_magnetic_snap(raw, &self.snap).point
                    } else {
                        snapped
                    };
                    vec![SceneCommand::MoveItem { id: *id, position }]
                }
            }
            InteractionState::MoveLine {
                id,
                start_ref,
                end_ref,
                pointer_ref,
            } => {
                let delta = translation_within_court(*start_ref, *end_ref, pos - *pointer_ref);
                vec![SceneCommand::UpdateLine {
                    id: *id,
                    patch: LinePatch::endpoints(*start_ref + delta, *end_ref + delta),
                }]
            }
            InteractionState::ResizeLineStart { id } => vec![SceneCommand::UpdateLine {
                id: *id,
                patch: LinePatch::start(pos),
            }],
            InteractionState::ResizeLineEnd { id } => vec![SceneCommand::UpdateLine {
                id: *id,
                patch: LinePatch::end(pos),
            }],
        }
    }

    /// Turn a pending long press into a drag once the pointer travels far
    /// enough. The crossing move itself only changes state.
    fn resolve_drag(&mut self, client: Point, ctx: &GestureContext) {
        let InteractionState::AwaitingLongPress {
            source_id,
            source_type,
            origin,
            attached,
            ..
        } = &mut self.state
        else {
            return;
        };
        if client.distance(*origin) <= self.gesture.long_press_slop_px {
            return;
        }

        let (id, initial_pointer, attached) = (*source_id, *origin, std::mem::take(attached));
        let next = match source_type {
            SourceType::Player => ctx.scene.item(id).map(|item| InteractionState::DragItem {
                id,
                kind: item.kind,
                initial_position: item.position,
                initial_pointer,
                attached,
            }),
            SourceType::Path => ctx.scene.path(id).map(|path| InteractionState::DragPathEnd {
                id,
                initial_end: path.end_position,
                initial_pointer,
                attached,
            }),
        };
        // The source vanished mid-press; nothing left to drag.
        self.transition(next.unwrap_or_default());
    }

    /// Finish the gesture. Always returns the machine to idle.
    pub fn pointer_up(&mut self, client: Point, ctx: &GestureContext) -> Vec<SceneCommand> {
        let finished = std::mem::take(&mut self.state);
        if !finished.is_idle() {
            log::debug!("Interaction {} -> Idle", finished.name());
        }
        if ctx.locked {
            return Vec::new();
        }

        match finished {
            InteractionState::DragItem { id, .. } if ctx.in_trash(client) => {
                vec![SceneCommand::DeleteItem(id)]
            }
            InteractionState::MoveLine { id, .. } if ctx.in_trash(client) => {
                vec![SceneCommand::DeleteLine(id)]
            }
            InteractionState::DragPathEnd { id, .. } if ctx.in_trash(client) => {
                vec![SceneCommand::DeletePath(id)]
            }
            InteractionState::DrawLine { start, end } => {
                if start.distance(end) > self.gesture.min_line_length {
                    vec![SceneCommand::CreateLine {
                        start,
                        end,
                        style: ctx.line_style,
                    }]
                } else {
                    Vec::new()
                }
            }
            InteractionState::CreatingPath {
                source_id,
                source_type,
                current_end,
            } => vec![SceneCommand::CreatePath {
                source_id,
                source_type,
                end: current_end,
            }],
            _ => Vec::new(),
        }
    }

    /// Fire the long press if its deadline has passed. Returns whether it fired.
    pub fn poll(&mut self, now: Instant, locked: bool) -> bool {
        match self.pending_long_press() {
            Some(timer) if timer.is_due(now) => self.long_press_elapsed(timer.token, locked),
            _ => false,
        }
    }

    /// Fire the long press identified by `token`. Stale tokens, and any token
    /// while locked, are ignored. Returns whether it fired.
    pub fn long_press_elapsed(&mut self, token: LongPressToken, locked: bool) -> bool {
        if locked {
            return false;
        }
        let InteractionState::AwaitingLongPress {
            source_id,
            source_type,
            press_position,
            timer,
            ..
        } = self.state
        else {
            return false;
        };
        if timer.token != token {
            log::trace!("Ignoring stale long press {:?}", token);
            return false;
        }

        self.transition(InteractionState::CreatingPath {
            source_id,
            source_type,
            current_end: press_position,
        });
        true
    }
}

/// Limit `delta` so both endpoints stay on the court and the line keeps its shape.
fn translation_within_court(start: Position, end: Position, delta: Vec2) -> Vec2 {
    let axis = |a: f64, b: f64, d: f64| d.max(-a.min(b)).min(100.0 - a.max(b));
    Vec2::new(axis(start.x, end.x, delta.x), axis(start.y, end.y, delta.y))
}

fn shifted(origins: &[ItemPosition], delta: Vec2) -> Vec<ItemPosition> {
    origins
        .iter()
        .map(|origin| ItemPosition {
            id: origin.id,
            position: origin.position + delta,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemLimits;
    use crate::geometry::Grid;
    use std::time::Duration;

    const EPS: f64 = 1e-9;

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 800.0)
    }

    fn trash() -> Rect {
        Rect::new(360.0, 760.0, 400.0, 800.0)
    }

    /// Client position of a court percentage in the test container.
    fn px(x: f64, y: f64) -> Point {
        Point::new(x * 4.0, y * 8.0)
    }

    fn assert_close(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS, "{a:?} != {b:?}");
    }

    struct Fixture {
        scene: Scene,
        machine: InteractionMachine,
        now: Instant,
        locked: bool,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                machine: InteractionMachine::default(),
                now: Instant::now(),
                locked: false,
            }
        }

        fn add(&mut self, kind: ItemKind, x: f64, y: f64) -> EntityId {
            self.scene
                .add_item(kind, Point::new(x, y), &ItemLimits::default())
                .unwrap()
        }

        fn down(&mut self, target: HitTarget, client: Point) -> bool {
            let ctx = GestureContext::new(&self.scene, container()).with_locked(self.locked);
            self.machine.pointer_down(target, client, self.now, &ctx)
        }

        fn drag(&mut self, client: Point) -> Vec<SceneCommand> {
            let ctx = GestureContext::new(&self.scene, container())
                .with_trash(Some(trash()))
                .with_locked(self.locked);
            self.machine.pointer_move(client, &ctx)
        }

        fn up(&mut self, client: Point) -> Vec<SceneCommand> {
            let ctx = GestureContext::new(&self.scene, container())
                .with_trash(Some(trash()))
                .with_locked(self.locked);
            self.machine.pointer_up(client, &ctx)
        }
    }

    #[test]
    fn test_marker_drags_immediately() {
        let mut f = Fixture::new();
        let marker = f.add(ItemKind::Marker, 50.0, 50.0);
        assert!(f.down(HitTarget::Item(marker), px(50.0, 50.0)));
        assert!(matches!(f.machine.state(), InteractionState::DragItem { .. }));
        assert!(f.machine.pending_long_press().is_none());

        let commands = f.drag(px(60.0, 50.0));
        let expected = Grid::default().snap_point(Point::new(60.0, 50.0));
        match commands.as_slice() {
            [SceneCommand::MoveItem { id, position }] => {
                assert_eq!(*id, marker);
                assert_close(*position, expected);
            }
            other => panic!("unexpected commands {other:?}"),
        }

        assert!(f.up(px(60.0, 50.0)).is_empty());
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_drag_uses_cumulative_delta() {
        let mut f = Fixture::new();
        let marker = f.add(ItemKind::Marker, 50.0, 50.0);
        f.down(HitTarget::Item(marker), px(50.0, 50.0));
        f.drag(px(55.3, 50.0));
        f.drag(px(57.1, 50.0));
        let commands = f.drag(px(60.0, 50.0));
        let expected = Grid::default().snap_point(Point::new(60.0, 50.0));
        match commands.as_slice() {
            [SceneCommand::MoveItem { position, .. }] => assert_close(*position, expected),
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_long_press_creates_path() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 50.0, 75.0);
        let start = f.now;
        f.down(HitTarget::Item(player), px(50.0, 75.0));
        assert!(matches!(f.machine.state(), InteractionState::AwaitingLongPress { .. }));

        // Jitter under the threshold keeps waiting.
        assert!(f.drag(px(50.0, 75.0) + Vec2::new(6.0, 6.0)).is_empty());
        assert!(matches!(f.machine.state(), InteractionState::AwaitingLongPress { .. }));
        assert!(!f.machine.poll(start + Duration::from_millis(999), false));
        assert!(f.machine.poll(start + Duration::from_millis(1000), false));

        let preview = f.machine.path_preview().unwrap();
        assert_eq!(preview.source_id, player);
        assert_eq!(preview.source_type, SourceType::Player);
        assert_close(preview.end, Point::new(50.0, 75.0));

        assert!(f.drag(px(50.0, 37.5)).is_empty());
        assert_close(f.machine.path_preview().unwrap().end, Point::new(50.0, 37.5));

        let commands = f.up(px(50.0, 37.5));
        assert_eq!(
            commands,
            vec![SceneCommand::CreatePath {
                source_id: player,
                source_type: SourceType::Player,
                end: Point::new(50.0, 37.5),
            }]
        );
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_movement_before_timer_drags_instead() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 50.0, 75.0);
        let start = f.now;
        f.down(HitTarget::Item(player), px(50.0, 75.0));

        // Crossing the threshold only changes state.
        assert!(f.drag(px(50.0, 75.0) + Vec2::new(11.0, 0.0)).is_empty());
        assert!(matches!(f.machine.state(), InteractionState::DragItem { id, .. } if *id == player));

        // The timer can no longer fire.
        assert!(!f.machine.poll(start + Duration::from_secs(2), false));
        assert!(matches!(f.machine.state(), InteractionState::DragItem { .. }));

        let commands = f.drag(px(60.0, 75.0));
        assert!(matches!(commands.as_slice(), [SceneCommand::MoveItem { id, .. }] if *id == player));
        assert!(f.up(px(60.0, 75.0)).is_empty());
    }

    #[test]
    fn test_stale_token_ignored() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 50.0, 75.0);
        f.down(HitTarget::Item(player), px(50.0, 75.0));
        let first = f.machine.pending_long_press().unwrap().token;
        f.up(px(50.0, 75.0));
        assert!(f.machine.pending_long_press().is_none());
        assert!(!f.machine.long_press_elapsed(first, false));
        assert!(f.machine.is_idle());

        f.down(HitTarget::Item(player), px(50.0, 75.0));
        let second = f.machine.pending_long_press().unwrap().token;
        assert_ne!(first, second);
        assert!(!f.machine.long_press_elapsed(first, false));
        assert!(f.machine.long_press_elapsed(second, false));
        assert!(f.machine.path_preview().is_some());
    }

    #[test]
    fn test_player_carries_attached_shuttle() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 50.0, 50.0);
        let shuttle = f.add(ItemKind::Shuttle, 54.0, 48.5);
        f.down(HitTarget::Item(player), px(50.0, 50.0));
        assert_eq!(f.machine.state().attached().len(), 1);

        f.drag(px(55.0, 50.0));
        let commands = f.drag(px(60.0, 55.0));
        let [SceneCommand::MoveItems(moves)] = commands.as_slice() else {
            panic!("expected a batch move, got {commands:?}");
        };
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].id, player);
        assert_eq!(moves[1].id, shuttle);

        let player_delta = moves[0].position - Point::new(50.0, 50.0);
        let shuttle_delta = moves[1].position - Point::new(54.0, 48.5);
        assert!((player_delta - shuttle_delta).hypot() < EPS);
        assert_close(moves[0].position, Grid::default().snap_point(Point::new(60.0, 55.0)));
    }

    #[test]
    fn test_lone_shuttle_leaves_player() {
        let mut f = Fixture::new();
        let _player = f.add(ItemKind::Player, 20.0, 20.0);
        let shuttle = f.add(ItemKind::Shuttle, 80.0, 80.0);
        f.down(HitTarget::Item(shuttle), px(80.0, 80.0));
        let commands = f.drag(px(70.0, 70.0));
        assert!(matches!(commands.as_slice(), [SceneCommand::MoveItem { id, .. }] if *id == shuttle));
    }

    #[test]
    fn test_dragged_shuttle_snaps_to_hand() {
        let mut f = Fixture::new();
        let _player = f.add(ItemKind::Player, 50.0, 50.0);
        let shuttle = f.add(ItemKind::Shuttle, 80.0, 80.0);
        f.down(HitTarget::Item(shuttle), px(80.0, 80.0));
        // The raw target (45, 50) is inside the left hand's magnet radius.
        let commands = f.drag(px(45.0, 50.0));
        match commands.as_slice() {
            [SceneCommand::MoveItem { id, position }] => {
                assert_eq!(*id, shuttle);
                assert_close(*position, Point::new(46.0, 48.5));
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_drag_path_end_moves_held_shuttle() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 20.0, 80.0);
        let path = f.scene.add_path(player, SourceType::Player, Point::new(50.0, 50.0)).unwrap();
        let shuttle = f.add(ItemKind::Shuttle, 54.0, 48.5);

        f.down(HitTarget::PathEnd(path), px(50.0, 50.0));
        assert!(f.drag(px(50.0, 45.0)).is_empty());
        assert!(matches!(f.machine.state(), InteractionState::DragPathEnd { .. }));

        let commands = f.drag(px(50.0, 40.0));
        let end = Grid::default().snap_point(Point::new(50.0, 40.0));
        match commands.as_slice() {
            [SceneCommand::UpdatePath { id, end: new_end }, SceneCommand::MoveItems(moves)] => {
                assert_eq!(*id, path);
                assert_close(*new_end, end);
                assert_eq!(moves[0].id, shuttle);
                assert_close(moves[0].position, Point::new(54.0, 48.5) + (end - Point::new(50.0, 50.0)));
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_long_press_from_path_end() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 20.0, 80.0);
        let path = f.scene.add_path(player, SourceType::Player, Point::new(50.0, 50.0)).unwrap();
        f.down(HitTarget::PathEnd(path), px(50.0, 50.0));
        let token = f.machine.pending_long_press().unwrap().token;
        assert!(f.machine.long_press_elapsed(token, false));
        f.drag(px(50.0, 25.0));
        let commands = f.up(px(50.0, 25.0));
        assert!(matches!(
            commands.as_slice(),
            [SceneCommand::CreatePath { source_id, source_type: SourceType::Path, .. }] if *source_id == path
        ));
    }

    #[test]
    fn test_draw_line_threshold() {
        let mut f = Fixture::new();
        f.down(HitTarget::Background, px(12.5, 12.5));
        f.drag(px(12.5, 12.5) + Vec2::new(2.0, 2.0));
        assert!(f.machine.line_preview().is_some());
        assert!(f.up(px(12.5, 12.5) + Vec2::new(2.0, 2.0)).is_empty());
        assert!(f.machine.line_preview().is_none());

        f.down(HitTarget::Background, px(12.5, 12.5));
        f.drag(px(50.0, 50.0));
        let commands = f.up(px(50.0, 50.0));
        assert_eq!(
            commands,
            vec![SceneCommand::CreateLine {
                start: Point::new(12.5, 12.5),
                end: Point::new(50.0, 50.0),
                style: LineStyle::default(),
            }]
        );
    }

    #[test]
    fn test_draw_line_length_boundary() {
        let mut f = Fixture::new();
        let start = Point::new(0.0, 100.0);

        // Four pixels across a 400 px court is exactly one unit: too short.
        let one_unit = Point::new(4.0, 100.0);
        assert_eq!(to_percent(one_unit, container()).x, 1.0);
        f.down(HitTarget::Background, start);
        f.drag(one_unit);
        assert!(f.up(one_unit).is_empty());
        assert!(f.machine.is_idle());

        let past_one_unit = Point::new(5.0, 100.0);
        f.down(HitTarget::Background, start);
        f.drag(past_one_unit);
        assert_eq!(
            f.up(past_one_unit),
            vec![SceneCommand::CreateLine {
                start: Point::new(0.0, 12.5),
                end: Point::new(1.25, 12.5),
                style: LineStyle::default(),
            }]
        );
    }

    #[test]
    fn test_line_style_is_captured() {
        let mut f = Fixture::new();
        let style = LineStyle {
            color: crate::scene::LineColor::Red,
            line_type: crate::scene::LineType::Dashed,
        };
        f.down(HitTarget::Background, px(12.5, 12.5));
        f.drag(px(50.0, 50.0));
        let ctx = GestureContext::new(&f.scene, container()).with_line_style(style);
        let commands = f.machine.pointer_up(px(50.0, 50.0), &ctx);
        assert!(matches!(commands.as_slice(), [SceneCommand::CreateLine { style: s, .. }] if *s == style));
    }

    #[test]
    fn test_move_and_resize_line() {
        let mut f = Fixture::new();
        let line = f.scene.add_line(Point::new(12.5, 12.5), Point::new(37.5, 12.5), LineStyle::default());

        f.down(HitTarget::LineBody(line), px(25.0, 12.5));
        assert_eq!(
            f.drag(px(37.5, 25.0)),
            vec![SceneCommand::UpdateLine {
                id: line,
                patch: LinePatch::endpoints(Point::new(25.0, 25.0), Point::new(50.0, 25.0)),
            }]
        );
        f.up(px(37.5, 25.0));

        f.down(HitTarget::LineEnd(line), px(37.5, 12.5));
        assert_eq!(
            f.drag(px(50.0, 50.0)),
            vec![SceneCommand::UpdateLine {
                id: line,
                patch: LinePatch::end(Point::new(50.0, 50.0)),
            }]
        );
        f.up(px(50.0, 50.0));

        f.down(HitTarget::LineStart(line), px(12.5, 12.5));
        assert_eq!(
            f.drag(px(6.25, 6.25)),
            vec![SceneCommand::UpdateLine {
                id: line,
                patch: LinePatch::start(Point::new(6.25, 6.25)),
            }]
        );
    }

    #[test]
    fn test_moved_line_stops_at_court_edge() {
        let mut f = Fixture::new();
        let line = f.scene.add_line(Point::new(12.5, 12.5), Point::new(37.5, 12.5), LineStyle::default());

        f.down(HitTarget::LineBody(line), px(18.75, 12.5));
        let expected = vec![SceneCommand::UpdateLine {
            id: line,
            patch: LinePatch::endpoints(Point::new(0.0, 12.5), Point::new(25.0, 12.5)),
        }];
        assert_eq!(f.drag(px(0.0, 12.5)), expected);

        // The other axis still follows the pointer.
        assert_eq!(
            f.drag(px(0.0, 25.0)),
            vec![SceneCommand::UpdateLine {
                id: line,
                patch: LinePatch::endpoints(Point::new(0.0, 25.0), Point::new(25.0, 25.0)),
            }]
        );
    }

    #[test]
    fn test_translation_within_court() {
        let start = Point::new(90.0, 50.0);
        let end = Point::new(95.0, 60.0);
        assert_eq!(translation_within_court(start, end, Vec2::new(20.0, -10.0)), Vec2::new(5.0, -10.0));
        assert_eq!(translation_within_court(start, end, Vec2::new(-100.0, 50.0)), Vec2::new(-90.0, 40.0));
    }

    #[test]
    fn test_label_press_starts_nothing() {
        let mut f = Fixture::new();
        let line = f.scene.add_line(Point::new(12.5, 12.5), Point::new(37.5, 12.5), LineStyle::default());
        assert!(!f.down(HitTarget::LineLabel(line), px(25.0, 12.5)));
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_trash_drop_deletes() {
        let mut f = Fixture::new();
        let bin = Point::new(380.0, 780.0);

        let marker = f.add(ItemKind::Marker, 50.0, 50.0);
        f.down(HitTarget::Item(marker), px(50.0, 50.0));
        f.drag(bin);
        assert_eq!(f.up(bin), vec![SceneCommand::DeleteItem(marker)]);

        let line = f.scene.add_line(Point::new(12.5, 12.5), Point::new(37.5, 12.5), LineStyle::default());
        f.down(HitTarget::LineBody(line), px(25.0, 12.5));
        f.drag(bin);
        assert_eq!(f.up(bin), vec![SceneCommand::DeleteLine(line)]);

        let player = f.add(ItemKind::Player, 20.0, 80.0);
        let path = f.scene.add_path(player, SourceType::Player, Point::new(50.0, 50.0)).unwrap();
        f.down(HitTarget::PathEnd(path), px(50.0, 50.0));
        f.drag(bin);
        f.drag(bin);
        assert_eq!(f.up(bin), vec![SceneCommand::DeletePath(path)]);
    }

    #[test]
    fn test_trash_edge_is_inclusive() {
        let mut f = Fixture::new();
        let marker = f.add(ItemKind::Marker, 50.0, 50.0);
        f.down(HitTarget::Item(marker), px(50.0, 50.0));
        let edge = Point::new(360.0, 760.0);
        f.drag(edge);
        assert_eq!(f.up(edge), vec![SceneCommand::DeleteItem(marker)]);
    }

    #[test]
    fn test_locked_press_ignored() {
        let mut f = Fixture::new();
        let marker = f.add(ItemKind::Marker, 50.0, 50.0);
        f.locked = true;
        assert!(!f.down(HitTarget::Item(marker), px(50.0, 50.0)));
        assert!(!f.down(HitTarget::Background, px(12.5, 12.5)));
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_lock_mid_gesture_commits_nothing() {
        let mut f = Fixture::new();
        f.down(HitTarget::Background, px(12.5, 12.5));
        f.drag(px(50.0, 50.0));

        f.locked = true;
        assert!(f.drag(px(75.0, 75.0)).is_empty());
        assert_eq!(f.machine.line_preview(), Some((Point::new(12.5, 12.5), Point::new(50.0, 50.0))));
        assert!(f.up(px(75.0, 75.0)).is_empty());
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_long_press_suppressed_while_locked() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 50.0, 75.0);
        f.down(HitTarget::Item(player), px(50.0, 75.0));
        let token = f.machine.pending_long_press().unwrap().token;
        assert!(!f.machine.poll(f.now + Duration::from_secs(2), true));
        assert!(!f.machine.long_press_elapsed(token, true));
        assert!(matches!(f.machine.state(), InteractionState::AwaitingLongPress { .. }));

        f.locked = true;
        assert!(f.up(px(50.0, 75.0)).is_empty());
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_new_press_abandons_gesture() {
        let mut f = Fixture::new();
        let marker = f.add(ItemKind::Marker, 50.0, 50.0);
        f.down(HitTarget::Background, px(12.5, 12.5));
        f.drag(px(50.0, 50.0));
        f.down(HitTarget::Item(marker), px(50.0, 50.0));
        assert!(f.machine.line_preview().is_none());
        assert!(f.up(px(50.0, 50.0)).is_empty());
    }

    #[test]
    fn test_press_on_missing_entity() {
        let mut f = Fixture::new();
        let ghost = uuid::Uuid::new_v4();
        assert!(!f.down(HitTarget::Item(ghost), px(50.0, 50.0)));
        assert!(!f.down(HitTarget::LineStart(ghost), px(50.0, 50.0)));
        assert!(!f.down(HitTarget::PathEnd(ghost), px(50.0, 50.0)));
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_vanished_source_returns_to_idle() {
        let mut f = Fixture::new();
        let player = f.add(ItemKind::Player, 50.0, 75.0);
        f.down(HitTarget::Item(player), px(50.0, 75.0));
        f.scene.delete_item(player);
        assert!(f.drag(px(75.0, 75.0)).is_empty());
        assert!(f.machine.is_idle());
    }

    #[test]
    fn test_cancel() {
        let mut f = Fixture::new();
        f.down(HitTarget::Background, px(12.5, 12.5));
        f.machine.cancel();
        assert!(f.machine.is_idle());
    }
}
