//! The board: a scene, the gesture machine and the view state that ties them
//! to a host surface.

use kurbo::{Point, Rect};

use crate::config::BoardConfig;
use crate::geometry::to_percent;
use crate::hit::{self, HitTarget, contains_inclusive};
use crate::input::{ClickTracker, Instant, PointerEvent};
use crate::interaction::{GestureContext, InteractionMachine, InteractionState, LongPress, LongPressToken, PathPreview};
use crate::metrics::Metrics;
use crate::scene::{
    EntityId, ItemKind, ItemPatch, LinePatch, LineStyle, PresetPlayer, Scene, SceneCommand,
};

/// A court diagram being edited.
#[derive(Debug, Clone)]
pub struct Board {
    scene: Scene,
    machine: InteractionMachine,
    clicks: ClickTracker,
    config: BoardConfig,
    locked: bool,
    line_style: LineStyle,
    /// Court interior in client coordinates.
    container: Rect,
    trash: Option<Rect>,
    metrics: Metrics,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    /// Create an empty board.
    pub fn new(config: BoardConfig) -> Self {
        Self::with_scene(Scene::new(), config)
    }

    /// Create a board around an existing scene.
    pub fn with_scene(scene: Scene, config: BoardConfig) -> Self {
        Self {
            scene,
            machine: InteractionMachine::new(&config),
            clicks: ClickTracker::new(&config.gesture),
            config,
            locked: false,
            line_style: LineStyle::default(),
            container: Rect::ZERO,
            trash: None,
            metrics: Metrics::default(),
        }
    }

    /// The diagram. Changes go through the board so the lock applies.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn trash_zone(&self) -> Option<Rect> {
        self.trash
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    pub fn interaction(&self) -> &InteractionState {
        self.machine.state()
    }

    pub fn line_preview(&self) -> Option<(Point, Point)> {
        self.machine.line_preview()
    }

    pub fn path_preview(&self) -> Option<PathPreview> {
        self.machine.path_preview()
    }

    pub fn pending_long_press(&self) -> Option<LongPress> {
        self.machine.pending_long_press()
    }

    /// Whether the host should route pointer events from outside the court
    /// here. True exactly while a gesture is in progress.
    pub fn wants_global_pointer_events(&self) -> bool {
        !self.machine.is_idle()
    }

    /// Lock or unlock editing. A gesture in progress is left alone; its
    /// release will commit nothing.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            log::debug!("Board {}", if locked { "locked" } else { "unlocked" });
        }
        self.locked = locked;
        if locked {
            self.clicks.reset();
        }
    }

    /// Update the court's client rectangle. Element sizes follow its width.
    pub fn set_container_rect(&mut self, rect: Rect) {
        self.container = rect;
        self.metrics = Metrics::for_width(rect.width());
    }

    pub fn set_trash_zone(&mut self, trash: Option<Rect>) {
        self.trash = trash;
    }

    /// Style used for lines drawn from now on.
    pub fn set_line_style(&mut self, style: LineStyle) {
        self.line_style = style;
    }

    /// Topmost target under a client point.
    pub fn hit_test(&self, client: Point) -> Option<HitTarget> {
        hit::hit_test(&self.scene, &self.metrics, self.container, client)
    }

    // --- Pointer events -------------------------------------------------

    /// Route a raw pointer event. Secondary buttons are ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> Vec<SceneCommand> {
        if !event.is_primary() {
            return Vec::new();
        }
        match event {
            PointerEvent::Down { position, .. } => self.pointer_down(position, now),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
        }
    }

    /// Press at a client point. A double click deletes what was pressed and
    /// starts no gesture.
    pub fn pointer_down(&mut self, client: Point, now: Instant) -> Vec<SceneCommand> {
        if self.locked {
            return Vec::new();
        }
        let Some(target) = self.hit_test(client) else {
            return Vec::new();
        };

        if self.clicks.register(now, client, target) {
            let commands = self.double_click(target);
            if !commands.is_empty() {
                self.machine.cancel();
                self.apply_all(&commands);
                return commands;
            }
        }

        let ctx = GestureContext {
            scene: &self.scene,
            container: self.container,
            trash: self.trash,
            locked: self.locked,
            line_style: self.line_style,
        };
        self.machine.pointer_down(target, client, now, &ctx);
        Vec::new()
    }

    pub fn pointer_move(&mut self, client: Point) -> Vec<SceneCommand> {
        self.dispatch(|machine, ctx| machine.pointer_move(client, ctx))
    }

    pub fn pointer_up(&mut self, client: Point) -> Vec<SceneCommand> {
        self.dispatch(|machine, ctx| machine.pointer_up(client, ctx))
    }

    /// Fire a due long press. Hosts without their own timers call this on
    /// every frame or tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.machine.poll(now, self.locked)
    }

    /// Fire the long press a host timer was scheduled for.
    pub fn long_press_elapsed(&mut self, token: LongPressToken) -> bool {
        self.machine.long_press_elapsed(token, self.locked)
    }

    /// Abandon any gesture in progress.
    pub fn cancel_gesture(&mut self) {
        self.machine.cancel();
    }

    fn dispatch(
        &mut self,
        step: impl FnOnce(&mut InteractionMachine, &GestureContext) -> Vec<SceneCommand>,
    ) -> Vec<SceneCommand> {
        let ctx = GestureContext {
            scene: &self.scene,
            container: self.container,
            trash: self.trash,
            locked: self.locked,
            line_style: self.line_style,
        };
        let commands = step(&mut self.machine, &ctx);
        self.apply_all(&commands);
        commands
    }

    fn double_click(&self, target: HitTarget) -> Vec<SceneCommand> {
        match target {
            HitTarget::Item(id) => vec![SceneCommand::DeleteItem(id)],
            HitTarget::PathEnd(id) => vec![SceneCommand::DeletePath(id)],
            HitTarget::LineLabel(id)
            | HitTarget::LineStart(id)
            | HitTarget::LineEnd(id)
            | HitTarget::LineBody(id) => vec![SceneCommand::DeleteLine(id)],
            HitTarget::Background => Vec::new(),
        }
    }

    // --- Commands -------------------------------------------------------

    /// Apply one command to the scene. Nothing changes while locked.
    pub fn apply(&mut self, command: &SceneCommand) -> bool {
        if self.locked {
            log::debug!("Board locked, ignoring {:?}", command);
            return false;
        }
        self.scene.apply(command, &self.config.limits)
    }

    fn apply_all(&mut self, commands: &[SceneCommand]) {
        for command in commands {
            self.apply(command);
        }
    }

    /// Whether a palette item of `kind` may be dropped now.
    pub fn can_drop(&self, kind: ItemKind) -> bool {
        !self.locked && self.scene.has_room_for(kind, &self.config.limits)
    }

    /// Drop a palette item at a client point inside the court.
    pub fn drop_item(&mut self, kind: ItemKind, client: Point) -> Option<EntityId> {
        if !self.can_drop(kind) || !contains_inclusive(self.container, client) {
            return None;
        }
        let raw = to_percent(client, self.container);
        let position = if kind == ItemKind::Shuttle {
            self.scene.resolve_magnetic_snap(raw, &self.config.snap).point
        } else {
            self.config.snap.grid().snap_point(raw)
        };
        self.scene.add_item(kind, position, &self.config.limits)
    }

    /// Replace the label of an item or line. Shuttles carry no label, and
    /// unchanged text is left alone.
    pub fn edit_label(&mut self, target: HitTarget, text: &str) -> bool {
        if self.locked {
            return false;
        }
        let command = match target {
            HitTarget::Item(id) => match self.scene.item(id) {
                Some(item) if item.kind != ItemKind::Shuttle && item.label.as_deref() != Some(text) => {
                    SceneCommand::UpdateItem {
                        id,
                        patch: ItemPatch::label(text),
                    }
                }
                _ => return false,
            },
            HitTarget::LineLabel(id)
            | HitTarget::LineStart(id)
            | HitTarget::LineEnd(id)
            | HitTarget::LineBody(id) => match self.scene.line(id) {
                Some(line) if line.label != text => SceneCommand::UpdateLine {
                    id,
                    patch: LinePatch::label(text),
                },
                _ => return false,
            },
            HitTarget::PathEnd(_) | HitTarget::Background => return false,
        };
        self.apply(&command)
    }

    // --- Bulk operations ------------------------------------------------

    /// Remove everything from the court.
    pub fn clear(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.machine.cancel();
        self.scene.clear();
        true
    }

    /// Remove every player along with their paths.
    pub fn clear_players(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.machine.cancel();
        self.scene.clear_players();
        true
    }

    pub fn clear_markers(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.machine.cancel();
        self.scene.clear_markers();
        true
    }

    /// Replace the court with a preset formation.
    pub fn apply_preset(&mut self, players: &[PresetPlayer]) -> bool {
        if self.locked {
            return false;
        }
        self.machine.cancel();
        self.scene.apply_preset(players, &self.config.snap);
        true
    }
}
