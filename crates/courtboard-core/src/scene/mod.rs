//! The scene: every item, line and path on the court.
//!
//! The scene is plain data plus reducer-style operations. Each mutation is a
//! total function of the current scene and its arguments: unknown ids,
//! capacity limits and dangling sources are no-ops, never errors. Deletes
//! cascade through the path forest inside a single call, so no intermediate
//! state with orphaned paths is ever observable.

mod arena;
mod item;
mod line;
mod path;

pub use item::{Item, ItemKind, ItemPatch, ItemPosition, PlayerColor};
pub use line::{Line, LineColor, LinePatch, LineStyle, LineType};
pub use path::{Path, PathMeta, SourceType};

use arena::Arena;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ItemLimits, SnapConfig};
use crate::geometry::{self, Position, SnapResult, clamp_position};

/// Identifier shared by items, lines and paths.
pub type EntityId = Uuid;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A mutation intent emitted by the interaction layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneCommand {
    CreateItem { kind: ItemKind, position: Position },
    MoveItem { id: EntityId, position: Position },
    MoveItems(Vec<ItemPosition>),
    UpdateItem { id: EntityId, patch: ItemPatch },
    DeleteItem(EntityId),
    CreateLine { start: Position, end: Position, style: LineStyle },
    UpdateLine { id: EntityId, patch: LinePatch },
    DeleteLine(EntityId),
    CreatePath { source_id: EntityId, source_type: SourceType, end: Position },
    UpdatePath { id: EntityId, end: Position },
    DeletePath(EntityId),
}

/// One player of a preset formation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetPlayer {
    pub label: String,
    pub color: PlayerColor,
    pub position: Position,
    /// Place the shuttle in this player's right hand.
    #[serde(default)]
    pub with_shuttle: bool,
}

/// Items, lines and paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    items: Arena<Item>,
    #[serde(default)]
    lines: Arena<Line>,
    #[serde(default)]
    paths: Arena<Path>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries -------------------------------------------------------

    /// Items in creation order (back to front).
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &Item> + '_ {
        self.items.iter()
    }

    /// Lines in creation order.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &Line> + '_ {
        self.lines.iter()
    }

    /// Paths in creation order.
    pub fn paths(&self) -> impl DoubleEndedIterator<Item = &Path> + '_ {
        self.paths.iter()
    }

    pub fn item(&self, id: EntityId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn line(&self, id: EntityId) -> Option<&Line> {
        self.lines.get(id)
    }

    pub fn path(&self, id: EntityId) -> Option<&Path> {
        self.paths.get(id)
    }

    /// Number of items of a kind.
    pub fn count(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.lines.is_empty() && self.paths.is_empty()
    }

    /// Whether another item of `kind` fits under the limits.
    pub fn has_room_for(&self, kind: ItemKind, limits: &ItemLimits) -> bool {
        self.count(kind) < limits.max_for(kind)
    }

    /// Lowest positive integer not used by an item of `kind`.
    fn next_slot(&self, kind: ItemKind) -> usize {
        let used: HashSet<usize> = self
            .items
            .iter()
            .filter(|item| item.kind == kind)
            .filter_map(Item::label_number)
            .collect();
        (1..).find(|n| !used.contains(n)).unwrap_or(1)
    }

    /// Label the next item of `kind` would get: "P<slot>" for players and
    /// "<n>" for markers, both the lowest free number. Shuttles are unlabeled.
    pub fn next_label(&self, kind: ItemKind) -> Option<String> {
        match kind {
            ItemKind::Player => Some(format!("P{}", self.next_slot(kind))),
            ItemKind::Marker => Some(self.next_slot(kind).to_string()),
            ItemKind::Shuttle => None,
        }
    }

    /// Color of the next player slot, for palette previews. Once every
    /// colored slot is taken this stays on the last one.
    pub fn next_player_color(&self) -> PlayerColor {
        let slot = self.next_slot(ItemKind::Player).clamp(1, PlayerColor::SLOTS.len());
        PlayerColor::for_slot(slot)
    }

    /// Label for the next line: one past the highest numeric line label.
    pub fn next_line_label(&self) -> String {
        let max = self
            .lines
            .iter()
            .filter_map(|line| line.label.trim().parse::<u128>().ok())
            .max();
        max.map_or(1, |n| n.saturating_add(1)).to_string()
    }

    /// Path ids grouped by source id, in path order.
    fn children_by_source(&self, chained_only: bool) -> HashMap<EntityId, Vec<EntityId>> {
        let mut children: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        for path in self.paths.iter() {
            if chained_only && path.source_type != SourceType::Path {
                continue;
            }
            children.entry(path.source_id).or_default().push(path.id);
        }
        children
    }

    /// Depth and owning player of every path reachable from an existing player.
    ///
    /// Paths whose chain does not lead back to a player are left out.
    pub fn path_metadata(&self) -> HashMap<EntityId, PathMeta> {
        let children = self.children_by_source(true);
        let mut meta = HashMap::new();

        for root in self.paths.iter().filter(|path| path.is_root()) {
            let owned_by_player = self.items.get(root.source_id).is_some_and(Item::is_player);
            if !owned_by_player {
                continue;
            }
            let mut stack = vec![(root.id, 1)];
            while let Some((id, depth)) = stack.pop() {
                if meta.contains_key(&id) {
                    continue;
                }
                meta.insert(
                    id,
                    PathMeta {
                        depth,
                        root_player_id: root.source_id,
                    },
                );
                if let Some(kids) = children.get(&id) {
                    stack.extend(kids.iter().rev().map(|&kid| (kid, depth + 1)));
                }
            }
        }
        meta
    }

    /// Every path transitively sourced from `id`, parents before children.
    /// `id` itself is not included.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let children = self.children_by_source(false);
        let mut visited = HashSet::from([id]);
        let mut result = Vec::new();
        let mut stack: Vec<EntityId> = children
            .get(&id)
            .map(|kids| kids.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            result.push(next);
            if let Some(kids) = children.get(&next) {
                stack.extend(kids.iter().rev().copied());
            }
        }
        result
    }

    /// Whether no path continues from the end of `path_id`.
    pub fn is_leaf_path(&self, path_id: EntityId) -> bool {
        !self.paths.iter().any(|path| path.source_id == path_id)
    }

    /// Whether a player has at least one path leaving it.
    pub fn has_paths(&self, player_id: EntityId) -> bool {
        self.paths
            .iter()
            .any(|path| path.is_root() && path.source_id == player_id)
    }

    /// Position a path starts from, if its source still exists.
    pub fn resolve_source(&self, source_id: EntityId, source_type: SourceType) -> Option<Position> {
        match source_type {
            SourceType::Player => self.items.get(source_id).map(|item| item.position),
            SourceType::Path => self.paths.get(source_id).map(|path| path.end_position),
        }
    }

    /// Centres whose hands can hold the shuttle: every player, then the end
    /// of every leaf path.
    pub fn magnet_anchors(&self) -> Vec<Position> {
        let players = self.items.iter().filter(|item| item.is_player()).map(|item| item.position);
        let ghosts = self
            .paths
            .iter()
            .filter(|path| self.is_leaf_path(path.id))
            .map(|path| path.end_position);
        players.chain(ghosts).collect()
    }

    /// Snap a raw shuttle position onto the nearest hand, or to the grid.
    pub fn resolve_magnetic_snap(&self, raw: Position, config: &SnapConfig) -> SnapResult {
        geometry::resolve_magnetic_snap(raw, self.magnet_anchors(), config)
    }

    /// Shuttles currently held in either hand of a token at `anchor`.
    pub fn attached_shuttles(&self, anchor: Position, config: &SnapConfig) -> Vec<ItemPosition> {
        self.items
            .iter()
            .filter(|item| item.is_shuttle() && geometry::is_attached(anchor, item.position, config))
            .map(|item| ItemPosition {
                id: item.id,
                position: item.position,
            })
            .collect()
    }

    // --- Items ---------------------------------------------------------

    /// Add an item with its next label (and slot color for players).
    ///
    /// Returns `None` when the kind is at capacity.
    pub fn add_item(&mut self, kind: ItemKind, position: Position, limits: &ItemLimits) -> Option<EntityId> {
        if !self.has_room_for(kind, limits) {
            log::debug!("Ignoring new {:?}: limit of {} reached", kind, limits.max_for(kind));
            return None;
        }

        let mut item = Item::new(kind, position);
        if kind == ItemKind::Player {
            item.color = Some(PlayerColor::for_slot(self.next_slot(kind)));
        }
        item.label = self.next_label(kind);

        let id = item.id;
        log::debug!("Added {:?} {:?} at {:?}", kind, item.label, item.position);
        self.items.insert(item);
        Some(id)
    }

    pub fn move_item(&mut self, id: EntityId, position: Position) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                item.position = clamp_position(position);
                true
            }
            None => {
                log::warn!("Cannot move unknown item {}", id);
                false
            }
        }
    }

    /// Move several items at once. Returns how many were found.
    pub fn move_items(&mut self, moves: &[ItemPosition]) -> usize {
        moves
            .iter()
            .filter(|entry| self.move_item(entry.id, entry.position))
            .count()
    }

    pub fn update_item(&mut self, id: EntityId, patch: &ItemPatch) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                item.apply_patch(patch);
                true
            }
            None => {
                log::warn!("Cannot update unknown item {}", id);
                false
            }
        }
    }

    /// Delete an item and every path descending from it.
    pub fn delete_item(&mut self, id: EntityId) -> bool {
        if !self.items.contains(id) {
            return false;
        }
        let doomed = self.descendants(id);
        self.items.remove(id);
        let removed = self.paths.remove_all(&doomed);
        log::debug!("Deleted item {} and {} path(s)", id, removed);
        true
    }

    // --- Lines ---------------------------------------------------------

    /// Add a line labeled one past the highest existing line label.
    pub fn add_line(&mut self, start: Position, end: Position, style: LineStyle) -> EntityId {
        let line = Line::new(start, end, self.next_line_label(), style);
        let id = line.id;
        log::debug!("Added line {} from {:?} to {:?}", line.label, line.start, line.end);
        self.lines.insert(line);
        id
    }

    pub fn update_line(&mut self, id: EntityId, patch: &LinePatch) -> bool {
        match self.lines.get_mut(id) {
            Some(line) => {
                line.apply_patch(patch);
                true
            }
            None => {
                log::warn!("Cannot update unknown line {}", id);
                false
            }
        }
    }

    pub fn delete_line(&mut self, id: EntityId) -> bool {
        let removed = self.lines.remove(id).is_some();
        if removed {
            log::debug!("Deleted line {}", id);
        }
        removed
    }

    // --- Paths ---------------------------------------------------------

    /// Add a path from a player or from the end of another path.
    ///
    /// Returns `None` when the source does not exist or has the wrong kind.
    pub fn add_path(&mut self, source_id: EntityId, source_type: SourceType, end: Position) -> Option<EntityId> {
        let source_ok = match source_type {
            SourceType::Player => self.items.get(source_id).is_some_and(Item::is_player),
            SourceType::Path => self.paths.contains(source_id),
        };
        if !source_ok {
            log::debug!("Ignoring path from missing {:?} source {}", source_type, source_id);
            return None;
        }

        let path = Path::new(source_id, source_type, end);
        let id = path.id;
        log::debug!("Added path {} from {:?} {}", id, source_type, source_id);
        self.paths.insert(path);
        Some(id)
    }

    /// Move the end of a path.
    pub fn move_path(&mut self, id: EntityId, end: Position) -> bool {
        match self.paths.get_mut(id) {
            Some(path) => {
                path.end_position = clamp_position(end);
                true
            }
            None => {
                log::warn!("Cannot move unknown path {}", id);
                false
            }
        }
    }

    /// Delete a path and every path chained after it.
    pub fn delete_path(&mut self, id: EntityId) -> bool {
        if !self.paths.contains(id) {
            return false;
        }
        let mut doomed = self.descendants(id);
        doomed.push(id);
        let removed = self.paths.remove_all(&doomed);
        log::debug!("Deleted {} path(s) starting at {}", removed, id);
        true
    }

    // --- Bulk ----------------------------------------------------------

    /// Remove everything.
    pub fn clear(&mut self) {
        self.items.clear();
        self.lines.clear();
        self.paths.clear();
    }

    /// Remove every player together with its path trees.
    pub fn clear_players(&mut self) {
        let players: Vec<EntityId> = self
            .items
            .iter()
            .filter(|item| item.is_player())
            .map(|item| item.id)
            .collect();
        let doomed: Vec<EntityId> = players.iter().flat_map(|&id| self.descendants(id)).collect();
        self.items.retain(|item| !item.is_player());
        self.paths.remove_all(&doomed);
    }

    /// Remove every marker.
    pub fn clear_markers(&mut self) {
        self.items.retain(|item| item.kind != ItemKind::Marker);
    }

    /// Replace all items with a formation, dropping every line and path.
    /// Players flagged `with_shuttle` get the shuttle in their right hand.
    pub fn apply_preset(&mut self, players: &[PresetPlayer], config: &SnapConfig) {
        self.clear();
        let offset = config.hand_offset();
        for preset in players {
            let player = Item::new(ItemKind::Player, preset.position)
                .with_label(preset.label.clone())
                .with_color(preset.color);
            self.items.insert(player);
            if preset.with_shuttle {
                self.items
                    .insert(Item::new(ItemKind::Shuttle, preset.position + offset));
            }
        }
        log::debug!("Applied preset with {} player(s)", players.len());
    }

    // --- Reducer -------------------------------------------------------

    /// Apply a command in place. Returns whether anything changed.
    pub fn apply(&mut self, command: &SceneCommand, limits: &ItemLimits) -> bool {
        match command {
            SceneCommand::CreateItem { kind, position } => self.add_item(*kind, *position, limits).is_some(),
            SceneCommand::MoveItem { id, position } => self.move_item(*id, *position),
            SceneCommand::MoveItems(moves) => self.move_items(moves) > 0,
            SceneCommand::UpdateItem { id, patch } => self.update_item(*id, patch),
            SceneCommand::DeleteItem(id) => self.delete_item(*id),
            SceneCommand::CreateLine { start, end, style } => {
                self.add_line(*start, *end, *style);
                true
            }
            SceneCommand::UpdateLine { id, patch } => self.update_line(*id, patch),
            SceneCommand::DeleteLine(id) => self.delete_line(*id),
            SceneCommand::CreatePath {
                source_id,
                source_type,
                end,
            } => self.add_path(*source_id, *source_type, *end).is_some(),
            SceneCommand::UpdatePath { id, end } => self.move_path(*id, *end),
            SceneCommand::DeletePath(id) => self.delete_path(*id),
        }
    }

    /// Apply a command to a copy and return it, leaving `self` untouched.
    pub fn applied(&self, command: &SceneCommand, limits: &ItemLimits) -> Scene {
        let mut next = self.clone();
        next.apply(command, limits);
        next
    }

    // --- Serialization -------------------------------------------------

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}
