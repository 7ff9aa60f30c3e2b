//! Ghost movement paths.
//!
//! A path runs from its source (a player, or the end of another path) to
//! `end_position`. Chained paths form a tree under each player; depth and the
//! owning player are derived on demand by [`Scene::path_metadata`].
//!
//! [`Scene::path_metadata`]: super::Scene::path_metadata

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityId;
use crate::geometry::{Position, clamp_position};

/// What a path's `source_id` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Player,
    Path,
}

/// A directed movement edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: EntityId,
    pub source_id: EntityId,
    pub source_type: SourceType,
    pub end_position: Position,
}

impl Path {
    /// Create a new path with a fresh id.
    pub fn new(source_id: EntityId, source_type: SourceType, end_position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            source_type,
            end_position: clamp_position(end_position),
        }
    }

    /// Whether this path starts at a player rather than another path.
    pub fn is_root(&self) -> bool {
        self.source_type == SourceType::Player
    }
}

/// Derived tree information for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMeta {
    /// 1 for a path leaving a player, 2 for a path chained onto that, and so on.
    pub depth: usize,
    pub root_player_id: EntityId,
}
