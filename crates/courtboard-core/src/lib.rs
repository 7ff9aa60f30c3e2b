//! Courtboard Core Library
//!
//! Platform-agnostic core of the Courtboard court diagramming surface: court
//! geometry and snapping, the scene of players, markers, lines and movement
//! paths, and the pointer-driven interaction state machine that edits it.

pub mod board;
pub mod config;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod metrics;
pub mod scene;

pub use board::Board;
pub use config::{BoardConfig, ConfigError, GestureConfig, ItemLimits, SnapConfig};
pub use geometry::{Grid, Position, SnapResult, SnapSource, resolve_magnetic_snap, snap_to_grid, to_percent};
pub use hit::{HitTarget, hit_test};
pub use input::{ClickTracker, Instant, MouseButton, PointerEvent};
pub use interaction::{GestureContext, InteractionMachine, InteractionState, LongPress, LongPressToken, PathPreview};
pub use metrics::Metrics;
pub use scene::{
    EntityId, Item, ItemKind, ItemPatch, ItemPosition, Line, LineColor, LinePatch, LineStyle, LineType, Path,
    PathMeta, PlayerColor, PresetPlayer, Scene, SceneCommand, SceneError, SourceType,
};
