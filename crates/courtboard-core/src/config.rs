//! Board configuration: capacity limits, gesture thresholds and snap tuning.
//!
//! Every field has a default matching the stock court, so a host only needs
//! to override what it cares about:
//!
//! ```json
//! { "limits": { "max_markers": 6 }, "gesture": { "long_press_ms": 800 } }
//! ```

use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::geometry::Grid;
use crate::scene::ItemKind;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Maximum number of items of each kind on the court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemLimits {
    pub max_players: usize,
    pub max_markers: usize,
    pub max_shuttles: usize,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            max_players: 4,
            max_markers: 10,
            max_shuttles: 1,
        }
    }
}

impl ItemLimits {
    /// Cap for the given item kind.
    pub fn max_for(&self, kind: ItemKind) -> usize {
        match kind {
            ItemKind::Player => self.max_players,
            ItemKind::Marker => self.max_markers,
            ItemKind::Shuttle => self.max_shuttles,
        }
    }
}

/// Thresholds used to tell clicks, drags, long presses and double clicks apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold time before a press on a player or path end starts a new path.
    pub long_press_ms: u64,
    /// Pointer travel (client pixels) that turns a pending long press into a drag.
    pub long_press_slop_px: f64,
    /// Drawn lines this short (percent units) or shorter are discarded.
    pub min_line_length: f64,
    /// Maximum gap between the two presses of a double click.
    pub double_click_ms: u64,
    /// Maximum pointer travel (client pixels) between the two presses of a double click.
    pub double_click_slop_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 1000,
            long_press_slop_px: 10.0,
            min_line_length: 1.0,
            double_click_ms: 500,
            double_click_slop_px: 5.0,
        }
    }
}

impl GestureConfig {
    pub fn long_press_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn double_click_duration(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

/// Grid and magnetic snapping parameters, all in percent of the court.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Number of grid columns across the court width.
    pub grid_columns: u32,
    /// A shuttle within this distance of a hand snaps onto it.
    pub magnet_radius: f64,
    /// A shuttle within this distance of a hand travels with its holder.
    pub attach_threshold: f64,
    /// Horizontal distance from a token centre to either hand.
    pub hand_offset_x: f64,
    /// Vertical distance from a token centre to both hands (negative is up).
    pub hand_offset_y: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            grid_columns: crate::geometry::GRID_COLUMNS,
            magnet_radius: 5.0,
            attach_threshold: 1.0,
            hand_offset_x: 4.0,
            hand_offset_y: -1.5,
        }
    }
}

impl SnapConfig {
    /// The snapping grid described by this config.
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_columns)
    }

    /// Offset from a token centre to its right hand. The left hand mirrors x.
    pub fn hand_offset(&self) -> Vec2 {
        Vec2::new(self.hand_offset_x, self.hand_offset_y)
    }
}

/// Complete board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub limits: ItemLimits,
    pub gesture: GestureConfig,
    pub snap: SnapConfig,
}

impl BoardConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded board config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the geometry cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snap.grid_columns == 0 {
            return Err(ConfigError::Invalid("grid_columns must be at least 1".into()));
        }
        if !(self.snap.magnet_radius > 0.0) {
            return Err(ConfigError::Invalid("magnet_radius must be positive".into()));
        }
        if !(self.snap.attach_threshold > 0.0) {
            return Err(ConfigError::Invalid("attach_threshold must be positive".into()));
        }
        if self.gesture.long_press_ms == 0 {
            return Err(ConfigError::Invalid("long_press_ms must be positive".into()));
        }
        if !(self.gesture.long_press_slop_px >= 0.0) || !(self.gesture.min_line_length >= 0.0) {
            return Err(ConfigError::Invalid("gesture thresholds must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.limits.max_players, 4);
        assert_eq!(config.limits.max_markers, 10);
        assert_eq!(config.limits.max_shuttles, 1);
        assert_eq!(config.gesture.long_press_ms, 1000);
        assert_eq!(config.gesture.long_press_slop_px, 10.0);
        assert_eq!(config.snap.grid_columns, 60);
        assert_eq!(config.snap.hand_offset(), Vec2::new(4.0, -1.5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BoardConfig::from_json(r#"{ "limits": { "max_markers": 6 } }"#).unwrap();
        assert_eq!(config.limits.max_markers, 6);
        assert_eq!(config.limits.max_players, 4);
        assert_eq!(config.gesture, GestureConfig::default());
    }

    #[test]
    fn test_max_for_kind() {
        let limits = ItemLimits::default();
        assert_eq!(limits.max_for(ItemKind::Player), 4);
        assert_eq!(limits.max_for(ItemKind::Marker), 10);
        assert_eq!(limits.max_for(ItemKind::Shuttle), 1);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let result = BoardConfig::from_json(r#"{ "snap": { "grid_columns": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = BoardConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{ "gesture": { "long_press_ms": 750 } }"#).unwrap();

        let config = BoardConfig::load(&path).unwrap();
        assert_eq!(config.gesture.long_press_duration(), Duration::from_millis(750));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = BoardConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = BoardConfig::default();
        config.snap.magnet_radius = 3.0;
        let json = config.to_json().unwrap();
        assert_eq!(BoardConfig::from_json(&json).unwrap(), config);
    }
}
