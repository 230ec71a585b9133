// Data-driven engine configuration.
//
// Tunable parameters live in `NavConfig`, loadable from JSON. Every field has
// a default (`#[serde(default)]`), so a config file only needs to list what
// it overrides. `from_json()` validates the result before handing it out.
//
// See also: `map_text.rs`, which reads the loader costs, and `grid.rs`, whose
// chunk length comes from `grid_chunk_cells`.

use crate::error::ConfigError;
use crate::grid::DEFAULT_CHUNK_CELLS;
use crate::types::{Cost, PATH_COST_INFINITE};
use serde::{Deserialize, Serialize};

/// Engine and loader configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Cost assigned to a floor (space) glyph by the text loader.
    pub floor_cost: Cost,
    /// Open-cost assigned to door glyphs (`d`, `_`, `D`) by the text loader.
    pub door_open_cost: Cost,
    /// Cells per copy-on-write chunk in the cost and color grids. Smaller
    /// chunks share more storage between snapshots at the price of more
    /// pointers per grid.
    pub grid_chunk_cells: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            floor_cost: 1,
            door_open_cost: 1,
            grid_chunk_cells: DEFAULT_CHUNK_CELLS,
        }
    }
}

impl NavConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: NavConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floor_cost == PATH_COST_INFINITE {
            return Err(ConfigError::Invalid(
                "floor_cost must not be the impassable cost".into(),
            ));
        }
        if self.door_open_cost == PATH_COST_INFINITE {
            return Err(ConfigError::Invalid(
                "door_open_cost must not be the impassable cost".into(),
            ));
        }
        if self.grid_chunk_cells == 0 {
            return Err(ConfigError::Invalid(
                "grid_chunk_cells must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(NavConfig::default().validate().is_ok());
    }

    #[test]
    fn json_roundtrip() {
        let config = NavConfig {
            floor_cost: 3,
            door_open_cost: 5,
            grid_chunk_cells: 256,
        };
        let json = config.to_json().unwrap();
        let restored = NavConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = NavConfig::from_json(r#"{ "floor_cost": 2 }"#).unwrap();
        assert_eq!(config.floor_cost, 2);
        assert_eq!(config.door_open_cost, 1);
        assert_eq!(config.grid_chunk_cells, DEFAULT_CHUNK_CELLS);
    }

    #[test]
    fn rejects_impassable_door_cost() {
        let err = NavConfig::from_json(r#"{ "door_open_cost": 255 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_chunk() {
        let err = NavConfig::from_json(r#"{ "grid_chunk_cells": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = NavConfig::from_json("{ floor_cost: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
