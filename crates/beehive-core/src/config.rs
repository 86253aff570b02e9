//! Run-wide settings for grid sizes, the portal, comb capacity and timing.

use crate::ColonyError;
use crate::grid::{GridBounds, HiveCoord, WorldCoord};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Static configuration for a colony run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Width of the hive interior in cells.
    pub hive_width: u32,
    /// Height of the hive interior in cells.
    pub hive_height: u32,
    /// Width of the outdoor world in cells.
    pub world_width: u32,
    /// Height of the outdoor world in cells.
    pub world_height: u32,
    /// World cell where bees leave and re-enter the hive.
    pub portal_world: WorldCoord,
    /// Hive cell a returning bee lands on.
    pub portal_hive: HiveCoord,
    /// Maximum nectar units per comb cell.
    pub comb_capacity: u32,
    /// Age (in ticks) at which a bee starts moving.
    pub maturity_age: u32,
    /// Number of ticks in a full run.
    pub simulation_length: u32,
    /// Fixed steps per tick; `None` derives the speed from the flower layout.
    pub speed_override: Option<u32>,
    /// Maximum number of recent tick summaries retained in-memory.
    pub history_capacity: usize,
    /// Pair bee `i` with flower `i` (layout order) before the first tick.
    pub preassign_flowers: bool,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            hive_width: 11,
            hive_height: 10,
            world_width: 50,
            world_height: 40,
            portal_world: WorldCoord::new(12, 10),
            portal_hive: HiveCoord::new(5, 9),
            comb_capacity: 5,
            maturity_age: 2,
            simulation_length: 20,
            speed_override: None,
            history_capacity: 128,
            preassign_flowers: false,
        }
    }
}

impl ColonyConfig {
    #[must_use]
    pub const fn hive_bounds(&self) -> GridBounds {
        GridBounds::new(self.hive_width, self.hive_height)
    }

    #[must_use]
    pub const fn world_bounds(&self) -> GridBounds {
        GridBounds::new(self.world_width, self.world_height)
    }

    /// Validates the configuration, returning the run length.
    pub fn validate(&self) -> Result<NonZeroU32, ColonyError> {
        if self.hive_width == 0 || self.hive_height == 0 {
            return Err(ColonyError::InvalidConfig(
                "hive dimensions must be non-zero",
            ));
        }
        if self.world_width == 0 || self.world_height == 0 {
            return Err(ColonyError::InvalidConfig(
                "world dimensions must be non-zero",
            ));
        }
        if self.hive_width > i32::MAX as u32
            || self.hive_height > i32::MAX as u32
            || self.world_width > i32::MAX as u32
            || self.world_height > i32::MAX as u32
        {
            return Err(ColonyError::InvalidConfig(
                "grid dimensions must fit signed coordinates",
            ));
        }
        if !self.portal_world.is_within(self.world_bounds()) {
            return Err(ColonyError::InvalidConfig(
                "portal_world must lie inside the world",
            ));
        }
        if !self.portal_hive.is_within(self.hive_bounds()) {
            return Err(ColonyError::InvalidConfig(
                "portal_hive must lie inside the hive",
            ));
        }
        if self.comb_capacity == 0 {
            return Err(ColonyError::InvalidConfig("comb_capacity must be non-zero"));
        }
        if self.speed_override == Some(0) {
            return Err(ColonyError::InvalidConfig(
                "speed_override must be non-zero when set",
            ));
        }
        if self.history_capacity == 0 {
            return Err(ColonyError::InvalidConfig(
                "history_capacity must be non-zero",
            ));
        }
        NonZeroU32::new(self.simulation_length).ok_or(ColonyError::InvalidConfig(
            "simulation_length must be non-zero",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ColonyConfig::default();
        assert_eq!(config.validate().map(NonZeroU32::get), Ok(20));
        assert_eq!(config.hive_bounds(), GridBounds::new(11, 10));
        assert_eq!(config.world_bounds(), GridBounds::new(50, 40));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cases = [
            ColonyConfig {
                hive_width: 0,
                ..ColonyConfig::default()
            },
            ColonyConfig {
                world_height: 0,
                ..ColonyConfig::default()
            },
            ColonyConfig {
                portal_world: WorldCoord::new(50, 0),
                ..ColonyConfig::default()
            },
            ColonyConfig {
                portal_hive: HiveCoord::new(-1, 0),
                ..ColonyConfig::default()
            },
            ColonyConfig {
                comb_capacity: 0,
                ..ColonyConfig::default()
            },
            ColonyConfig {
                simulation_length: 0,
                ..ColonyConfig::default()
            },
            ColonyConfig {
                speed_override: Some(0),
                ..ColonyConfig::default()
            },
            ColonyConfig {
                history_capacity: 0,
                ..ColonyConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(ColonyError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ColonyConfig =
            serde_json::from_str(r#"{"simulation_length": 60, "speed_override": 3}"#)
                .expect("parse");
        assert_eq!(config.simulation_length, 60);
        assert_eq!(config.speed_override, Some(3));
        assert_eq!(config.comb_capacity, 5);
        assert_eq!(config.portal_world, WorldCoord::new(12, 10));
        assert!(!config.preassign_flowers);
    }
}
