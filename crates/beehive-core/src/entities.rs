//! Flowers and the passive occupants of both grids.

use crate::grid::{HiveCoord, WorldCoord};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle for flowers; depleted flowers keep their handle.
    pub struct FlowerId;
}

/// Depletable nectar source in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flower {
    position: WorldCoord,
    nectar: u32,
}

impl Flower {
    #[must_use]
    pub const fn new(position: WorldCoord, nectar: u32) -> Self {
        Self { position, nectar }
    }

    #[must_use]
    pub const fn position(&self) -> WorldCoord {
        self.position
    }

    #[must_use]
    pub const fn nectar(&self) -> u32 {
        self.nectar
    }

    /// A flower leaves the active set once its nectar reaches zero.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.nectar > 0
    }

    /// Remove one unit. Returns `true` when this collection depleted the flower.
    pub fn collect(&mut self) -> bool {
        if self.nectar == 0 {
            return false;
        }
        self.nectar -= 1;
        self.nectar == 0
    }
}

/// Non-foraging hive occupants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidentKind {
    Queen,
    Drone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    pub kind: ResidentKind,
    pub position: HiveCoord,
}

/// Static world obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    Barrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub position: WorldCoord,
}
