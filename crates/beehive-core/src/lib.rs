//! Core simulation for a foraging bee colony spread over two coupled grids.
//!
//! Worker bees live in an interior hive grid of comb cells and fly out through a single portal
//! into a world grid of depletable flowers and static obstacles. [`Colony`] owns every entity
//! and advances the population one [`Tick`] at a time through five ordered phases:
//! aging and targeting, movement, collection, hive re-entry, and deposit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod bee;
pub mod calibrate;
pub mod claims;
pub mod colony;
pub mod config;
pub mod entities;
pub mod grid;
pub mod layout;
pub mod snapshot;
pub mod storage;

pub use bee::{BeeId, BeePhase, BeePosition, DepositOutcome, Location, WorkerBee};
pub use calibrate::steps_per_tick;
pub use claims::{ClaimBook, OccupiedCells};
pub use colony::{Colony, TickEvents, TickSummary};
pub use config::ColonyConfig;
pub use entities::{Flower, FlowerId, Obstacle, ObstacleKind, Resident, ResidentKind};
pub use grid::{GridBounds, GridCoord, Hive, HiveCoord, World, WorldCoord};
pub use layout::{ColonyLayout, CombSeed, FlowerSeed};
pub use snapshot::{
    BeeSnapshot, ColonyObserver, ColonySnapshot, CombSnapshot, FlowerSnapshot, NullObserver,
};
pub use storage::CombGrid;

/// Simulation clock (ticks processed since the colony was built).
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Errors raised while building a colony. Ticking itself never fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColonyError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("{entity} at ({x}, {y}) lies outside its grid")]
    OutOfBounds {
        entity: &'static str,
        x: i32,
        y: i32,
    },
    #[error("comb at ({x}, {y}) holds {occupancy} units, above capacity {capacity}")]
    CombOverfilled {
        x: i32,
        y: i32,
        occupancy: u32,
        capacity: u32,
    },
    #[error("comb at ({x}, {y}) is listed more than once")]
    DuplicateComb { x: i32, y: i32 },
    #[error("flower at ({x}, {y}) shares its cell with an obstacle")]
    FlowerBlocked { x: i32, y: i32 },
    #[error("flower at ({x}, {y}) starts without nectar")]
    EmptyFlower { x: i32, y: i32 },
}
