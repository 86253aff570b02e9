//! Read-only per-tick view of the colony for renderers and loggers.

use crate::Tick;
use crate::bee::{BeeId, BeePhase, BeePosition};
use crate::entities::FlowerId;
use crate::grid::{HiveCoord, WorldCoord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeeSnapshot {
    pub id: BeeId,
    pub phase: BeePhase,
    pub position: BeePosition,
    pub carrying: bool,
    pub age: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombSnapshot {
    pub position: HiveCoord,
    pub occupancy: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerSnapshot {
    pub id: FlowerId,
    pub position: WorldCoord,
    pub nectar: u32,
    pub active: bool,
    pub claimed_by: Option<BeeId>,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonySnapshot {
    pub tick: Tick,
    pub steps_per_tick: u32,
    pub bees: Vec<BeeSnapshot>,
    pub combs: Vec<CombSnapshot>,
    pub flowers: Vec<FlowerSnapshot>,
}

impl ColonySnapshot {
    /// Total nectar held in combs.
    #[must_use]
    pub fn stored_nectar(&self) -> u32 {
        self.combs.iter().map(|comb| comb.occupancy).sum()
    }
}

/// Sink invoked with a fresh snapshot after each tick.
pub trait ColonyObserver: Send {
    fn on_tick(&mut self, snapshot: &ColonySnapshot);
}

/// No-op observer.
#[derive(Debug, Default)]
pub struct NullObserver;

impl ColonyObserver for NullObserver {
    fn on_tick(&mut self, _snapshot: &ColonySnapshot) {}
}
