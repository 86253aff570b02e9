//! Shared per-tick bookkeeping owned by the colony clock: flower claims and blocked cells.

use crate::bee::BeeId;
use crate::entities::{Flower, FlowerId};
use crate::grid::{HiveCoord, WorldCoord};
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

/// Exclusive flower reservations. A flower has at most one holder at a time.
#[derive(Debug, Clone, Default)]
pub struct ClaimBook {
    claims: HashMap<FlowerId, BeeId>,
}

impl ClaimBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `flower` for `bee`. Fails when another bee already holds it.
    pub fn claim(&mut self, flower: FlowerId, bee: BeeId) -> bool {
        match self.claims.get(&flower) {
            Some(holder) => *holder == bee,
            None => {
                self.claims.insert(flower, bee);
                true
            }
        }
    }

    /// Drop the reservation on `flower`, returning the former holder.
    pub fn release(&mut self, flower: FlowerId) -> Option<BeeId> {
        self.claims.remove(&flower)
    }

    #[must_use]
    pub fn is_claimed(&self, flower: FlowerId) -> bool {
        self.claims.contains_key(&flower)
    }

    #[must_use]
    pub fn holder(&self, flower: FlowerId) -> Option<BeeId> {
        self.claims.get(&flower).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowerId, BeeId)> + '_ {
        self.claims.iter().map(|(flower, bee)| (*flower, *bee))
    }
}

/// Nearest active, unclaimed flower by Manhattan distance. Ties go to the flower inserted
/// first (slot map iteration order).
#[must_use]
pub fn nearest_unclaimed_flower(
    from: WorldCoord,
    flowers: &SlotMap<FlowerId, Flower>,
    claims: &ClaimBook,
) -> Option<(FlowerId, WorldCoord)> {
    let mut best: Option<(FlowerId, WorldCoord, u32)> = None;
    for (id, flower) in flowers {
        if !flower.is_active() || claims.is_claimed(id) {
            continue;
        }
        let distance = from.manhattan_distance(flower.position());
        if best.is_none_or(|(_, _, min)| distance < min) {
            best = Some((id, flower.position(), distance));
        }
    }
    best.map(|(id, position, _)| (id, position))
}

/// Cells that movement may not enter during the current movement phase.
///
/// Residents and obstacles are fixed for the whole run; bee positions are captured once at
/// the start of each movement phase. The world-side portal cell never blocks.
#[derive(Debug, Clone)]
pub struct OccupiedCells {
    portal: WorldCoord,
    static_hive: HashSet<HiveCoord>,
    static_world: HashSet<WorldCoord>,
    hive: HashSet<HiveCoord>,
    world: HashSet<WorldCoord>,
}

impl OccupiedCells {
    #[must_use]
    pub fn new(
        portal: WorldCoord,
        static_hive: impl IntoIterator<Item = HiveCoord>,
        static_world: impl IntoIterator<Item = WorldCoord>,
    ) -> Self {
        let static_hive: HashSet<_> = static_hive.into_iter().collect();
        let static_world: HashSet<_> = static_world.into_iter().collect();
        Self {
            portal,
            hive: static_hive.clone(),
            world: static_world.clone(),
            static_hive,
            static_world,
        }
    }

    /// Forget every bee position, keeping residents and obstacles.
    pub fn reset(&mut self) {
        self.hive.clone_from(&self.static_hive);
        self.world.clone_from(&self.static_world);
    }

    pub fn insert_hive(&mut self, cell: HiveCoord) {
        self.hive.insert(cell);
    }

    pub fn insert_world(&mut self, cell: WorldCoord) {
        self.world.insert(cell);
    }

    #[must_use]
    pub fn blocks_hive(&self, cell: HiveCoord) -> bool {
        self.hive.contains(&cell)
    }

    #[must_use]
    pub fn blocks_world(&self, cell: WorldCoord) -> bool {
        cell != self.portal && self.world.contains(&cell)
    }

    /// Whether `cell` holds a tree or barrier.
    #[must_use]
    pub fn is_obstacle(&self, cell: WorldCoord) -> bool {
        self.static_world.contains(&cell)
    }
}
