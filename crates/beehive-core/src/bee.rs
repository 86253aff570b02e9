//! Worker-bee foraging state machine.
//!
//! A bee's behaviour each tick is fully determined by `(location, age, carried, targets)`.
//! [`WorkerBee::phase`] names the resulting mode; the colony clock drives the transitions and
//! passes every shared structure in explicitly, so a bee only ever mutates itself.

use crate::claims::OccupiedCells;
use crate::entities::FlowerId;
use crate::grid::{GridBounds, HiveCoord, WorldCoord, greedy_step};
use crate::storage::CombGrid;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tracing::trace;

new_key_type! {
    /// Stable handle for worker bees. Bees are never removed.
    pub struct BeeId;
}

/// Which grid currently holds the bee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    #[default]
    InHive,
    InWorld,
}

/// Authoritative position in whichever space the bee occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "snake_case")]
pub enum BeePosition {
    Hive(HiveCoord),
    World(WorldCoord),
}

/// Logical behaviour mode derived from a bee's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeePhase {
    Immature,
    SeekingStorageTarget,
    TravelingToFlower,
    ReturningToHive,
    Depositing,
}

/// A claimed flower and the cell the bee is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerTarget {
    pub id: FlowerId,
    pub position: WorldCoord,
}

/// Result of a deposit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositOutcome {
    Deposited(HiveCoord),
    /// Target comb full or no comb with space; the bee keeps its nectar.
    Stalled,
    NothingCarried,
}

/// Read-only inputs for a movement phase.
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    pub hive_bounds: GridBounds,
    pub world_bounds: GridBounds,
    pub portal_world: WorldCoord,
    pub maturity_age: u32,
    pub occupied: &'a OccupiedCells,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerBee {
    hive_pos: HiveCoord,
    world_pos: WorldCoord,
    age: u32,
    location: Location,
    carried: u8,
    target_comb: Option<HiveCoord>,
    target_flower: Option<FlowerTarget>,
}

impl WorkerBee {
    /// A newborn bee in the hive. The world position is parked on the portal until it exits.
    #[must_use]
    pub const fn new(hive_pos: HiveCoord, portal_world: WorldCoord) -> Self {
        Self {
            hive_pos,
            world_pos: portal_world,
            age: 0,
            location: Location::InHive,
            carried: 0,
            target_comb: None,
            target_flower: None,
        }
    }

    #[must_use]
    pub const fn hive_pos(&self) -> HiveCoord {
        self.hive_pos
    }

    #[must_use]
    pub const fn world_pos(&self) -> WorldCoord {
        self.world_pos
    }

    #[must_use]
    pub const fn age(&self) -> u32 {
        self.age
    }

    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Units of nectar carried; always 0 or 1.
    #[must_use]
    pub const fn carried(&self) -> u8 {
        self.carried
    }

    #[must_use]
    pub const fn is_carrying(&self) -> bool {
        self.carried > 0
    }

    #[must_use]
    pub const fn target_comb(&self) -> Option<HiveCoord> {
        self.target_comb
    }

    #[must_use]
    pub const fn target_flower(&self) -> Option<FlowerTarget> {
        self.target_flower
    }

    #[must_use]
    pub const fn is_mature(&self, maturity_age: u32) -> bool {
        self.age >= maturity_age
    }

    #[must_use]
    pub const fn position(&self) -> BeePosition {
        match self.location {
            Location::InHive => BeePosition::Hive(self.hive_pos),
            Location::InWorld => BeePosition::World(self.world_pos),
        }
    }

    #[must_use]
    pub const fn phase(&self, maturity_age: u32) -> BeePhase {
        if !self.is_mature(maturity_age) {
            return BeePhase::Immature;
        }
        match (self.location, self.carried > 0) {
            (Location::InHive, false) => BeePhase::SeekingStorageTarget,
            (Location::InHive, true) => BeePhase::Depositing,
            (Location::InWorld, false) => BeePhase::TravelingToFlower,
            (Location::InWorld, true) => BeePhase::ReturningToHive,
        }
    }

    pub fn advance_age(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Pick the nearest comb with space from the current hive position. May leave the target
    /// empty when every comb is full.
    pub fn choose_comb(&mut self, combs: &CombGrid) -> Option<HiveCoord> {
        self.target_comb = combs.nearest_with_space(self.hive_pos);
        self.target_comb
    }

    /// Keep the current comb target if it still has space, otherwise re-pick measuring from
    /// `origin`.
    pub fn confirm_comb(&mut self, combs: &CombGrid, origin: HiveCoord) -> Option<HiveCoord> {
        if !self.target_comb.is_some_and(|comb| combs.has_space(comb)) {
            self.target_comb = combs.nearest_with_space(origin);
        }
        self.target_comb
    }

    /// Move out through the portal into the world.
    pub fn exit_hive(&mut self, portal_world: WorldCoord) {
        self.location = Location::InWorld;
        self.world_pos = portal_world;
    }

    pub fn set_flower_target(&mut self, id: FlowerId, position: WorldCoord) {
        self.target_flower = Some(FlowerTarget { id, position });
    }

    /// Drop the flower target when it refers to `flower`. Returns whether anything changed.
    pub fn forget_flower(&mut self, flower: FlowerId) -> bool {
        if self.target_flower.is_some_and(|target| target.id == flower) {
            self.target_flower = None;
            return true;
        }
        false
    }

    /// Whether the bee stands on its claimed flower.
    #[must_use]
    pub fn is_on_target_flower(&self) -> bool {
        self.location == Location::InWorld
            && self
                .target_flower
                .is_some_and(|target| target.position == self.world_pos)
    }

    /// Pick up one unit of nectar and release the flower target.
    pub fn take_nectar(&mut self) -> Option<FlowerId> {
        let target = self.target_flower.take()?;
        self.carried = 1;
        Some(target.id)
    }

    /// Whether a loaded bee stands on the world-side portal cell.
    #[must_use]
    pub fn is_ready_to_enter(&self, portal_world: WorldCoord) -> bool {
        self.location == Location::InWorld && self.carried > 0 && self.world_pos == portal_world
    }

    pub fn enter_hive(&mut self, portal_hive: HiveCoord) {
        self.location = Location::InHive;
        self.hive_pos = portal_hive;
    }

    /// Deliver carried nectar into the target comb.
    ///
    /// A full target comb is a silent no-op: the bee keeps both nectar and target. A bee with no
    /// target looks for the nearest comb with space first.
    pub fn deposit(&mut self, combs: &mut CombGrid) -> DepositOutcome {
        if self.carried == 0 {
            return DepositOutcome::NothingCarried;
        }
        if self.target_comb.is_none() {
            self.target_comb = combs.nearest_with_space(self.hive_pos);
        }
        match self.target_comb {
            Some(comb) if combs.deposit(comb) => {
                self.carried = 0;
                self.target_comb = None;
                DepositOutcome::Deposited(comb)
            }
            _ => DepositOutcome::Stalled,
        }
    }

    /// Take up to `steps` greedy moves toward the current movement target.
    ///
    /// Immature bees and bees without a target stay put. Returns the number of cells moved.
    pub fn advance(&mut self, steps: u32, ctx: &MoveContext<'_>) -> u32 {
        if !self.is_mature(ctx.maturity_age) {
            return 0;
        }
        match self.location {
            Location::InHive => {
                let Some(target) = self.target_comb else {
                    return 0;
                };
                let mut moved = 0;
                for _ in 0..steps {
                    match greedy_step(self.hive_pos, target, ctx.hive_bounds, |cell| {
                        ctx.occupied.blocks_hive(cell)
                    }) {
                        Some(next) => {
                            self.hive_pos = next;
                            moved += 1;
                        }
                        None => break,
                    }
                }
                moved
            }
            Location::InWorld => {
                let target = if self.carried > 0 {
                    ctx.portal_world
                } else {
                    match self.target_flower {
                        Some(flower) => flower.position,
                        None => return 0,
                    }
                };
                let mut moved = 0;
                for _ in 0..steps {
                    match greedy_step(self.world_pos, target, ctx.world_bounds, |cell| {
                        ctx.occupied.blocks_world(cell)
                    }) {
                        Some(next) => {
                            self.world_pos = next;
                            moved += 1;
                        }
                        None => {
                            if self.world_pos != target {
                                trace!(position = %self.world_pos, %target, "bee blocked");
                            }
                            break;
                        }
                    }
                }
                moved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    const PORTAL: WorldCoord = WorldCoord::new(12, 10);

    fn combs(fill: &[((i32, i32), u32)]) -> CombGrid {
        let mut grid = CombGrid::new(GridBounds::new(11, 10), 5).expect("grid");
        for &((x, y), occupancy) in fill {
            grid.add_comb(HiveCoord::new(x, y), occupancy).expect("comb");
        }
        grid
    }

    fn flower_id() -> FlowerId {
        let mut map: SlotMap<FlowerId, ()> = SlotMap::with_key();
        map.insert(())
    }

    fn mature_bee() -> WorkerBee {
        let mut bee = WorkerBee::new(HiveCoord::new(0, 6), PORTAL);
        bee.advance_age();
        bee.advance_age();
        bee
    }

    #[test]
    fn phase_follows_fields() {
        let mut bee = WorkerBee::new(HiveCoord::new(0, 6), PORTAL);
        assert_eq!(bee.phase(2), BeePhase::Immature);
        bee.advance_age();
        assert_eq!(bee.phase(2), BeePhase::Immature);
        bee.advance_age();
        assert_eq!(bee.phase(2), BeePhase::SeekingStorageTarget);
        bee.exit_hive(PORTAL);
        assert_eq!(bee.phase(2), BeePhase::TravelingToFlower);
        assert_eq!(bee.position(), BeePosition::World(PORTAL));
        let id = flower_id();
        bee.set_flower_target(id, PORTAL);
        assert!(bee.is_on_target_flower());
        assert_eq!(bee.take_nectar(), Some(id));
        assert_eq!(bee.phase(2), BeePhase::ReturningToHive);
        bee.enter_hive(HiveCoord::new(5, 9));
        assert_eq!(bee.phase(2), BeePhase::Depositing);
        assert_eq!(bee.position(), BeePosition::Hive(HiveCoord::new(5, 9)));
    }

    #[test]
    fn choose_comb_picks_nearest_free_cell() {
        let grid = combs(&[((5, 0), 0), ((5, 6), 5), ((5, 8), 0)]);
        let mut bee = mature_bee();
        assert_eq!(bee.choose_comb(&grid), Some(HiveCoord::new(5, 8)));

        let full = combs(&[((5, 0), 5)]);
        assert_eq!(bee.choose_comb(&full), None);
        assert_eq!(bee.target_comb(), None);
    }

    #[test]
    fn confirm_comb_replaces_only_full_targets() {
        let mut grid = combs(&[((5, 0), 4), ((5, 8), 0)]);
        let mut bee = mature_bee();
        bee.target_comb = Some(HiveCoord::new(5, 0));
        let entrance = HiveCoord::new(5, 9);
        assert_eq!(bee.confirm_comb(&grid, entrance), Some(HiveCoord::new(5, 0)));
        assert!(grid.deposit(HiveCoord::new(5, 0)));
        assert_eq!(bee.confirm_comb(&grid, entrance), Some(HiveCoord::new(5, 8)));
    }

    #[test]
    fn deposit_into_full_comb_keeps_nectar_and_target() {
        let mut grid = combs(&[((5, 0), 5), ((5, 8), 0)]);
        let mut bee = mature_bee();
        bee.target_comb = Some(HiveCoord::new(5, 0));
        bee.carried = 1;
        assert_eq!(bee.deposit(&mut grid), DepositOutcome::Stalled);
        assert_eq!(bee.carried(), 1);
        assert_eq!(bee.target_comb(), Some(HiveCoord::new(5, 0)));
        assert_eq!(grid.occupancy(HiveCoord::new(5, 8)), Some(0));
    }

    #[test]
    fn deposit_without_target_looks_for_space() {
        let mut grid = combs(&[((5, 0), 1)]);
        let mut bee = mature_bee();
        assert_eq!(bee.deposit(&mut grid), DepositOutcome::NothingCarried);
        bee.carried = 1;
        assert_eq!(
            bee.deposit(&mut grid),
            DepositOutcome::Deposited(HiveCoord::new(5, 0))
        );
        assert_eq!(bee.carried(), 0);
        assert_eq!(bee.target_comb(), None);
        assert_eq!(grid.occupancy(HiveCoord::new(5, 0)), Some(2));
    }

    #[test]
    fn forget_flower_matches_by_id() {
        let mut map: SlotMap<FlowerId, ()> = SlotMap::with_key();
        let a = map.insert(());
        let b = map.insert(());
        let mut bee = mature_bee();
        bee.set_flower_target(a, WorldCoord::new(1, 1));
        assert!(!bee.forget_flower(b));
        assert!(bee.target_flower().is_some());
        assert!(bee.forget_flower(a));
        assert!(bee.target_flower().is_none());
    }

    #[test]
    fn advance_moves_toward_flower_and_stops_on_it() {
        let occupied = OccupiedCells::new(PORTAL, [], []);
        let ctx = MoveContext {
            hive_bounds: GridBounds::new(11, 10),
            world_bounds: GridBounds::new(50, 40),
            portal_world: PORTAL,
            maturity_age: 2,
            occupied: &occupied,
        };
        let mut bee = mature_bee();
        bee.exit_hive(PORTAL);
        bee.set_flower_target(flower_id(), WorldCoord::new(14, 13));
        assert_eq!(bee.advance(2, &ctx), 2);
        assert_eq!(bee.world_pos(), WorldCoord::new(14, 12));
        assert_eq!(bee.advance(5, &ctx), 1, "stops once the target is reached");
        assert!(bee.is_on_target_flower());
    }

    #[test]
    fn immature_bee_never_moves() {
        let occupied = OccupiedCells::new(PORTAL, [], []);
        let ctx = MoveContext {
            hive_bounds: GridBounds::new(11, 10),
            world_bounds: GridBounds::new(50, 40),
            portal_world: PORTAL,
            maturity_age: 2,
            occupied: &occupied,
        };
        let mut bee = WorkerBee::new(HiveCoord::new(0, 6), PORTAL);
        bee.target_comb = Some(HiveCoord::new(5, 0));
        bee.advance_age();
        assert_eq!(bee.advance(3, &ctx), 0);
        assert_eq!(bee.hive_pos(), HiveCoord::new(0, 6));
    }

    #[test]
    fn returning_bee_heads_for_portal() {
        let occupied = OccupiedCells::new(PORTAL, [], []);
        let ctx = MoveContext {
            hive_bounds: GridBounds::new(11, 10),
            world_bounds: GridBounds::new(50, 40),
            portal_world: PORTAL,
            maturity_age: 2,
            occupied: &occupied,
        };
        let mut bee = mature_bee();
        bee.exit_hive(PORTAL);
        bee.world_pos = WorldCoord::new(15, 10);
        bee.carried = 1;
        assert_eq!(bee.advance(10, &ctx), 3);
        assert!(bee.is_ready_to_enter(PORTAL));
    }
}
