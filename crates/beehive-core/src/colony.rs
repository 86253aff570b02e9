//! The colony clock: owns every entity and runs the five-phase tick pipeline.

use crate::bee::{BeeId, BeePosition, DepositOutcome, Location, MoveContext, WorkerBee};
use crate::calibrate;
use crate::claims::{ClaimBook, OccupiedCells, nearest_unclaimed_flower};
use crate::config::ColonyConfig;
use crate::entities::{Flower, FlowerId, Obstacle, ObstacleKind, Resident, ResidentKind};
use crate::grid::HiveCoord;
use crate::layout::ColonyLayout;
use crate::snapshot::{
    BeeSnapshot, ColonyObserver, ColonySnapshot, CombSnapshot, FlowerSnapshot, NullObserver,
};
use crate::storage::CombGrid;
use crate::{ColonyError, Tick};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// Events emitted after processing a colony tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TickEvents {
    pub tick: Tick,
    /// Bees that left the hive through the portal.
    pub exits: usize,
    /// Bees that changed cell during the movement phase.
    pub bees_moved: usize,
    pub collections: usize,
    /// Flowers whose nectar reached zero this tick.
    pub depletions: Vec<FlowerId>,
    pub reentries: usize,
    pub deposits: usize,
    /// Loaded bees in the hive that could not deposit.
    pub stalled_deposits: usize,
}

/// Population summary retained in the bounded history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: Tick,
    pub bees_in_hive: usize,
    pub bees_in_world: usize,
    pub bees_carrying: usize,
    pub stored_nectar: u32,
    pub active_flowers: usize,
    pub remaining_nectar: u32,
}

/// Aggregate colony state advanced one tick at a time by a driving loop.
pub struct Colony {
    config: ColonyConfig,
    tick: Tick,
    steps_per_tick: u32,
    bees: SlotMap<BeeId, WorkerBee>,
    flowers: SlotMap<FlowerId, Flower>,
    combs: CombGrid,
    residents: Vec<Resident>,
    obstacles: Vec<Obstacle>,
    claims: ClaimBook,
    occupied: OccupiedCells,
    observer: Box<dyn ColonyObserver>,
    history: VecDeque<TickSummary>,
}

impl fmt::Debug for Colony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Colony")
            .field("config", &self.config)
            .field("tick", &self.tick)
            .field("steps_per_tick", &self.steps_per_tick)
            .field("bee_count", &self.bees.len())
            .field("flower_count", &self.flowers.len())
            .field("claims", &self.claims.len())
            .finish()
    }
}

impl Colony {
    /// Build a colony from a configuration and initial layout.
    pub fn new(config: ColonyConfig, layout: ColonyLayout) -> Result<Self, ColonyError> {
        Self::with_observer(config, layout, Box::new(NullObserver))
    }

    /// Build a colony that reports a snapshot to `observer` after every tick.
    pub fn with_observer(
        config: ColonyConfig,
        layout: ColonyLayout,
        observer: Box<dyn ColonyObserver>,
    ) -> Result<Self, ColonyError> {
        let simulation_length = config.validate()?;
        let hive_bounds = config.hive_bounds();
        let world_bounds = config.world_bounds();

        let mut combs = CombGrid::new(hive_bounds, config.comb_capacity)?;
        for seed in &layout.combs {
            combs.add_comb(seed.position, seed.occupancy)?;
        }
        for &start in &layout.bees {
            if !start.is_within(hive_bounds) {
                return Err(ColonyError::OutOfBounds {
                    entity: "bee",
                    x: start.x(),
                    y: start.y(),
                });
            }
        }
        for resident in &layout.residents {
            if !resident.position.is_within(hive_bounds) {
                return Err(ColonyError::OutOfBounds {
                    entity: match resident.kind {
                        ResidentKind::Queen => "queen",
                        ResidentKind::Drone => "drone",
                    },
                    x: resident.position.x(),
                    y: resident.position.y(),
                });
            }
        }
        for obstacle in &layout.obstacles {
            if !obstacle.position.is_within(world_bounds) {
                return Err(ColonyError::OutOfBounds {
                    entity: match obstacle.kind {
                        ObstacleKind::Tree => "tree",
                        ObstacleKind::Barrier => "barrier",
                    },
                    x: obstacle.position.x(),
                    y: obstacle.position.y(),
                });
            }
        }

        let occupied = OccupiedCells::new(
            config.portal_world,
            layout.residents.iter().map(|resident| resident.position),
            layout.obstacles.iter().map(|obstacle| obstacle.position),
        );

        let mut flowers = SlotMap::with_capacity_and_key(layout.flowers.len());
        for seed in &layout.flowers {
            let (x, y) = (seed.position.x(), seed.position.y());
            if !seed.position.is_within(world_bounds) {
                return Err(ColonyError::OutOfBounds {
                    entity: "flower",
                    x,
                    y,
                });
            }
            if seed.nectar == 0 {
                return Err(ColonyError::EmptyFlower { x, y });
            }
            if occupied.is_obstacle(seed.position) {
                return Err(ColonyError::FlowerBlocked { x, y });
            }
            flowers.insert(Flower::new(seed.position, seed.nectar));
        }

        let steps_per_tick = match config.speed_override {
            Some(steps) => steps,
            None => calibrate::steps_per_tick(
                config.portal_world,
                layout.flowers.iter().map(|seed| seed.position),
                simulation_length,
            ),
        };

        let mut bees = SlotMap::with_capacity_and_key(layout.bees.len());
        for &start in &layout.bees {
            bees.insert(WorkerBee::new(start, config.portal_world));
        }

        let mut claims = ClaimBook::new();
        if config.preassign_flowers {
            stage_preassign(&mut bees, &flowers, &mut claims);
        }

        debug!(
            bees = bees.len(),
            flowers = flowers.len(),
            combs = combs.combs().len(),
            steps_per_tick,
            "colony initialised"
        );

        let history_capacity = config.history_capacity;
        Ok(Self {
            config,
            tick: Tick::zero(),
            steps_per_tick,
            bees,
            flowers,
            combs,
            residents: layout.residents,
            obstacles: layout.obstacles,
            claims,
            occupied,
            observer,
            history: VecDeque::with_capacity(history_capacity),
        })
    }

    /// Execute one tick of the five-phase pipeline, returning emitted events.
    pub fn step(&mut self) -> TickEvents {
        let next_tick = self.tick.next();
        let exits = stage_aging_and_targeting(
            &mut self.bees,
            &self.combs,
            &self.flowers,
            &mut self.claims,
            &self.config,
        );
        let bees_moved = stage_movement(
            &mut self.bees,
            &mut self.occupied,
            self.steps_per_tick,
            &self.config,
        );
        let (collections, depletions) = stage_collection(
            &mut self.bees,
            &mut self.flowers,
            &mut self.claims,
            &self.combs,
            self.config.portal_hive,
        );
        let reentries = stage_reentry(&mut self.bees, &self.config);
        let (deposits, stalled_deposits) = stage_deposit(&mut self.bees, &mut self.combs);

        self.tick = next_tick;
        self.stage_record();

        TickEvents {
            tick: next_tick,
            exits,
            bees_moved,
            collections,
            depletions,
            reentries,
            deposits,
            stalled_deposits,
        }
    }

    /// Step until the configured simulation length has elapsed.
    pub fn run(&mut self) -> Vec<TickEvents> {
        let mut events = Vec::new();
        while !self.is_finished() {
            events.push(self.step());
        }
        events
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.tick.0 >= u64::from(self.config.simulation_length)
    }

    fn stage_record(&mut self) {
        let summary = self.summarize();
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
        let snapshot = self.snapshot();
        self.observer.on_tick(&snapshot);
    }

    fn summarize(&self) -> TickSummary {
        let bees_in_hive = self
            .bees
            .values()
            .filter(|bee| bee.location() == Location::InHive)
            .count();
        TickSummary {
            tick: self.tick,
            bees_in_hive,
            bees_in_world: self.bees.len() - bees_in_hive,
            bees_carrying: self.bees.values().filter(|bee| bee.is_carrying()).count(),
            stored_nectar: self.combs.total_stored(),
            active_flowers: self.flowers.values().filter(|f| f.is_active()).count(),
            remaining_nectar: self.flowers.values().map(Flower::nectar).sum(),
        }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ColonySnapshot {
        let maturity_age = self.config.maturity_age;
        ColonySnapshot {
            tick: self.tick,
            steps_per_tick: self.steps_per_tick,
            bees: self
                .bees
                .iter()
                .map(|(id, bee)| BeeSnapshot {
                    id,
                    phase: bee.phase(maturity_age),
                    position: bee.position(),
                    carrying: bee.is_carrying(),
                    age: bee.age(),
                })
                .collect(),
            combs: self
                .combs
                .combs()
                .iter()
                .map(|&position| CombSnapshot {
                    position,
                    occupancy: self.combs.occupancy(position).unwrap_or(0),
                    capacity: self.combs.capacity(),
                })
                .collect(),
            flowers: self
                .flowers
                .iter()
                .map(|(id, flower)| FlowerSnapshot {
                    id,
                    position: flower.position(),
                    nectar: flower.nectar(),
                    active: flower.is_active(),
                    claimed_by: self.claims.holder(id),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Grid steps each bee takes per tick, fixed at construction.
    #[must_use]
    pub const fn steps_per_tick(&self) -> u32 {
        self.steps_per_tick
    }

    #[must_use]
    pub fn bees(&self) -> &SlotMap<BeeId, WorkerBee> {
        &self.bees
    }

    #[must_use]
    pub fn bee(&self, id: BeeId) -> Option<&WorkerBee> {
        self.bees.get(id)
    }

    /// Every flower, depleted ones included.
    #[must_use]
    pub fn flowers(&self) -> &SlotMap<FlowerId, Flower> {
        &self.flowers
    }

    #[must_use]
    pub fn flower(&self, id: FlowerId) -> Option<&Flower> {
        self.flowers.get(id)
    }

    #[must_use]
    pub fn combs(&self) -> &CombGrid {
        &self.combs
    }

    #[must_use]
    pub fn claims(&self) -> &ClaimBook {
        &self.claims
    }

    #[must_use]
    pub fn residents(&self) -> &[Resident] {
        &self.residents
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Iterate over retained tick summaries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TickSummary> {
        self.history.iter()
    }

    /// Replace the observer sink.
    pub fn set_observer(&mut self, observer: Box<dyn ColonyObserver>) {
        self.observer = observer;
    }
}

/// Pair the i-th bee with the i-th flower before the first tick.
fn stage_preassign(
    bees: &mut SlotMap<BeeId, WorkerBee>,
    flowers: &SlotMap<FlowerId, Flower>,
    claims: &mut ClaimBook,
) {
    for ((bee_id, bee), (flower_id, flower)) in bees.iter_mut().zip(flowers.iter()) {
        if claims.claim(flower_id, bee_id) {
            bee.set_flower_target(flower_id, flower.position());
            debug!(bee = ?bee_id, flower = ?flower_id, "flower preassigned");
        }
    }
}

/// Phase 1: age every bee, send idle mature bees out through the portal, and hand flower
/// claims to targetless foragers.
fn stage_aging_and_targeting(
    bees: &mut SlotMap<BeeId, WorkerBee>,
    combs: &CombGrid,
    flowers: &SlotMap<FlowerId, Flower>,
    claims: &mut ClaimBook,
    config: &ColonyConfig,
) -> usize {
    let mut exits = 0;
    for (bee_id, bee) in bees.iter_mut() {
        bee.advance_age();
        if !bee.is_mature(config.maturity_age) {
            continue;
        }
        if bee.location() == Location::InHive && !bee.is_carrying() {
            let comb = bee.choose_comb(combs);
            bee.exit_hive(config.portal_world);
            exits += 1;
            debug!(bee = ?bee_id, ?comb, "bee left the hive");
        }
        if bee.location() == Location::InWorld
            && !bee.is_carrying()
            && bee.target_flower().is_none()
        {
            if let Some((flower_id, position)) =
                nearest_unclaimed_flower(bee.world_pos(), flowers, claims)
            {
                if claims.claim(flower_id, bee_id) {
                    bee.set_flower_target(flower_id, position);
                    debug!(bee = ?bee_id, flower = ?flower_id, %position, "flower claimed");
                }
            }
        }
    }
    exits
}

/// Phase 2: capture occupied cells once, then let every bee take its steps.
fn stage_movement(
    bees: &mut SlotMap<BeeId, WorkerBee>,
    occupied: &mut OccupiedCells,
    steps: u32,
    config: &ColonyConfig,
) -> usize {
    occupied.reset();
    for bee in bees.values() {
        match bee.position() {
            BeePosition::Hive(cell) => occupied.insert_hive(cell),
            BeePosition::World(cell) => occupied.insert_world(cell),
        }
    }
    let ctx = MoveContext {
        hive_bounds: config.hive_bounds(),
        world_bounds: config.world_bounds(),
        portal_world: config.portal_world,
        maturity_age: config.maturity_age,
        occupied: &*occupied,
    };
    let mut moved = 0;
    for bee in bees.values_mut() {
        if bee.advance(steps, &ctx) > 0 {
            moved += 1;
        }
    }
    moved
}

/// Phase 3: bees standing on their claimed flower take one unit. Depleted flowers are then
/// reconciled across the whole population.
fn stage_collection(
    bees: &mut SlotMap<BeeId, WorkerBee>,
    flowers: &mut SlotMap<FlowerId, Flower>,
    claims: &mut ClaimBook,
    combs: &CombGrid,
    portal_hive: HiveCoord,
) -> (usize, Vec<FlowerId>) {
    let mut collections = 0;
    let mut depleted = Vec::new();
    for (bee_id, bee) in bees.iter_mut() {
        if !bee.is_on_target_flower() {
            continue;
        }
        let Some(target) = bee.target_flower() else {
            continue;
        };
        let Some(flower) = flowers
            .get_mut(target.id)
            .filter(|flower| flower.is_active())
        else {
            bee.forget_flower(target.id);
            if claims.holder(target.id) == Some(bee_id) {
                claims.release(target.id);
            }
            continue;
        };
        let emptied = flower.collect();
        bee.take_nectar();
        if claims.holder(target.id) == Some(bee_id) {
            claims.release(target.id);
        }
        let comb = bee.confirm_comb(combs, portal_hive);
        collections += 1;
        debug!(
            bee = ?bee_id,
            flower = ?target.id,
            remaining = flower.nectar(),
            ?comb,
            "nectar collected"
        );
        if emptied {
            depleted.push(target.id);
        }
    }

    for &flower_id in &depleted {
        claims.release(flower_id);
        for (bee_id, bee) in bees.iter_mut() {
            if bee.forget_flower(flower_id) {
                debug!(bee = ?bee_id, flower = ?flower_id, "dropped target on depleted flower");
            }
        }
        debug!(flower = ?flower_id, "flower depleted");
    }
    (collections, depleted)
}

/// Phase 4: loaded bees standing on the portal drop into the hive.
fn stage_reentry(bees: &mut SlotMap<BeeId, WorkerBee>, config: &ColonyConfig) -> usize {
    let mut reentries = 0;
    for (bee_id, bee) in bees.iter_mut() {
        if bee.is_ready_to_enter(config.portal_world) {
            bee.enter_hive(config.portal_hive);
            reentries += 1;
            debug!(bee = ?bee_id, "bee re-entered the hive");
        }
    }
    reentries
}

/// Phase 5: loaded bees inside the hive try to deposit.
fn stage_deposit(bees: &mut SlotMap<BeeId, WorkerBee>, combs: &mut CombGrid) -> (usize, usize) {
    let mut deposits = 0;
    let mut stalled = 0;
    for (bee_id, bee) in bees.iter_mut() {
        if bee.location() != Location::InHive || !bee.is_carrying() {
            continue;
        }
        match bee.deposit(combs) {
            DepositOutcome::Deposited(comb) => {
                deposits += 1;
                debug!(bee = ?bee_id, %comb, "nectar deposited");
            }
            DepositOutcome::Stalled => {
                stalled += 1;
                debug!(bee = ?bee_id, target = ?bee.target_comb(), "deposit stalled");
            }
            DepositOutcome::NothingCarried => {}
        }
    }
    (deposits, stalled)
}
