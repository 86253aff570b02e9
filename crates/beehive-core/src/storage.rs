//! Comb storage inside the hive.

use crate::ColonyError;
use crate::grid::{GridBounds, HiveCoord};
use serde::{Deserialize, Serialize};

/// Dense hive-sized occupancy grid plus the ordered list of cells that are combs.
///
/// Only comb cells accept nectar; every other cell reports `None`. The comb list order is the
/// scan order used when a bee looks for the nearest comb with free space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombGrid {
    bounds: GridBounds,
    capacity: u32,
    cells: Vec<Option<u32>>,
    combs: Vec<HiveCoord>,
}

impl CombGrid {
    /// Construct an empty hive grid with no comb cells.
    pub fn new(bounds: GridBounds, capacity: u32) -> Result<Self, ColonyError> {
        if bounds.width == 0 || bounds.height == 0 {
            return Err(ColonyError::InvalidConfig(
                "hive grid dimensions must be non-zero",
            ));
        }
        if capacity == 0 {
            return Err(ColonyError::InvalidConfig("comb_capacity must be non-zero"));
        }
        Ok(Self {
            bounds,
            capacity,
            cells: vec![None; bounds.cell_count()],
            combs: Vec::new(),
        })
    }

    /// Register a comb cell holding `occupancy` units.
    pub fn add_comb(&mut self, position: HiveCoord, occupancy: u32) -> Result<(), ColonyError> {
        if !position.is_within(self.bounds) {
            return Err(ColonyError::OutOfBounds {
                entity: "comb",
                x: position.x(),
                y: position.y(),
            });
        }
        if occupancy > self.capacity {
            return Err(ColonyError::CombOverfilled {
                x: position.x(),
                y: position.y(),
                occupancy,
                capacity: self.capacity,
            });
        }
        let idx = self.offset(position);
        if self.cells[idx].is_some() {
            return Err(ColonyError::DuplicateComb {
                x: position.x(),
                y: position.y(),
            });
        }
        self.cells[idx] = Some(occupancy);
        self.combs.push(position);
        Ok(())
    }

    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Comb cells in scan order.
    #[must_use]
    pub fn combs(&self) -> &[HiveCoord] {
        &self.combs
    }

    /// Row-major occupancy array; `None` marks cells that are not combs.
    #[must_use]
    pub fn cells(&self) -> &[Option<u32>] {
        &self.cells
    }

    /// Returns the flat index for a coordinate already known to be in bounds.
    #[inline]
    fn offset(&self, position: HiveCoord) -> usize {
        (position.y() as usize) * (self.bounds.width as usize) + (position.x() as usize)
    }

    /// Occupancy of a comb cell, or `None` when the cell is not a comb.
    #[must_use]
    pub fn occupancy(&self, position: HiveCoord) -> Option<u32> {
        if position.is_within(self.bounds) {
            self.cells[self.offset(position)]
        } else {
            None
        }
    }

    #[must_use]
    pub fn has_space(&self, position: HiveCoord) -> bool {
        self.occupancy(position)
            .is_some_and(|occupancy| occupancy < self.capacity)
    }

    /// Nearest comb (Manhattan) with free space; ties go to the earliest comb in scan order.
    #[must_use]
    pub fn nearest_with_space(&self, from: HiveCoord) -> Option<HiveCoord> {
        let mut best: Option<(HiveCoord, u32)> = None;
        for &comb in &self.combs {
            if !self.has_space(comb) {
                continue;
            }
            let distance = from.manhattan_distance(comb);
            if best.is_none_or(|(_, min)| distance < min) {
                best = Some((comb, distance));
            }
        }
        best.map(|(comb, _)| comb)
    }

    /// Add one unit to a comb. Returns `false`, leaving the grid untouched, when the cell is
    /// full or not a comb.
    pub fn deposit(&mut self, position: HiveCoord) -> bool {
        if !self.has_space(position) {
            return false;
        }
        let idx = self.offset(position);
        if let Some(occupancy) = self.cells[idx].as_mut() {
            *occupancy += 1;
            return true;
        }
        false
    }

    /// Total units stored across all combs.
    #[must_use]
    pub fn total_stored(&self) -> u32 {
        self.cells.iter().flatten().sum()
    }
}
