//! Initial placement of every entity, handed to [`crate::Colony::new`].

use crate::entities::{Obstacle, ObstacleKind, Resident, ResidentKind};
use crate::grid::{HiveCoord, WorldCoord};
use serde::{Deserialize, Serialize};

/// Comb cell and the nectar it already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombSeed {
    pub position: HiveCoord,
    pub occupancy: u32,
}

/// Flower position and starting nectar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerSeed {
    pub position: WorldCoord,
    pub nectar: u32,
}

/// Fully formed initial world. Entity order is preserved and defines every scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyLayout {
    /// Starting hive cell of each worker bee.
    pub bees: Vec<HiveCoord>,
    pub residents: Vec<Resident>,
    pub combs: Vec<CombSeed>,
    pub flowers: Vec<FlowerSeed>,
    pub obstacles: Vec<Obstacle>,
}

impl ColonyLayout {
    /// Worker start cells along the hive's side walls.
    pub const BEE_STARTS: [(i32, i32); 6] = [(0, 6), (0, 4), (0, 2), (10, 6), (10, 4), (10, 2)];
    pub const QUEEN: (i32, i32) = (5, 5);
    pub const DRONES: [(i32, i32); 4] = [(3, 7), (7, 7), (3, 3), (7, 3)];
    /// The comb column down the middle of the hive, in scan order.
    pub const COMBS: [(i32, i32); 5] = [(5, 0), (5, 2), (5, 4), (5, 6), (5, 8)];

    /// Standard 11x10 hive with up to six workers, a queen, four drones and five empty combs.
    /// Flowers and obstacles are left for the caller.
    #[must_use]
    pub fn standard(bees: usize) -> Self {
        let mut residents = vec![Resident {
            kind: ResidentKind::Queen,
            position: HiveCoord::new(Self::QUEEN.0, Self::QUEEN.1),
        }];
        residents.extend(Self::DRONES.iter().map(|&(x, y)| Resident {
            kind: ResidentKind::Drone,
            position: HiveCoord::new(x, y),
        }));
        Self {
            bees: Self::BEE_STARTS
                .iter()
                .take(bees)
                .map(|&(x, y)| HiveCoord::new(x, y))
                .collect(),
            residents,
            combs: Self::COMBS
                .iter()
                .map(|&(x, y)| CombSeed {
                    position: HiveCoord::new(x, y),
                    occupancy: 0,
                })
                .collect(),
            flowers: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_flower(mut self, x: i32, y: i32, nectar: u32) -> Self {
        self.flowers.push(FlowerSeed {
            position: WorldCoord::new(x, y),
            nectar,
        });
        self
    }

    #[must_use]
    pub fn with_obstacle(mut self, kind: ObstacleKind, x: i32, y: i32) -> Self {
        self.obstacles.push(Obstacle {
            kind,
            position: WorldCoord::new(x, y),
        });
        self
    }

    /// Set every comb's starting occupancy.
    #[must_use]
    pub fn with_comb_fill(mut self, occupancy: u32) -> Self {
        for comb in &mut self.combs {
            comb.occupancy = occupancy;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_caps_workers_at_six() {
        let layout = ColonyLayout::standard(3);
        assert_eq!(
            layout.bees,
            vec![
                HiveCoord::new(0, 6),
                HiveCoord::new(0, 4),
                HiveCoord::new(0, 2)
            ]
        );
        assert_eq!(ColonyLayout::standard(10).bees.len(), 6);
        assert_eq!(layout.residents.len(), 5);
        assert_eq!(layout.residents[0].kind, ResidentKind::Queen);
        assert_eq!(layout.combs.len(), 5);
        assert!(layout.combs.iter().all(|comb| comb.occupancy == 0));
    }

    #[test]
    fn builders_append_in_order() {
        let layout = ColonyLayout::standard(1)
            .with_flower(1, 2, 3)
            .with_flower(4, 5, 1)
            .with_obstacle(ObstacleKind::Tree, 7, 7)
            .with_comb_fill(5);
        assert_eq!(layout.flowers[0].position, WorldCoord::new(1, 2));
        assert_eq!(layout.flowers[1].nectar, 1);
        assert_eq!(layout.obstacles[0].kind, ObstacleKind::Tree);
        assert!(layout.combs.iter().all(|comb| comb.occupancy == 5));
    }
}
