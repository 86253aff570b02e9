//! Seeded random placement of flowers, obstacles and comb fill around the standard hive.

use anyhow::{Result, bail};
use beehive_core::{ColonyConfig, ColonyLayout, ObstacleKind, WorldCoord};
use rand::Rng;
use std::collections::HashSet;

/// Cells tried per flower before giving up on a crowded world.
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Population knobs for [`random_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub bees: usize,
    pub flowers: usize,
    pub max_trees: u32,
    pub max_barriers: u32,
}

/// Build a layout for the standard hive with randomly scattered flowers and obstacles.
///
/// Trees and flowers avoid the world's first row and column; barriers may land anywhere.
/// Flowers never share a cell with an obstacle or the portal, and every comb starts with
/// between one unit and its capacity (at most five).
pub fn random_layout<R: Rng + ?Sized>(
    config: &ColonyConfig,
    options: &LayoutOptions,
    rng: &mut R,
) -> Result<ColonyLayout> {
    let width = i32::try_from(config.world_width)?;
    let height = i32::try_from(config.world_height)?;
    if width < 2 || height < 2 {
        bail!("world must be at least 2x2 cells to place flowers, got {width}x{height}");
    }

    let mut layout = ColonyLayout::standard(options.bees);
    let hive = config.hive_bounds();
    let fits = layout.bees.iter().all(|cell| cell.is_within(hive))
        && layout.residents.iter().all(|r| r.position.is_within(hive))
        && layout.combs.iter().all(|comb| comb.position.is_within(hive));
    if !fits {
        bail!(
            "the standard hive needs at least 11x10 cells, config sets {}x{}",
            config.hive_width,
            config.hive_height
        );
    }
    for comb in &mut layout.combs {
        comb.occupancy = rng.random_range(1..=config.comb_capacity.clamp(1, 5));
    }

    let mut blocked = HashSet::new();
    if options.max_trees > 0 {
        for _ in 0..rng.random_range(1..=options.max_trees) {
            let (x, y) = (rng.random_range(1..width), rng.random_range(1..height));
            blocked.insert(WorldCoord::new(x, y));
            layout = layout.with_obstacle(ObstacleKind::Tree, x, y);
        }
    }
    if options.max_barriers > 0 {
        for _ in 0..rng.random_range(1..=options.max_barriers) {
            let (x, y) = (rng.random_range(0..width), rng.random_range(0..height));
            blocked.insert(WorldCoord::new(x, y));
            layout = layout.with_obstacle(ObstacleKind::Barrier, x, y);
        }
    }

    for index in 0..options.flowers {
        let nectar = rng.random_range(1..=5);
        let mut placed = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let cell = WorldCoord::new(rng.random_range(1..width), rng.random_range(1..height));
            if cell == config.portal_world || blocked.contains(&cell) {
                continue;
            }
            layout = layout.with_flower(cell.x(), cell.y(), nectar);
            placed = true;
            break;
        }
        if !placed {
            bail!("no free cell found for flower {index} after {MAX_PLACEMENT_ATTEMPTS} attempts");
        }
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    fn options() -> LayoutOptions {
        LayoutOptions {
            bees: 4,
            flowers: 3,
            max_trees: 10,
            max_barriers: 10,
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let config = ColonyConfig::default();
        let a = random_layout(&config, &options(), &mut SmallRng::seed_from_u64(7)).expect("a");
        let b = random_layout(&config, &options(), &mut SmallRng::seed_from_u64(7)).expect("b");
        assert_eq!(a, b);
    }

    #[test]
    fn flowers_avoid_obstacles_and_portal() {
        let config = ColonyConfig::default();
        for seed in 0..50 {
            let layout = random_layout(&config, &options(), &mut SmallRng::seed_from_u64(seed))
                .expect("layout");
            assert_eq!(layout.bees.len(), 4);
            assert_eq!(layout.flowers.len(), 3);
            assert!(!layout.obstacles.is_empty());
            for flower in &layout.flowers {
                assert_ne!(flower.position, config.portal_world);
                assert!((1..=5).contains(&flower.nectar));
                assert!(flower.position.x() >= 1 && flower.position.y() >= 1);
                assert!(
                    layout
                        .obstacles
                        .iter()
                        .all(|obstacle| obstacle.position != flower.position)
                );
            }
            assert!(
                layout
                    .combs
                    .iter()
                    .all(|comb| (1..=5).contains(&comb.occupancy))
            );
        }
    }

    #[test]
    fn generated_layouts_build_colonies() {
        let config = ColonyConfig::default();
        let layout = random_layout(&config, &options(), &mut SmallRng::seed_from_u64(99))
            .expect("layout");
        let colony = beehive_core::Colony::new(config, layout).expect("colony");
        assert_eq!(colony.bees().len(), 4);
    }

    #[test]
    fn hive_smaller_than_standard_is_rejected() {
        let config = ColonyConfig {
            hive_width: 8,
            portal_hive: beehive_core::HiveCoord::new(5, 7),
            ..ColonyConfig::default()
        };
        let err = random_layout(&config, &options(), &mut SmallRng::seed_from_u64(3))
            .expect_err("hive too small");
        assert!(err.to_string().contains("11x10"), "{err}");
        assert!(err.to_string().contains("8x10"), "{err}");
    }

    #[test]
    fn tiny_world_is_rejected() {
        let config = ColonyConfig {
            world_width: 1,
            portal_world: WorldCoord::new(0, 0),
            ..ColonyConfig::default()
        };
        assert!(random_layout(&config, &options(), &mut SmallRng::seed_from_u64(1)).is_err());
    }
}
