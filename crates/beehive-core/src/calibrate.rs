//! One-shot speed calibration run before the first tick.

use crate::grid::WorldCoord;
use std::num::NonZeroU32;

/// Grid steps each bee takes per tick so the farthest flower's round trip from `portal` fits
/// inside `simulation_length` ticks of unobstructed travel.
///
/// `ceil(2 * max_manhattan / simulation_length)`, never below 1. Pure function of its inputs.
#[must_use]
pub fn steps_per_tick(
    portal: WorldCoord,
    flowers: impl IntoIterator<Item = WorldCoord>,
    simulation_length: NonZeroU32,
) -> u32 {
    let farthest = flowers
        .into_iter()
        .map(|flower| u64::from(portal.manhattan_distance(flower)))
        .max()
        .unwrap_or(0);
    let round_trip = farthest * 2;
    let steps = round_trip.div_ceil(u64::from(simulation_length.get()));
    u32::try_from(steps).unwrap_or(u32::MAX).max(1)
}
