//! Integer grid coordinates for the two coupled spaces (hive interior and outdoor world).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Marker trait for a coordinate space. Coordinates of different spaces never mix.
pub trait Space: Copy + Eq + Hash + Default + fmt::Debug + Send + Sync + 'static {
    /// Short label used in debug output.
    const NAME: &'static str;
}

/// Interior hive grid holding comb cells, the queen and drones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hive;

/// Outdoor grid holding flowers, trees and barriers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct World;

impl Space for Hive {
    const NAME: &'static str = "hive";
}

impl Space for World {
    const NAME: &'static str = "world";
}

/// Cell coordinate tagged with the space it belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct GridCoord<S: Space> {
    x: i32,
    y: i32,
    #[serde(skip)]
    space: PhantomData<S>,
}

pub type HiveCoord = GridCoord<Hive>;
pub type WorldCoord = GridCoord<World>;

impl<S: Space> GridCoord<S> {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted by `(dx, dy)` within the same space.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    #[must_use]
    pub fn is_within(self, bounds: GridBounds) -> bool {
        self.x >= 0
            && self.y >= 0
            && (self.x as u32) < bounds.width
            && (self.y as u32) < bounds.height
    }
}

impl<S: Space> fmt::Debug for GridCoord<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", S::NAME, self.x, self.y)
    }
}

impl<S: Space> fmt::Display for GridCoord<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Half-open rectangle `[0, width) x [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: u32,
    pub height: u32,
}

impl GridBounds {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// One greedy step from `from` toward `target`.
///
/// Candidates are tried in a fixed order: the sign-of-delta step (diagonal when both axes
/// differ), then `+x`, `-x`, `+y`, `-y`. The first candidate inside `bounds` that `blocked`
/// rejects is skipped; the first acceptable one is returned. `None` means the mover is already
/// on its target or every candidate is unusable this sub-step.
pub fn greedy_step<S: Space>(
    from: GridCoord<S>,
    target: GridCoord<S>,
    bounds: GridBounds,
    blocked: impl Fn(GridCoord<S>) -> bool,
) -> Option<GridCoord<S>> {
    if from == target {
        return None;
    }
    let dx = (target.x - from.x).signum();
    let dy = (target.y - from.y).signum();
    let candidates = [
        from.offset(dx, dy),
        from.offset(1, 0),
        from.offset(-1, 0),
        from.offset(0, 1),
        from.offset(0, -1),
    ];
    candidates
        .into_iter()
        .find(|&cell| cell.is_within(bounds) && !blocked(cell))
}
