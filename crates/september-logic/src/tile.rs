//! Integer tile coordinates.

use serde::{Deserialize, Serialize};

/// A cell on the logical tile grid.
///
/// Coordinates are signed so that neighbours of edge tiles can be expressed
/// and rejected by bounds checks instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This tile shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Square-ring distance: the number of king moves between two tiles.
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    /// Whether the tile lies on a `size`×`size` grid.
    pub fn in_bounds(self, size: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < size && self.y < size
    }

    /// Clamp both coordinates onto a `size`×`size` grid.
    pub fn clamped(self, size: i32) -> Self {
        let max = (size - 1).max(0);
        Self {
            x: self.x.clamp(0, max),
            y: self.y.clamp(0, max),
        }
    }
}
