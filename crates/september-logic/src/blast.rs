//! Blast damage kernel.
//!
//! Damage falls off in concentric square rings (Chebyshev distance) from the
//! impact tile: `center - ring * decrement`, never below 1. The kernel is
//! computed once and indexed by offset from the blast's bounding-box corner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastGrid {
    radius: i32,
    cells: Vec<i32>,
}

impl BlastGrid {
    pub fn new(radius: i32, center_damage: i32, ring_decrement: i32) -> Self {
        let radius = radius.max(0);
        let side = 2 * radius + 1;
        let mut cells = Vec::with_capacity((side * side) as usize);
        for y in 0..side {
            for x in 0..side {
                let ring = (x - radius).abs().max((y - radius).abs());
                cells.push((center_damage - ring * ring_decrement).max(1));
            }
        }
        Self { radius, cells }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Side length of the kernel in tiles.
    pub fn side(&self) -> i32 {
        2 * self.radius + 1
    }

    /// Damage at `(x, y)` measured from the kernel's top-left corner.
    pub fn damage_at(&self, x: i32, y: i32) -> Option<i32> {
        let side = self.side();
        if x < 0 || y < 0 || x >= side || y >= side {
            return None;
        }
        self.cells.get((y * side + x) as usize).copied()
    }

    /// Damage at an offset from the impact tile.
    pub fn damage_from_center(&self, dx: i32, dy: i32) -> Option<i32> {
        self.damage_at(dx + self.radius, dy + self.radius)
    }

    /// Every `(dx, dy, damage)` cell, offsets relative to the impact tile.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let side = self.side();
        let radius = self.radius;
        self.cells.iter().enumerate().map(move |(i, &damage)| {
            let i = i as i32;
            (i % side - radius, i / side - radius, damage)
        })
    }
}
