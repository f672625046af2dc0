//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};

/// Screen-space displacement in pixels.
///
/// Used for sub-tile pedestrian motion and for the exact tap point of a
/// strike relative to its tile center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenOffset {
    pub x: f64,
    pub y: f64,
}

impl ScreenOffset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl std::ops::Add for ScreenOffset {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}
