//! Sprite lookup seam.
//!
//! Image decoding lives with the host. The engine only needs each sprite's
//! pixel size and draw anchor, keyed by sprite identifier. A missing sprite is
//! never an error: the caller skips the draw or hit test and keeps going.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use september_logic::buildings::CATALOG;
use september_logic::clips::PedestrianArchetype;
use september_logic::constants::strike;
use september_logic::iso::IsoProjection;

use crate::components::GroundScar;

/// Size and registration point of one sprite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteInfo {
    /// Anchor x measured from the sprite's left edge.
    pub reg_x: f64,
    /// Anchor y measured from the sprite's top edge.
    pub reg_y: f64,
    pub width: f64,
    pub height: f64,
}

impl SpriteInfo {
    pub fn new(reg_x: f64, reg_y: f64, width: f64, height: f64) -> Self {
        Self {
            reg_x,
            reg_y,
            width,
            height,
        }
    }

    /// Top-left corner when the anchor is placed at `(x, y)`.
    pub fn top_left(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.reg_x, y - self.reg_y)
    }

    /// Whether `(px, py)` falls inside the box anchored at `(x, y)`.
    pub fn contains(&self, x: f64, y: f64, px: f64, py: f64) -> bool {
        let (left, top) = self.top_left(x, y);
        px >= left && py >= top && px < left + self.width && py < top + self.height
    }
}

/// Anything that can report sprite bounds by identifier.
pub trait SpriteAtlas {
    fn sprite(&self, id: &str) -> Option<SpriteInfo>;
}

impl<A: SpriteAtlas + ?Sized> SpriteAtlas for &A {
    fn sprite(&self, id: &str) -> Option<SpriteInfo> {
        (**self).sprite(id)
    }
}

/// Map-backed atlas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticAtlas {
    sprites: HashMap<String, SpriteInfo>,
}

impl StaticAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, info: SpriteInfo) {
        self.sprites.insert(id.into(), info);
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Nominal bounds for every catalog sprite, pedestrian frame, missile
    /// frame and the scar, sized for the given tile steps.
    pub fn with_defaults(projection: IsoProjection) -> Self {
        let mut atlas = Self::new();
        let (step_x, step_y) = (projection.step_x, projection.step_y);

        for building in CATALOG.iter() {
            let w = f64::from(building.width);
            let h = f64::from(building.height);
            let width = step_x * w + step_y * h;
            let height = width / 2.0 + if building.tall { 96.0 } else { 32.0 };
            // Anchored at the bottom corner of the anchor tile.
            let info = SpriteInfo::new(step_x * w, height, width, height);
            for sprite in building.sprites {
                atlas.insert(*sprite, info);
            }
        }

        let pedestrian = SpriteInfo::new(16.0, 44.0, 32.0, 48.0);
        for archetype in PedestrianArchetype::ALL {
            let clips = archetype.clips();
            for frame in 0..clips.frame_count() {
                atlas.insert(clips.sprite_id(frame), pedestrian);
            }
        }

        let missile = SpriteInfo::new(64.0, 240.0, 128.0, 256.0);
        for frame in 0..strike::FRAME_COUNT {
            atlas.insert(format!("missile_{frame:03}"), missile);
        }

        atlas.insert(GroundScar::SPRITE, SpriteInfo::new(32.0, 16.0, 64.0, 32.0));
        atlas
    }
}

impl SpriteAtlas for StaticAtlas {
    fn sprite(&self, id: &str) -> Option<SpriteInfo> {
        self.sprites.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_catalog_and_clips() {
        let atlas = StaticAtlas::with_defaults(IsoProjection::new(0.0, 0.0, 32.0, 32.0));
        for building in CATALOG.iter() {
            for sprite in building.sprites {
                assert!(atlas.sprite(sprite).is_some(), "{sprite}");
            }
        }
        assert!(atlas.sprite("woman_000").is_some());
        assert!(atlas.sprite("missile_039").is_some());
        assert!(atlas.sprite("scar").is_some());
        assert!(atlas.sprite("no_such_sprite").is_none());
    }

    #[test]
    fn test_contains_uses_anchor() {
        let info = SpriteInfo::new(10.0, 20.0, 40.0, 30.0);
        assert!(info.contains(100.0, 100.0, 90.0, 80.0));
        assert!(info.contains(100.0, 100.0, 129.0, 109.0));
        assert!(!info.contains(100.0, 100.0, 130.0, 100.0));
        assert!(!info.contains(100.0, 100.0, 89.0, 100.0));
    }
}
