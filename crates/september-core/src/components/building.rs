//! Building components: placed instances, placement records, hit results.

use serde::{Deserialize, Serialize};

use september_logic::buildings::{BuildingArchetype, CATALOG};
use september_logic::TilePos;

/// Index of a building in the registry's placement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub usize);

/// One record of the editor's placement list.
///
/// `archetype` indexes the building catalog; out-of-range values are
/// skipped at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub archetype: i32,
    pub tile_x: i32,
    pub tile_y: i32,
}

impl Placement {
    pub fn new(archetype: i32, tile_x: i32, tile_y: i32) -> Self {
        Self {
            archetype,
            tile_x,
            tile_y,
        }
    }

    pub fn tile(&self) -> TilePos {
        TilePos::new(self.tile_x, self.tile_y)
    }
}

/// A placed building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Catalog index; always valid for a placed building.
    pub archetype: usize,
    /// Bottom-right-most footprint tile.
    pub anchor: TilePos,
    /// Current health. A destroyed building sits at the negative sentinel.
    pub health: i32,
    pub destroyed: bool,
    /// Index into the archetype's sprite list.
    pub sprite: usize,
}

impl Building {
    pub(crate) fn new(archetype: usize, anchor: TilePos, info: &BuildingArchetype) -> Self {
        Self {
            archetype,
            anchor,
            health: info.max_health,
            destroyed: false,
            sprite: BuildingArchetype::INTACT,
        }
    }

    pub fn info(&self) -> &'static BuildingArchetype {
        // Placement only accepts valid catalog indices.
        CATALOG.get(self.archetype).unwrap_or(&CATALOG[0])
    }

    pub fn sprite_id(&self) -> Option<&'static str> {
        self.info().sprite(self.sprite)
    }

    pub fn is_tall(&self) -> bool {
        self.info().tall
    }

    /// Every tile covered by this building.
    pub fn footprint(&self) -> impl Iterator<Item = TilePos> + '_ {
        let anchor = self.anchor;
        self.info()
            .footprint()
            .map(move |(dx, dy)| anchor.offset(dx, dy))
    }
}

/// Which part of a building sprite a tap landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitPart {
    /// Upper half of a tall building that is above half health.
    Upper,
    /// Lower half of a tall building that is above half health.
    Lower,
    /// Anywhere on any other building.
    Whole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingHit {
    pub building: BuildingId,
    pub part: HitPart,
}
