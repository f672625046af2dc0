//! Building archetypes and sprite-stage selection.
//!
//! An archetype's sprite list is ordered: intact, damage stages, destroyed,
//! then any regrowth stages. `stages` counts the first group (3 or 4), so the
//! destroyed sprite sits at `stages - 1` and regrowth sprites start at `stages`.

use serde::{Deserialize, Serialize};

/// How a destroyed building comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegenClass {
    /// Stays destroyed.
    None = 0,
    /// Regrows through five intermediate sprites.
    MultiStage = 1,
    /// Regrows through a single alternate sprite.
    SingleStage = 2,
    /// Recovers health, sprite stays destroyed until fully repaired.
    RepairOnly = 3,
}

impl RegenClass {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::MultiStage),
            2 => Some(Self::SingleStage),
            3 => Some(Self::RepairOnly),
            _ => None,
        }
    }

    /// Whether a destroyed building of this class joins the regrowth list.
    pub fn regrows(self) -> bool {
        self != Self::None
    }

    /// Number of regrowth sprites after the destroyed sprite.
    pub fn regrowth_sprites(self) -> usize {
        match self {
            Self::MultiStage => 5,
            Self::SingleStage => 1,
            Self::None | Self::RepairOnly => 0,
        }
    }
}

/// Immutable description of a kind of building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingArchetype {
    pub name: &'static str,
    /// Footprint along x, extending toward decreasing x from the anchor.
    pub width: i32,
    /// Footprint along y, extending toward decreasing y from the anchor.
    pub height: i32,
    pub tall: bool,
    pub regen: RegenClass,
    /// Intact + damage + destroyed sprite count (3 or 4).
    pub stages: usize,
    pub max_health: i32,
    pub sprites: &'static [&'static str],
}

/// Lower bounds of the five multi-stage regrowth sprites, plus the ratio at
/// which the last stage ends.
const MULTI_STAGE_THRESHOLDS: [f64; 6] = [0.15, 0.25, 0.45, 0.60, 0.75, 0.90];

/// Ratio above which a single-stage archetype shows its regrowth sprite.
const SINGLE_STAGE_THRESHOLD: f64 = 0.15;

impl BuildingArchetype {
    pub const INTACT: usize = 0;

    pub fn destroyed_index(&self) -> usize {
        self.stages - 1
    }

    /// Sprite for a building that took damage and still has `health`.
    pub fn damage_index(&self, health: i32) -> usize {
        if health <= 0 {
            return self.destroyed_index();
        }
        if self.stages >= 4 && health * 2 <= self.max_health {
            2
        } else {
            1
        }
    }

    /// Sprite to show for a regrowing building at `health`, or `None` to keep
    /// whatever is currently shown.
    pub fn regrowth_index(&self, health: i32) -> Option<usize> {
        let ratio = f64::from(health) / f64::from(self.max_health.max(1));
        match self.regen {
            RegenClass::MultiStage => MULTI_STAGE_THRESHOLDS
                .windows(2)
                .position(|w| ratio >= w[0] && ratio < w[1])
                .map(|stage| self.stages + stage),
            RegenClass::SingleStage => Some(if ratio > SINGLE_STAGE_THRESHOLD {
                self.stages
            } else {
                self.destroyed_index()
            }),
            RegenClass::None | RegenClass::RepairOnly => None,
        }
    }

    pub fn sprite(&self, index: usize) -> Option<&'static str> {
        self.sprites.get(index).copied()
    }

    /// Offsets of every footprint tile relative to the anchor tile.
    pub fn footprint(&self) -> impl Iterator<Item = (i32, i32)> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |dy| (0..w).map(move |dx| (-dx, -dy)))
    }
}

/// The placeable building catalog. Placement records refer to buildings by
/// their index in this table.
pub static CATALOG: [BuildingArchetype; 13] = [
    BuildingArchetype {
        name: "house_small",
        width: 2,
        height: 2,
        tall: false,
        regen: RegenClass::RepairOnly,
        stages: 3,
        max_health: 25,
        sprites: &["house_small", "house_small_damaged", "house_small_ruin"],
    },
    BuildingArchetype {
        name: "house_large",
        width: 3,
        height: 2,
        tall: false,
        regen: RegenClass::None,
        stages: 4,
        max_health: 60,
        sprites: &[
            "house_large",
            "house_large_damaged",
            "house_large_wrecked",
            "house_large_ruin",
        ],
    },
    BuildingArchetype {
        name: "apartment",
        width: 3,
        height: 3,
        tall: true,
        regen: RegenClass::None,
        stages: 4,
        max_health: 120,
        sprites: &[
            "apartment",
            "apartment_damaged",
            "apartment_wrecked",
            "apartment_ruin",
        ],
    },
    BuildingArchetype {
        name: "mosque",
        width: 4,
        height: 4,
        tall: true,
        regen: RegenClass::RepairOnly,
        stages: 4,
        max_health: 150,
        sprites: &["mosque", "mosque_damaged", "mosque_wrecked", "mosque_ruin"],
    },
    BuildingArchetype {
        name: "minaret",
        width: 1,
        height: 1,
        tall: true,
        regen: RegenClass::None,
        stages: 3,
        max_health: 40,
        sprites: &["minaret", "minaret_damaged", "minaret_ruin"],
    },
    BuildingArchetype {
        name: "market_stall",
        width: 2,
        height: 1,
        tall: false,
        regen: RegenClass::RepairOnly,
        stages: 3,
        max_health: 15,
        sprites: &["market_stall", "market_stall_damaged", "market_stall_ruin"],
    },
    BuildingArchetype {
        name: "shop",
        width: 2,
        height: 2,
        tall: false,
        regen: RegenClass::RepairOnly,
        stages: 3,
        max_health: 35,
        sprites: &["shop", "shop_damaged", "shop_ruin"],
    },
    BuildingArchetype {
        name: "water_tower",
        width: 2,
        height: 2,
        tall: true,
        regen: RegenClass::None,
        stages: 3,
        max_health: 50,
        sprites: &["water_tower", "water_tower_damaged", "water_tower_ruin"],
    },
    BuildingArchetype {
        name: "palm_tree",
        width: 1,
        height: 1,
        tall: false,
        regen: RegenClass::SingleStage,
        stages: 3,
        max_health: 20,
        sprites: &[
            "palm_tree",
            "palm_tree_damaged",
            "palm_tree_stump",
            "palm_tree_sapling",
        ],
    },
    BuildingArchetype {
        name: "olive_tree",
        width: 1,
        height: 1,
        tall: false,
        regen: RegenClass::MultiStage,
        stages: 3,
        max_health: 20,
        sprites: &[
            "olive_tree",
            "olive_tree_damaged",
            "olive_tree_stump",
            "olive_tree_grow_1",
            "olive_tree_grow_2",
            "olive_tree_grow_3",
            "olive_tree_grow_4",
            "olive_tree_grow_5",
        ],
    },
    BuildingArchetype {
        name: "shrub",
        width: 1,
        height: 1,
        tall: false,
        regen: RegenClass::MultiStage,
        stages: 3,
        max_health: 10,
        sprites: &[
            "shrub",
            "shrub_damaged",
            "shrub_burnt",
            "shrub_grow_1",
            "shrub_grow_2",
            "shrub_grow_3",
            "shrub_grow_4",
            "shrub_grow_5",
        ],
    },
    BuildingArchetype {
        name: "wall",
        width: 1,
        height: 1,
        tall: false,
        regen: RegenClass::None,
        stages: 3,
        max_health: 30,
        sprites: &["wall", "wall_damaged", "wall_rubble"],
    },
    BuildingArchetype {
        name: "well",
        width: 1,
        height: 1,
        tall: false,
        regen: RegenClass::RepairOnly,
        stages: 3,
        max_health: 25,
        sprites: &["well", "well_damaged", "well_rubble"],
    },
];

/// Look up an archetype by placement index. Out-of-range indices are `None`.
pub fn archetype(index: i32) -> Option<&'static BuildingArchetype> {
    usize::try_from(index).ok().and_then(|i| CATALOG.get(i))
}

/// Index of the archetype with the given name.
pub fn archetype_index(name: &str) -> Option<i32> {
    CATALOG
        .iter()
        .position(|a| a.name == name)
        .and_then(|i| i32::try_from(i).ok())
}
