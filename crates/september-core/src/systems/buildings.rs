//! Building registry - placement, blast damage, regrowth and hit testing

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use september_logic::blast::BlastGrid;
use september_logic::buildings::{archetype, BuildingArchetype};
use september_logic::constants::buildings::DESTROYED_HEALTH;
use september_logic::TilePos;

use crate::assets::SpriteAtlas;
use crate::components::{Building, BuildingHit, BuildingId, HitPart, Placement};
use crate::config::BuildingConfig;
use crate::map::IsoMap;

/// Owns every placed building and the list of those regrowing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingRegistry {
    buildings: Vec<Building>,
    /// Destroyed buildings that are recovering, in destruction order.
    regrowing: Vec<BuildingId>,
    blast: BlastGrid,
    regrowth_timer: f64,
    regrowth_interval: f64,
    regrowth_increment: i32,
}

impl BuildingRegistry {
    pub fn new(cfg: &BuildingConfig) -> Self {
        Self {
            buildings: Vec::new(),
            regrowing: Vec::new(),
            blast: BlastGrid::new(
                cfg.blast_radius,
                cfg.blast_center_damage,
                cfg.blast_ring_decrement,
            ),
            regrowth_timer: 0.0,
            regrowth_interval: cfg.regrowth_interval,
            regrowth_increment: cfg.regrowth_increment,
        }
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn regrowing(&self) -> &[BuildingId] {
        &self.regrowing
    }

    pub fn is_regrowing(&self, id: BuildingId) -> bool {
        self.regrowing.contains(&id)
    }

    pub fn blast(&self) -> &BlastGrid {
        &self.blast
    }

    pub fn destroyed_count(&self) -> usize {
        self.buildings.iter().filter(|b| b.destroyed).count()
    }

    // ── Placement ──────────────────────────────────────────────────────

    fn insert(&mut self, map: &mut IsoMap, placement: &Placement) -> Option<BuildingId> {
        let Some(info) = archetype(placement.archetype) else {
            warn!(
                "Skipping placement with unknown archetype {} at ({}, {})",
                placement.archetype, placement.tile_x, placement.tile_y
            );
            return None;
        };
        let id = BuildingId(self.buildings.len());
        let building = Building::new(placement.archetype as usize, placement.tile(), info);
        for tile in building.footprint() {
            map.set_tile_building(tile, Some(id));
        }
        self.buildings.push(building);
        Some(id)
    }

    /// Place one building. Unknown archetypes are skipped.
    pub fn place(&mut self, map: &mut IsoMap, placement: &Placement) -> Option<BuildingId> {
        let id = self.insert(map, placement);
        if id.is_some() {
            map.calculate_depths();
        }
        id
    }

    /// Place a whole list in order; returns how many were accepted.
    pub fn place_all(&mut self, map: &mut IsoMap, placements: &[Placement]) -> usize {
        let placed = placements
            .iter()
            .filter_map(|p| self.insert(map, p))
            .count();
        map.calculate_depths();
        placed
    }

    /// Remove a building and renumber the ones placed after it.
    pub fn remove(&mut self, map: &mut IsoMap, id: BuildingId) -> Option<Building> {
        if id.0 >= self.buildings.len() {
            return None;
        }
        let removed = self.buildings.remove(id.0);
        self.regrowing.retain(|r| *r != id);
        for r in &mut self.regrowing {
            if r.0 > id.0 {
                r.0 -= 1;
            }
        }
        self.restamp(map);
        Some(removed)
    }

    /// Remove every building.
    pub fn clear(&mut self, map: &mut IsoMap) {
        self.buildings.clear();
        self.regrowing.clear();
        self.regrowth_timer = 0.0;
        self.restamp(map);
    }

    /// Rewrite the whole occupancy grid from the building list.
    pub fn restamp(&self, map: &mut IsoMap) {
        map.clear_buildings();
        for (i, building) in self.buildings.iter().enumerate() {
            for tile in building.footprint() {
                map.set_tile_building(tile, Some(BuildingId(i)));
            }
        }
        map.calculate_depths();
    }

    // ── Damage ─────────────────────────────────────────────────────────

    /// Blast pass over ground-level buildings. Returns the ids destroyed by
    /// this pass.
    pub fn explode(&mut self, map: &IsoMap, center: TilePos) -> Vec<BuildingId> {
        self.blast_pass(map, center, false)
    }

    /// Blast pass over tall buildings only.
    pub fn explode_tall(&mut self, map: &IsoMap, center: TilePos) -> Vec<BuildingId> {
        self.blast_pass(map, center, true)
    }

    fn blast_pass(&mut self, map: &IsoMap, center: TilePos, tall: bool) -> Vec<BuildingId> {
        let hits: Vec<(BuildingId, i32)> = self
            .blast
            .offsets()
            .filter_map(|(dx, dy, damage)| {
                map.tile_building(center.offset(dx, dy))
                    .map(|id| (id, damage))
            })
            .collect();

        let mut destroyed = Vec::new();
        for (id, damage) in hits {
            if self.get(id).is_some_and(|b| b.is_tall() == tall)
                && self.decrement_health(id, damage)
            {
                destroyed.push(id);
            }
        }
        destroyed
    }

    /// Apply `damage` to one building. Returns true if this call destroyed it.
    pub fn decrement_health(&mut self, id: BuildingId, damage: i32) -> bool {
        let Some(building) = self.buildings.get_mut(id.0) else {
            return false;
        };
        let info = building.info();
        building.health -= damage;

        if building.health > 0 {
            building.sprite = if building.destroyed {
                info.regrowth_index(building.health)
                    .unwrap_or(building.sprite)
            } else {
                info.damage_index(building.health)
            };
            return false;
        }

        building.health = DESTROYED_HEALTH;
        building.sprite = info.destroyed_index();
        if building.destroyed {
            return false;
        }
        building.destroyed = true;
        if info.regen.regrows() && !self.regrowing.contains(&id) {
            self.regrowing.push(id);
        }
        debug!("{} at {:?} destroyed", info.name, building.anchor);
        true
    }

    // ── Regrowth ───────────────────────────────────────────────────────

    /// Advance the regrowth timer. Returns ids fully restored this call.
    pub fn update(&mut self, dt: f64) -> Vec<BuildingId> {
        if self.regrowing.is_empty() {
            self.regrowth_timer = 0.0;
            return Vec::new();
        }
        self.regrowth_timer += dt;
        if self.regrowth_timer < self.regrowth_interval {
            return Vec::new();
        }
        self.regrowth_timer -= self.regrowth_interval;

        let mut restored = Vec::new();
        for &id in &self.regrowing {
            let Some(building) = self.buildings.get_mut(id.0) else {
                continue;
            };
            let info = building.info();
            building.health += self.regrowth_increment;
            if building.health >= info.max_health {
                building.health = info.max_health;
                building.destroyed = false;
                building.sprite = BuildingArchetype::INTACT;
                restored.push(id);
                debug!("{} at {:?} fully restored", info.name, building.anchor);
            } else if let Some(sprite) = info.regrowth_index(building.health) {
                building.sprite = sprite;
            }
        }
        self.regrowing.retain(|id| !restored.contains(id));
        restored
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Screen point the building's sprite is anchored to: the bottom corner
    /// of its anchor tile.
    pub fn anchor_point(map: &IsoMap, building: &Building) -> (f64, f64) {
        map.point_to_screen(
            f64::from(building.anchor.x + 1),
            f64::from(building.anchor.y + 1),
        )
    }

    /// Topmost building under a screen point, scanning the most recently
    /// placed first. Buildings with no sprite in the atlas are skipped.
    pub fn hit_test(
        &self,
        map: &IsoMap,
        atlas: &impl SpriteAtlas,
        x: f64,
        y: f64,
    ) -> Option<BuildingHit> {
        self.buildings
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, building)| {
                let sprite = atlas.sprite(building.sprite_id()?)?;
                let (ax, ay) = Self::anchor_point(map, building);
                if !sprite.contains(ax, ay, x, y) {
                    return None;
                }
                let info = building.info();
                let part = if building.is_tall() && building.health * 2 > info.max_health {
                    let (_, top) = sprite.top_left(ax, ay);
                    if y < top + sprite.height / 2.0 {
                        HitPart::Upper
                    } else {
                        HitPart::Lower
                    }
                } else {
                    HitPart::Whole
                };
                Some(BuildingHit {
                    building: BuildingId(i),
                    part,
                })
            })
    }

    /// Ids sorted by anchor-tile depth for back-to-front drawing.
    pub fn render_order(&self, map: &IsoMap) -> Vec<BuildingId> {
        let mut order: Vec<BuildingId> = (0..self.buildings.len()).map(BuildingId).collect();
        order.sort_by_key(|id| map.depth(self.buildings[id.0].anchor));
        order
    }
}
