//! Isometric tile map: occupancy grid, paint depths, camera scroll and
//! coordinate transforms.

use rand::Rng;
use serde::{Deserialize, Serialize};

use september_logic::iso::IsoProjection;
use september_logic::TilePos;

use crate::components::BuildingId;
use crate::config::MapConfig;

/// One grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Building covering this cell, if any.
    pub building: Option<BuildingId>,
    /// Paint order; larger draws later.
    pub depth: u32,
}

/// The logical tile grid and the camera over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoMap {
    size: i32,
    tiles: Vec<Tile>,
    projection: IsoProjection,
    screen_width: f64,
    screen_height: f64,
    /// Horizontal camera offset in pixels, added to every projected x.
    scroll: f64,
    scroll_limit: f64,
    random_tile_attempts: u32,
}

impl IsoMap {
    pub fn new(cfg: &MapConfig) -> Self {
        let size = cfg.size.max(1);
        let projection = IsoProjection::centered(
            size,
            cfg.screen_width,
            cfg.screen_height,
            cfg.tile_step_x,
            cfg.tile_step_y,
        );
        let mut map = Self {
            size,
            tiles: vec![Tile::default(); (size * size) as usize],
            projection,
            screen_width: cfg.screen_width,
            screen_height: cfg.screen_height,
            scroll: 0.0,
            scroll_limit: projection.scroll_limit(size, cfg.screen_width),
            random_tile_attempts: cfg.random_tile_attempts.max(1),
        };
        map.calculate_depths();
        map
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn center(&self) -> TilePos {
        TilePos::new(self.size / 2, self.size / 2)
    }

    /// Projection without the camera scroll applied.
    pub fn projection(&self) -> IsoProjection {
        self.projection
    }

    pub fn screen_size(&self) -> (f64, f64) {
        (self.screen_width, self.screen_height)
    }

    fn index(&self, tile: TilePos) -> Option<usize> {
        tile.in_bounds(self.size)
            .then(|| (tile.y * self.size + tile.x) as usize)
    }

    // ── Camera ─────────────────────────────────────────────────────────

    pub fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    /// Scroll horizontally, clamped so the ground never shows its edges.
    pub fn scroll(&mut self, amount: f64) {
        self.scroll = (self.scroll + amount).clamp(-self.scroll_limit, self.scroll_limit);
    }

    // ── Transforms ─────────────────────────────────────────────────────

    /// Screen position of a (possibly fractional) tile coordinate.
    pub fn point_to_screen(&self, tx: f64, ty: f64) -> (f64, f64) {
        let (x, y) = self.projection.project(tx, ty);
        (x + self.scroll, y)
    }

    /// Screen position of a tile's top corner.
    pub fn tile_to_screen(&self, tile: TilePos) -> (f64, f64) {
        self.point_to_screen(f64::from(tile.x), f64::from(tile.y))
    }

    pub fn tile_center_to_screen(&self, tile: TilePos) -> (f64, f64) {
        self.point_to_screen(f64::from(tile.x) + 0.5, f64::from(tile.y) + 0.5)
    }

    /// Tile under a screen point. May lie outside the grid.
    pub fn screen_to_tile(&self, x: f64, y: f64) -> TilePos {
        self.projection.tile_at(x - self.scroll, y)
    }

    pub fn is_on_screen(&self, tile: TilePos) -> bool {
        let (x, y) = self.tile_center_to_screen(tile);
        x >= 0.0 && y >= 0.0 && x < self.screen_width && y < self.screen_height
    }

    // ── Occupancy ──────────────────────────────────────────────────────

    pub fn tile(&self, tile: TilePos) -> Option<&Tile> {
        self.index(tile).and_then(|i| self.tiles.get(i))
    }

    /// Out-of-bounds writes are ignored.
    pub fn set_tile_building(&mut self, tile: TilePos, building: Option<BuildingId>) {
        if let Some(i) = self.index(tile) {
            self.tiles[i].building = building;
        }
    }

    /// Out-of-bounds reads are empty.
    pub fn tile_building(&self, tile: TilePos) -> Option<BuildingId> {
        self.tile(tile).and_then(|t| t.building)
    }

    pub fn clear_buildings(&mut self) {
        for t in &mut self.tiles {
            t.building = None;
        }
    }

    /// In bounds and not covered by a building.
    pub fn is_walkable(&self, tile: TilePos) -> bool {
        self.tile(tile).is_some_and(|t| t.building.is_none())
    }

    // ── Depth ──────────────────────────────────────────────────────────

    pub fn depth(&self, tile: TilePos) -> u32 {
        self.tile(tile).map_or(0, |t| t.depth)
    }

    /// Number every tile in row-major order. Rerun after any layout change.
    pub fn calculate_depths(&mut self) {
        for (depth, t) in self.tiles.iter_mut().enumerate() {
            t.depth = depth as u32;
        }
    }

    // ── Random tiles ───────────────────────────────────────────────────

    /// A walkable tile currently visible. Falls back to the map center.
    pub fn random_tile_on_screen(&self, rng: &mut impl Rng) -> TilePos {
        for _ in 0..self.random_tile_attempts {
            let x = rng.gen_range(0.0..self.screen_width);
            let y = rng.gen_range(0.0..self.screen_height);
            let tile = self.screen_to_tile(x, y);
            if self.is_walkable(tile) {
                return tile;
            }
        }
        self.center()
    }

    /// A walkable tile outside the view. Falls back to the map center.
    pub fn random_tile_off_screen(&self, rng: &mut impl Rng) -> TilePos {
        for _ in 0..self.random_tile_attempts {
            let tile = self.random_tile(rng);
            if self.is_walkable(tile) && !self.is_on_screen(tile) {
                return tile;
            }
        }
        self.center()
    }

    /// Any walkable tile. Falls back to the map center.
    pub fn random_tile_anywhere(&self, rng: &mut impl Rng) -> TilePos {
        for _ in 0..self.random_tile_attempts {
            let tile = self.random_tile(rng);
            if self.is_walkable(tile) {
                return tile;
            }
        }
        self.center()
    }

    fn random_tile(&self, rng: &mut impl Rng) -> TilePos {
        TilePos::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn map() -> IsoMap {
        IsoMap::new(&MapConfig::default())
    }

    #[test]
    fn test_out_of_bounds_access_is_harmless() {
        let mut map = map();
        map.set_tile_building(TilePos::new(-1, 3), Some(BuildingId(0)));
        map.set_tile_building(TilePos::new(3, 120), Some(BuildingId(0)));
        assert_eq!(map.tile_building(TilePos::new(-1, 3)), None);
        assert_eq!(map.tile_building(TilePos::new(500, 500)), None);
        assert!(!map.is_walkable(TilePos::new(-1, 0)));
    }

    #[test]
    fn test_scroll_clamps() {
        let mut map = map();
        map.scroll(10_000.0);
        assert_eq!(map.scroll_offset(), 3328.0);
        map.scroll(-20_000.0);
        assert_eq!(map.scroll_offset(), -3328.0);
    }

    #[test]
    fn test_screen_to_tile_accounts_for_scroll() {
        let mut map = map();
        map.scroll(-250.0);
        let tile = TilePos::new(22, 71);
        let (x, y) = map.tile_center_to_screen(tile);
        assert_eq!(map.screen_to_tile(x, y), tile);
    }

    #[test]
    fn test_depths_are_row_major() {
        let map = map();
        assert_eq!(map.depth(TilePos::new(0, 0)), 0);
        assert_eq!(map.depth(TilePos::new(5, 0)), 5);
        assert_eq!(map.depth(TilePos::new(0, 1)), 120);
        assert!(map.depth(TilePos::new(119, 3)) < map.depth(TilePos::new(0, 4)));
    }

    #[test]
    fn test_random_tile_falls_back_to_center() {
        let mut map = map();
        for y in 0..map.size() {
            for x in 0..map.size() {
                map.set_tile_building(TilePos::new(x, y), Some(BuildingId(0)));
            }
        }
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(map.random_tile_anywhere(&mut rng), map.center());
        assert_eq!(map.random_tile_on_screen(&mut rng), map.center());
        assert_eq!(map.random_tile_off_screen(&mut rng), map.center());
    }

    #[test]
    fn test_random_tiles_respect_visibility() {
        let map = map();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let visible = map.random_tile_on_screen(&mut rng);
            assert!(map.is_walkable(visible));
            assert!(visible.chebyshev_distance(map.center()) <= 21);
            assert!(!map.is_on_screen(map.random_tile_off_screen(&mut rng)));
        }
    }
}
