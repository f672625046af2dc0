//! 2:1 isometric projection.
//!
//! Tile `(tx, ty)` maps to screen space as
//!
//! ```text
//! isoX = tx * step_x
//! isoZ = -ty * step_y
//! x    = origin_x + isoX + isoZ
//! y    = origin_y + (isoX - isoZ) / 2
//! ```
//!
//! The inverse is solved analytically so a tap lands on exactly the tile
//! under the pointer. Horizontal camera scroll is applied by the map on top
//! of this projection.

use serde::{Deserialize, Serialize};

use crate::tile::TilePos;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoProjection {
    pub origin_x: f64,
    pub origin_y: f64,
    pub step_x: f64,
    pub step_y: f64,
}

impl IsoProjection {
    pub fn new(origin_x: f64, origin_y: f64, step_x: f64, step_y: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            step_x,
            step_y,
        }
    }

    /// A projection that puts the middle of a `map_size` grid at the middle
    /// of a `screen_width`×`screen_height` viewport.
    pub fn centered(
        map_size: i32,
        screen_width: f64,
        screen_height: f64,
        step_x: f64,
        step_y: f64,
    ) -> Self {
        let c = f64::from(map_size) / 2.0;
        Self {
            origin_x: screen_width / 2.0 - c * (step_x - step_y),
            origin_y: screen_height / 2.0 - c * (step_x + step_y) / 2.0,
            step_x,
            step_y,
        }
    }

    /// Project continuous tile coordinates to screen space (no scroll).
    pub fn project(&self, tx: f64, ty: f64) -> (f64, f64) {
        let (dx, dy) = self.project_delta(tx, ty);
        (self.origin_x + dx, self.origin_y + dy)
    }

    /// Project a tile-space displacement. Origin-free, used for sub-tile offsets.
    pub fn project_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        let iso_x = dx * self.step_x;
        let iso_z = -dy * self.step_y;
        (iso_x + iso_z, (iso_x - iso_z) / 2.0)
    }

    /// Continuous inverse of [`IsoProjection::project`].
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = x - self.origin_x;
        let sy = y - self.origin_y;
        // sx = step_x*tx - step_y*ty, sy = (step_x*tx + step_y*ty) / 2
        let tx = (sx / 2.0 + sy) / self.step_x;
        let ty = (sy - sx / 2.0) / self.step_y;
        (tx, ty)
    }

    /// The tile containing a screen point (no scroll).
    pub fn tile_at(&self, x: f64, y: f64) -> TilePos {
        let (tx, ty) = self.unproject(x, y);
        TilePos::new(tx.floor() as i32, ty.floor() as i32)
    }

    /// Screen position of a tile's top corner.
    pub fn tile_corner(&self, tile: TilePos) -> (f64, f64) {
        self.project(f64::from(tile.x), f64::from(tile.y))
    }

    /// Screen position of a tile's center.
    pub fn tile_center(&self, tile: TilePos) -> (f64, f64) {
        self.project(f64::from(tile.x) + 0.5, f64::from(tile.y) + 0.5)
    }

    /// Width in pixels of the prerendered ground bitmap for a `map_size` grid.
    pub fn map_pixel_width(&self, map_size: i32) -> f64 {
        f64::from(map_size) * (self.step_x + self.step_y)
    }

    /// Largest horizontal scroll that keeps the ground bitmap covering the screen.
    pub fn scroll_limit(&self, map_size: i32, screen_width: f64) -> f64 {
        ((self.map_pixel_width(map_size) - screen_width) / 2.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> IsoProjection {
        IsoProjection::centered(120, 1024.0, 768.0, 32.0, 32.0)
    }

    #[test]
    fn test_centered_origin() {
        let p = projection();
        let (x, y) = p.project(60.0, 60.0);
        assert_eq!((x, y), (512.0, 384.0));
    }

    #[test]
    fn test_axes_are_two_to_one() {
        let p = projection();
        let (x0, y0) = p.tile_corner(TilePos::new(10, 10));
        let (x1, y1) = p.tile_corner(TilePos::new(11, 10));
        let (x2, y2) = p.tile_corner(TilePos::new(10, 11));
        // +x goes down-right, +y goes down-left, both at half slope.
        assert_eq!((x1 - x0, y1 - y0), (32.0, 16.0));
        assert_eq!((x2 - x0, y2 - y0), (-32.0, 16.0));
    }

    #[test]
    fn test_center_round_trips() {
        let p = projection();
        let tile = TilePos::new(37, 91);
        let (x, y) = p.tile_center(tile);
        assert_eq!(p.tile_at(x, y), tile);
    }

    #[test]
    fn test_scroll_limit() {
        let p = projection();
        assert_eq!(p.map_pixel_width(120), 7680.0);
        assert_eq!(p.scroll_limit(120, 1024.0), 3328.0);
        assert_eq!(p.scroll_limit(2, 1024.0), 0.0);
    }
}
