//! Property sweeps over the projection and the blast kernel.
//!
//! All tests are pure logic, no engine state.

use september_logic::blast::BlastGrid;
use september_logic::constants::{buildings, map};
use september_logic::iso::IsoProjection;
use september_logic::TilePos;

// ── Helpers ────────────────────────────────────────────────────────────

fn default_projection() -> IsoProjection {
    IsoProjection::centered(
        map::MAP_SIZE,
        map::SCREEN_WIDTH,
        map::SCREEN_HEIGHT,
        map::TILE_STEP_X,
        map::TILE_STEP_Y,
    )
}

fn default_blast() -> BlastGrid {
    BlastGrid::new(
        buildings::BLAST_RADIUS,
        buildings::BLAST_CENTER_DAMAGE,
        buildings::BLAST_RING_DECREMENT,
    )
}

// ── Projection ─────────────────────────────────────────────────────────

#[test]
fn every_tile_corner_round_trips() {
    let p = default_projection();
    for y in 0..map::MAP_SIZE {
        for x in 0..map::MAP_SIZE {
            let tile = TilePos::new(x, y);
            let (sx, sy) = p.tile_corner(tile);
            assert_eq!(p.tile_at(sx, sy), tile, "corner of {tile:?}");
        }
    }
}

#[test]
fn every_tile_center_round_trips() {
    let p = default_projection();
    for y in 0..map::MAP_SIZE {
        for x in 0..map::MAP_SIZE {
            let tile = TilePos::new(x, y);
            let (sx, sy) = p.tile_center(tile);
            assert_eq!(p.tile_at(sx, sy), tile, "center of {tile:?}");
        }
    }
}

#[test]
fn unproject_inverts_non_square_steps() {
    let p = IsoProjection::new(100.0, -40.0, 48.0, 24.0);
    for &(tx, ty) in &[(0.0, 0.0), (3.25, 7.5), (119.0, 2.0), (-4.0, 60.75)] {
        let (sx, sy) = p.project(tx, ty);
        let (bx, by) = p.unproject(sx, sy);
        assert!((bx - tx).abs() < 1e-9 && (by - ty).abs() < 1e-9);
    }
}

#[test]
fn points_inside_a_tile_diamond_map_to_it() {
    let p = default_projection();
    let tile = TilePos::new(40, 41);
    let (cx, cy) = p.tile_center(tile);
    // Nudge toward each of the four corners while staying inside.
    for &(dx, dy) in &[(-20.0, 0.0), (20.0, 0.0), (0.0, -10.0), (0.0, 10.0)] {
        assert_eq!(p.tile_at(cx + dx, cy + dy), tile);
    }
}

// ── Blast kernel ───────────────────────────────────────────────────────

#[test]
fn blast_grid_is_mirror_symmetric() {
    let grid = default_blast();
    let r = grid.radius();
    for dy in -r..=r {
        for dx in -r..=r {
            let v = grid.damage_from_center(dx, dy);
            assert_eq!(v, grid.damage_from_center(-dx, dy));
            assert_eq!(v, grid.damage_from_center(dx, -dy));
        }
    }
}

#[test]
fn blast_grid_never_increases_outward() {
    let grid = BlastGrid::new(6, 40, 7);
    let r = grid.radius();
    for dy in -r..=r {
        for dx in -r..=r {
            let here = grid.damage_from_center(dx, dy).unwrap();
            let outward = (dx + dx.signum(), dy + dy.signum());
            if let Some(next) = grid.damage_from_center(outward.0, outward.1) {
                assert!(next <= here, "({dx},{dy}) -> {outward:?}");
            }
        }
    }
}

#[test]
fn blast_grid_values_are_at_least_one() {
    for grid in [default_blast(), BlastGrid::new(5, 3, 10), BlastGrid::new(4, 0, 1)] {
        assert!(grid.offsets().all(|(_, _, damage)| damage >= 1));
    }
}
