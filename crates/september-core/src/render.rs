//! Read-only draw lists for the host renderer.
//!
//! Building a frame never mutates the simulation. Sprites the atlas does not
//! know are left out of the frame.

use serde::{Deserialize, Serialize};

use crate::assets::SpriteAtlas;
use crate::components::{GroundScar, Pedestrian};
use crate::map::IsoMap;
use crate::systems::{BuildingRegistry, StrikeController};

/// One sprite placed on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteDraw {
    pub sprite: String,
    /// Top-left corner in screen pixels.
    pub x: f64,
    pub y: f64,
    /// Paint order key. Buildings and pedestrians share the tile-depth key
    /// space, so the two layers interleave by this value.
    pub depth: f64,
    pub opacity: f32,
}

impl SpriteDraw {
    fn place(
        atlas: &impl SpriteAtlas,
        sprite: String,
        (ax, ay): (f64, f64),
        depth: f64,
        opacity: f32,
    ) -> Option<Self> {
        let info = atlas.sprite(&sprite)?;
        let (x, y) = info.top_left(ax, ay);
        Some(Self {
            sprite,
            x,
            y,
            depth,
            opacity,
        })
    }
}

/// Everything to draw this frame, layer by layer.
///
/// Scars go under everything and the strike over everything. Buildings and
/// pedestrians must be interleaved by `depth`; [`RenderFrame::paint_order`]
/// does that merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub scroll: f64,
    pub scars: Vec<SpriteDraw>,
    /// Sorted by anchor-tile depth.
    pub buildings: Vec<SpriteDraw>,
    /// Sorted by screen y. `depth` is the walker's tile depth.
    pub pedestrians: Vec<SpriteDraw>,
    pub strike: Option<SpriteDraw>,
}

impl RenderFrame {
    pub fn build(
        map: &IsoMap,
        buildings: &BuildingRegistry,
        pedestrians: &[Pedestrian],
        strikes: &StrikeController,
        atlas: &impl SpriteAtlas,
    ) -> Self {
        let scars = strikes
            .scars()
            .iter()
            .filter_map(|scar| {
                let (x, y) = map.tile_center_to_screen(scar.tile);
                SpriteDraw::place(
                    atlas,
                    GroundScar::SPRITE.to_string(),
                    (x + scar.offset.x, y + scar.offset.y),
                    0.0,
                    scar.opacity,
                )
            })
            .collect();

        let building_draws = buildings
            .render_order(map)
            .into_iter()
            .filter_map(|id| {
                let building = buildings.get(id)?;
                SpriteDraw::place(
                    atlas,
                    building.sprite_id()?.to_string(),
                    BuildingRegistry::anchor_point(map, building),
                    f64::from(map.depth(building.anchor)),
                    1.0,
                )
            })
            .collect();

        // Listed by foot y; `depth` carries the half-step depth tile.
        let mut keyed: Vec<(f64, SpriteDraw)> = pedestrians
            .iter()
            .filter(|p| !p.is_removed())
            .filter_map(|p| {
                let (x, y) = p.screen_position(map);
                let depth = f64::from(map.depth(p.depth_tile()));
                SpriteDraw::place(atlas, p.sprite_id(), (x, y), depth, p.opacity)
                    .map(|draw| (y, draw))
            })
            .collect();
        keyed.sort_by(|(ya, _), (yb, _)| ya.total_cmp(yb));
        let pedestrian_draws = keyed.into_iter().map(|(_, draw)| draw).collect();

        let strike = strikes.active().and_then(|strike| {
            let (x, y) = map.tile_center_to_screen(strike.target);
            SpriteDraw::place(
                atlas,
                strike.sprite_id(),
                (x + strike.offset.x, y + strike.offset.y),
                y,
                1.0,
            )
        });

        Self {
            scroll: map.scroll_offset(),
            scars,
            buildings: building_draws,
            pedestrians: pedestrian_draws,
            strike,
        }
    }

    /// Buildings and pedestrians merged by `depth`. On equal depth the
    /// building paints first and walkers keep their screen-y order.
    pub fn paint_order(&self) -> Vec<&SpriteDraw> {
        let mut merged: Vec<&SpriteDraw> =
            self.buildings.iter().chain(self.pedestrians.iter()).collect();
        merged.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::StaticAtlas;
    use crate::components::{CivilianKind, MoveState, PedestrianKind, Placement};
    use crate::config::SimConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use september_logic::buildings::archetype_index;
    use september_logic::TilePos;

    struct Scene {
        config: SimConfig,
        map: IsoMap,
        buildings: BuildingRegistry,
        strikes: StrikeController,
        atlas: StaticAtlas,
    }

    fn scene() -> Scene {
        let config = SimConfig::default();
        let map = IsoMap::new(&config.map);
        let atlas = StaticAtlas::with_defaults(map.projection());
        Scene {
            buildings: BuildingRegistry::new(&config.buildings),
            strikes: StrikeController::new(&config.strike),
            config,
            map,
            atlas,
        }
    }

    fn frame(scene: &Scene, pedestrians: &[Pedestrian]) -> RenderFrame {
        RenderFrame::build(
            &scene.map,
            &scene.buildings,
            pedestrians,
            &scene.strikes,
            &scene.atlas,
        )
    }

    fn man(x: i32, y: i32) -> Pedestrian {
        Pedestrian::new(PedestrianKind::Civilian(CivilianKind::Man), TilePos::new(x, y))
    }

    #[test]
    fn test_backward_walker_keeps_depth_until_midpoint() {
        let s = scene();
        let cfg = &s.config.pedestrians;
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = man(10, 10);
        p.destination = TilePos::new(9, 10);
        p.state = MoveState::Moving;

        p.update(1.0 / 48.0, &s.map, cfg, &mut rng);
        let before = frame(&s, std::slice::from_ref(&p));
        assert_eq!(
            before.pedestrians[0].depth,
            f64::from(s.map.depth(TilePos::new(10, 10)))
        );

        let half = cfg.part_time * f64::from(cfg.parts_per_tile / 2) + 1e-6;
        p.update(half, &s.map, cfg, &mut rng);
        let after = frame(&s, std::slice::from_ref(&p));
        assert_eq!(
            after.pedestrians[0].depth,
            f64::from(s.map.depth(TilePos::new(9, 10)))
        );
        assert!(after.pedestrians[0].depth < before.pedestrians[0].depth);
    }

    #[test]
    fn test_walkers_list_by_screen_y_and_paint_by_depth() {
        let s = scene();
        // (5, 11) is higher on screen than (15, 10) but later in row order.
        let pedestrians = [man(15, 10), man(5, 11)];
        let frame = frame(&s, &pedestrians);
        let high = f64::from(s.map.depth(TilePos::new(5, 11)));
        let low = f64::from(s.map.depth(TilePos::new(15, 10)));
        assert!(high > low);

        let listed: Vec<f64> = frame.pedestrians.iter().map(|d| d.depth).collect();
        assert_eq!(listed, vec![high, low]);
        assert!(frame.pedestrians[0].y < frame.pedestrians[1].y);

        let painted: Vec<f64> = frame.paint_order().iter().map(|d| d.depth).collect();
        assert_eq!(painted, vec![low, high]);
    }

    #[test]
    fn test_paint_order_interleaves_buildings_and_walkers() {
        let mut s = scene();
        let palm = archetype_index("palm_tree").unwrap();
        s.buildings
            .place(&mut s.map, &Placement::new(palm, 8, 10))
            .unwrap();
        s.buildings
            .place(&mut s.map, &Placement::new(palm, 12, 10))
            .unwrap();

        let frame = frame(&s, &[man(10, 10)]);
        let order: Vec<&str> = frame
            .paint_order()
            .iter()
            .map(|d| d.sprite.as_str())
            .collect();
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], "palm_tree");
        assert!(order[1].starts_with("man"));
        assert_eq!(order[2], "palm_tree");
    }
}
