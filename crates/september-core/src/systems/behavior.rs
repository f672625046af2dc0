//! Pedestrian behavior - the per-character state machine
//!
//! Every archetype runs the same machine. Differences (who may mourn, clip
//! lengths) come from the archetype's clip table, not from separate code
//! paths.

use rand::Rng;

use september_logic::clips::Facing;
use september_logic::TilePos;

use crate::components::{EntityEvent, MoveState, Pedestrian, ScreenOffset, TileStep};
use crate::config::PedestrianConfig;
use crate::map::IsoMap;

/// Advance `clock` by `dt` and return how many whole `period`s elapsed.
fn drain_clock(clock: &mut f64, dt: f64, period: f64) -> u32 {
    if period <= 0.0 {
        return 0;
    }
    *clock += dt;
    let mut ticks = 0;
    while *clock >= period {
        *clock -= period;
        ticks += 1;
    }
    ticks
}

impl Pedestrian {
    /// Advance this pedestrian by `dt` simulated seconds.
    ///
    /// Returns at most one event for the population to handle this tick.
    pub fn update(
        &mut self,
        dt: f64,
        map: &IsoMap,
        cfg: &PedestrianConfig,
        rng: &mut impl Rng,
    ) -> Option<EntityEvent> {
        match self.state {
            MoveState::Dead => {
                self.update_dead(dt, cfg);
                None
            }
            MoveState::Mourning => self.update_mourning(dt, cfg),
            MoveState::Converting => self.update_converting(dt, cfg),
            MoveState::Idle
            | MoveState::Moving
            | MoveState::AvoidingHorizontal
            | MoveState::AvoidingVertical => self.update_walking(dt, map, cfg, rng),
        }
    }

    /// Screen position of the feet, including sub-tile motion.
    pub fn screen_position(&self, map: &IsoMap) -> (f64, f64) {
        let (x, y) = map.tile_center_to_screen(self.tile);
        (x + self.offset.x, y + self.offset.y)
    }

    // ── External orders ────────────────────────────────────────────────

    /// Send this pedestrian to `target` to mourn `casualty`. Takes effect at
    /// the next tile boundary.
    pub fn order_mourning(&mut self, target: TilePos, casualty: TilePos) {
        self.future_destination = Some(target);
        self.casualty = Some(casualty);
        self.pending_conversion = true;
    }

    /// Mark a hostile for reversion. Takes effect at the next tile boundary.
    pub fn begin_reversion(&mut self) {
        if self.kind.is_hostile() && self.is_alive() {
            self.de_escalating = true;
        }
    }

    /// Kill in place. Returns `MourningEnded` if the pedestrian was mourning.
    pub fn kill(&mut self, cfg: &PedestrianConfig, rng: &mut impl Rng) -> Option<EntityEvent> {
        if !self.is_alive() {
            return None;
        }
        let was_mourning = self.state == MoveState::Mourning;

        self.state = MoveState::Dead;
        self.step = None;
        self.offset = ScreenOffset::ZERO;
        self.depth_tile = self.tile;
        self.destination = self.tile;
        self.future_destination = None;
        self.casualty = None;
        self.pending_conversion = false;
        self.de_escalating = false;

        let jitter = if cfg.death_jitter > 0.0 {
            rng.gen_range(-cfg.death_jitter..=cfg.death_jitter)
        } else {
            0.0
        };
        self.timer = (cfg.death_duration + jitter).max(0.0);
        let clips = self.kind.clips();
        self.frame = clips.death_frame(rng.gen_range(0..clips.death_frames.max(1)));
        self.opacity = 1.0;

        was_mourning.then_some(EntityEvent::MourningEnded)
    }

    // ── Dead ───────────────────────────────────────────────────────────

    fn update_dead(&mut self, dt: f64, cfg: &PedestrianConfig) {
        self.timer -= dt;
        self.opacity = if cfg.fade_duration > 0.0 {
            (self.timer / cfg.fade_duration).clamp(0.0, 1.0) as f32
        } else {
            1.0
        };
        if self.timer <= 0.0 {
            self.opacity = 0.0;
            self.removed = true;
        }
    }

    // ── Mourning / converting ──────────────────────────────────────────

    fn start_mourning(&mut self, cfg: &PedestrianConfig) -> Option<EntityEvent> {
        self.state = MoveState::Mourning;
        self.step = None;
        self.offset = ScreenOffset::ZERO;
        self.destination = self.tile;
        if let Some(casualty) = self.casualty {
            if casualty != self.tile {
                self.facing = Facing::toward(self.tile, casualty);
            }
        }
        self.timer = cfg.mourn_duration;
        self.anim_clock = 0.0;
        self.anim_step = 0;
        self.frame = self.kind.clips().mourn_frame(self.facing, 0);
        Some(EntityEvent::MourningStarted)
    }

    fn update_mourning(&mut self, dt: f64, cfg: &PedestrianConfig) -> Option<EntityEvent> {
        self.anim_step += drain_clock(&mut self.anim_clock, dt, cfg.anim_frame_time);
        self.frame = self.kind.clips().mourn_frame(self.facing, self.anim_step);

        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.start_converting();
        Some(EntityEvent::MourningEnded)
    }

    fn start_converting(&mut self) {
        self.state = MoveState::Converting;
        self.step = None;
        self.offset = ScreenOffset::ZERO;
        self.depth_tile = self.tile;
        self.anim_clock = 0.0;
        self.anim_step = 0;
        self.event_sent = false;
        self.frame = self.converting_frame();
    }

    /// Conversion plays forward; reversion plays the former kind's clip
    /// backwards.
    fn converting_frame(&self) -> u32 {
        let clips = self.animation_clips();
        let last = clips.convert_frames.saturating_sub(1);
        let step = self.anim_step.min(last);
        if self.kind.is_hostile() {
            clips.convert_frame(self.facing, last - step)
        } else {
            clips.convert_frame(self.facing, step)
        }
    }

    fn update_converting(&mut self, dt: f64, cfg: &PedestrianConfig) -> Option<EntityEvent> {
        self.anim_step += drain_clock(&mut self.anim_clock, dt, cfg.anim_frame_time);
        self.frame = self.converting_frame();

        if self.event_sent || self.anim_step < self.animation_clips().convert_frames.max(1) {
            return None;
        }
        self.event_sent = true;
        Some(if self.kind.is_hostile() {
            EntityEvent::ReversionComplete
        } else {
            EntityEvent::ConversionComplete
        })
    }

    // ── Walking ────────────────────────────────────────────────────────

    fn update_walking(
        &mut self,
        dt: f64,
        map: &IsoMap,
        cfg: &PedestrianConfig,
        rng: &mut impl Rng,
    ) -> Option<EntityEvent> {
        if self.step.is_some() {
            self.walk_cycle += drain_clock(&mut self.anim_clock, dt, cfg.anim_frame_time);
            self.frame = self.kind.clips().walk_frame(self.facing, self.walk_cycle);

            let parts = drain_clock(&mut self.step_clock, dt, cfg.part_time);
            if !self.advance_step(parts, map, cfg) {
                return None;
            }
        }
        self.at_tile_boundary(map, cfg, rng)
    }

    /// Move `parts` sub-steps along the current step. Returns true once the
    /// step is complete.
    fn advance_step(&mut self, parts: u32, map: &IsoMap, cfg: &PedestrianConfig) -> bool {
        let Some(mut step) = self.step else {
            return true;
        };
        let total = cfg.parts_per_tile.max(1);
        step.part = (step.part + parts).min(total);

        let dx = step.to.x - step.from.x;
        let dy = step.to.y - step.from.y;
        let remaining = f64::from(total - step.part) / f64::from(total);
        let (ox, oy) = map
            .projection()
            .project_delta(-f64::from(dx) * remaining, -f64::from(dy) * remaining);
        self.offset = ScreenOffset::new(ox, oy);

        // Moving backward keeps the old paint depth until halfway.
        if step.part * 2 >= total {
            self.depth_tile = step.to;
        }

        if step.part >= total {
            self.step = None;
            self.offset = ScreenOffset::ZERO;
            self.depth_tile = self.tile;
            true
        } else {
            self.step = Some(step);
            false
        }
    }

    fn begin_step(&mut self, (dx, dy): (i32, i32), map: &IsoMap) {
        let from = self.tile;
        let to = from.offset(dx, dy);
        self.tile = to;
        self.facing = Facing::from_step(dx, dy);
        self.step = Some(TileStep { from, to, part: 0 });
        self.depth_tile = if dx > 0 || dy > 0 { to } else { from };
        let (ox, oy) = map.projection().project_delta(-f64::from(dx), -f64::from(dy));
        self.offset = ScreenOffset::new(ox, oy);
    }

    fn at_tile_boundary(
        &mut self,
        map: &IsoMap,
        cfg: &PedestrianConfig,
        rng: &mut impl Rng,
    ) -> Option<EntityEvent> {
        if self.de_escalating {
            self.start_converting();
            return None;
        }
        if let Some(target) = self.future_destination.take() {
            self.destination = target;
            self.state = MoveState::Moving;
        }

        match self.state {
            MoveState::Idle => {
                if self.destination == self.tile {
                    self.destination = map.random_tile_anywhere(rng);
                }
                self.state = MoveState::Moving;
                None
            }
            MoveState::Moving => {
                if self.tile == self.destination {
                    return self.arrive(cfg);
                }
                self.step_toward_destination(map, cfg, rng)
            }
            MoveState::AvoidingHorizontal | MoveState::AvoidingVertical => {
                self.avoid(map, cfg, rng)
            }
            MoveState::Mourning | MoveState::Converting | MoveState::Dead => None,
        }
    }

    fn arrive(&mut self, cfg: &PedestrianConfig) -> Option<EntityEvent> {
        if self.pending_conversion && self.casualty.is_some() {
            return self.start_mourning(cfg);
        }
        self.state = MoveState::Idle;
        None
    }

    fn step_toward_destination(
        &mut self,
        map: &IsoMap,
        cfg: &PedestrianConfig,
        rng: &mut impl Rng,
    ) -> Option<EntityEvent> {
        let dx = (self.destination.x - self.tile.x).signum();
        let dy = (self.destination.y - self.tile.y).signum();
        let step = if dx != 0 && dy != 0 {
            if rng.gen_bool(0.5) {
                (dx, 0)
            } else {
                (0, dy)
            }
        } else {
            (dx, dy)
        };

        if map.is_walkable(self.tile.offset(step.0, step.1)) {
            self.begin_step(step, map);
            return None;
        }

        let side = if rng.gen_bool(0.5) { 1 } else { -1 };
        self.blocked_step = step;
        if step.0 != 0 {
            self.lateral_step = (0, side);
            self.state = MoveState::AvoidingVertical;
        } else {
            self.lateral_step = (side, 0);
            self.state = MoveState::AvoidingHorizontal;
        }
        self.avoid(map, cfg, rng)
    }

    fn avoid(
        &mut self,
        map: &IsoMap,
        cfg: &PedestrianConfig,
        rng: &mut impl Rng,
    ) -> Option<EntityEvent> {
        let (bx, by) = self.blocked_step;
        if map.is_walkable(self.tile.offset(bx, by)) {
            self.state = MoveState::Moving;
            self.begin_step(self.blocked_step, map);
            return None;
        }
        let (lx, ly) = self.lateral_step;
        if map.is_walkable(self.tile.offset(lx, ly)) {
            self.begin_step(self.lateral_step, map);
            return None;
        }

        // Boxed in. Mourners grieve where they stand; everyone else re-rolls.
        if self.pending_conversion && self.casualty.is_some() {
            return self.start_mourning(cfg);
        }
        let previous = self.destination;
        self.state = MoveState::Idle;
        self.destination = map.random_tile_anywhere(rng);
        if self.destination == previous || self.destination == self.tile {
            self.destination = map.random_tile_anywhere(rng);
        }
        None
    }
}
