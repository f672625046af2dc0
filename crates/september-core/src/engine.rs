//! Simulation engine - main entry point for running the simulation

use std::io::{Read, Write};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use september_logic::TilePos;

use crate::assets::SpriteAtlas;
use crate::audio::{AudioCue, AudioQueue};
use crate::components::*;
use crate::config::SimConfig;
use crate::map::IsoMap;
use crate::persistence::{self, SaveError};
use crate::render::RenderFrame;
use crate::systems::*;

/// Snapshot of population and damage counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    pub tick: u64,
    pub sim_time: f64,
    pub living: usize,
    pub civilians: usize,
    pub animals: usize,
    pub hostiles: usize,
    pub dead: usize,
    pub mourning: usize,
    pub converting: usize,
    pub strikes_fired: u64,
    pub casualties: u64,
    pub conversions: u64,
    pub reversions: u64,
    pub buildings: usize,
    pub buildings_destroyed: usize,
    pub buildings_regrowing: usize,
}

/// Main simulation engine
pub struct SimulationEngine {
    pub config: SimConfig,
    pub map: IsoMap,
    pub buildings: BuildingRegistry,
    pub population: PopulationManager,
    pub strikes: StrikeController,
    audio: AudioQueue,
    rng: StdRng,
    /// Simulated time not yet consumed by a fixed step.
    accumulator: f64,
    tick: u64,
    sim_time: f64,
    time_scale: f64,
}

impl SimulationEngine {
    /// Create an empty town: no buildings, no pedestrians.
    pub fn new(config: SimConfig) -> Self {
        for issue in config.validate() {
            warn!("Config issue: {}", issue);
        }
        let engine = Self {
            map: IsoMap::new(&config.map),
            buildings: BuildingRegistry::new(&config.buildings),
            population: PopulationManager::new(&config.population, &config.pedestrians),
            strikes: StrikeController::new(&config.strike),
            audio: AudioQueue::new(),
            rng: StdRng::seed_from_u64(config.seed),
            accumulator: 0.0,
            tick: 0,
            sim_time: 0.0,
            time_scale: config.time_scale.max(0.0),
            config,
        };
        info!(
            "Simulation created: {}x{} map, seed {:#x}",
            engine.map.size(),
            engine.map.size(),
            engine.config.seed
        );
        engine
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config: SimConfig,
        map: IsoMap,
        buildings: BuildingRegistry,
        population: PopulationManager,
        strikes: StrikeController,
        tick: u64,
        sim_time: f64,
        accumulator: f64,
        time_scale: f64,
    ) -> Self {
        let rng = StdRng::seed_from_u64(config.seed ^ tick.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            config,
            map,
            buildings,
            population,
            strikes,
            audio: AudioQueue::new(),
            rng,
            accumulator,
            tick,
            sim_time,
            time_scale,
        }
    }

    // ── Setup ──────────────────────────────────────────────────────────

    /// Place a list of buildings in order. Returns how many were accepted.
    pub fn place_buildings(&mut self, placements: &[Placement]) -> usize {
        let placed = self.buildings.place_all(&mut self.map, placements);
        info!("Placed {} of {} buildings", placed, placements.len());
        placed
    }

    pub fn place_building(&mut self, placement: Placement) -> Option<BuildingId> {
        self.buildings.place(&mut self.map, &placement)
    }

    /// Remove the building covering `tile`, if any.
    pub fn remove_building_at(&mut self, tile: TilePos) -> Option<Building> {
        let id = self.map.tile_building(tile)?;
        self.buildings.remove(&mut self.map, id)
    }

    /// Spawn the starting population.
    pub fn populate(&mut self) {
        self.population.populate(&self.map, &mut self.rng);
    }

    // ── Time ───────────────────────────────────────────────────────────

    /// Feed real elapsed seconds; runs as many fixed steps as fit.
    /// Returns the number of steps run.
    pub fn advance(&mut self, real_dt: f64) -> u32 {
        let clamped = real_dt.clamp(0.0, self.config.max_frame_time);
        self.accumulator += clamped * self.time_scale;

        let step = self.config.fixed_step;
        if step <= 0.0 {
            return 0;
        }
        let mut steps = 0;
        while self.accumulator >= step {
            self.accumulator -= step;
            self.step();
            steps += 1;
        }
        steps
    }

    /// Run exactly one fixed step: buildings, then population, then strike.
    pub fn step(&mut self) {
        let dt = self.config.fixed_step;

        for id in self.buildings.update(dt) {
            debug!("Building {:?} regrown", id);
        }

        self.population
            .update(dt, &self.map, &mut self.rng, &mut self.audio);

        for event in self.strikes.update(dt) {
            match event {
                StrikeEvent::Exploded => {
                    self.audio.push(AudioCue::MissileStop);
                    self.audio.push(AudioCue::Explosion);
                }
                StrikeEvent::Impact { target, .. } => self.apply_impact(target),
                StrikeEvent::Finished => {}
            }
        }

        self.tick += 1;
        self.sim_time += dt;
    }

    fn apply_impact(&mut self, target: TilePos) {
        let radius = self.buildings.blast().radius();
        self.population
            .kill(target, radius, &self.map, &mut self.rng, &mut self.audio);
        let mut destroyed = self.buildings.explode(&self.map, target);
        destroyed.extend(self.buildings.explode_tall(&self.map, target));
        if !destroyed.is_empty() {
            debug!("Impact at {:?} destroyed {} buildings", target, destroyed.len());
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since start.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    pub(crate) fn accumulator(&self) -> f64 {
        self.accumulator
    }

    // ── Input ──────────────────────────────────────────────────────────

    /// Launch a strike at a tile. The screen point is where the player
    /// tapped; the explosion is drawn there rather than at the tile center.
    /// Ignored while a strike is already in flight.
    pub fn launch_strike(
        &mut self,
        screen_x: f64,
        screen_y: f64,
        tile_x: i32,
        tile_y: i32,
    ) -> bool {
        let target = TilePos::new(tile_x, tile_y);
        let (cx, cy) = self.map.tile_center_to_screen(target);
        let offset = ScreenOffset::new(screen_x - cx, screen_y - cy);
        let launched = self.strikes.launch(target, offset);
        if launched {
            self.audio.push(AudioCue::MissileLaunch);
        }
        launched
    }

    /// Launch a strike at whatever tile is under a screen point.
    pub fn fire_at(&mut self, screen_x: f64, screen_y: f64) -> bool {
        let tile = self.map.screen_to_tile(screen_x, screen_y);
        self.launch_strike(screen_x, screen_y, tile.x, tile.y)
    }

    /// A tap on the town. Returns the building under the point, if any.
    pub fn handle_tap(&mut self, x: f64, y: f64, atlas: &impl SpriteAtlas) -> Option<BuildingHit> {
        self.audio.push(AudioCue::Click);
        self.buildings.hit_test(&self.map, atlas, x, y)
    }

    pub fn scroll(&mut self, amount: f64) {
        self.map.scroll(amount);
    }

    // ── Output ─────────────────────────────────────────────────────────

    pub fn frame(&self, atlas: &impl SpriteAtlas) -> RenderFrame {
        RenderFrame::build(
            &self.map,
            &self.buildings,
            self.population.pedestrians(),
            &self.strikes,
            atlas,
        )
    }

    pub fn drain_audio_cues(&mut self) -> Vec<AudioCue> {
        self.audio.drain()
    }

    pub fn stats(&self) -> SimStats {
        let mut stats = SimStats {
            tick: self.tick,
            sim_time: self.sim_time,
            strikes_fired: self.strikes.launched,
            casualties: self.population.casualties,
            conversions: self.population.conversions,
            reversions: self.population.reversions,
            buildings: self.buildings.len(),
            buildings_destroyed: self.buildings.destroyed_count(),
            buildings_regrowing: self.buildings.regrowing().len(),
            ..SimStats::default()
        };
        for p in self.population.pedestrians() {
            match p.state {
                MoveState::Dead => {
                    stats.dead += 1;
                    continue;
                }
                MoveState::Mourning => stats.mourning += 1,
                MoveState::Converting => stats.converting += 1,
                _ => {}
            }
            stats.living += 1;
            match p.kind {
                PedestrianKind::Civilian(_) => stats.civilians += 1,
                PedestrianKind::Animal => stats.animals += 1,
                PedestrianKind::Hostile { .. } => stats.hostiles += 1,
            }
        }
        stats
    }

    // ── Persistence ────────────────────────────────────────────────────

    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_simulation(writer, self)
    }

    pub fn load<R: Read>(reader: R) -> Result<Self, SaveError> {
        persistence::load_simulation(reader)
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
