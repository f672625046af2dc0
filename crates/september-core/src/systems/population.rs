//! Population manager - spawning, kills, mourner assignment, de-escalation

use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use september_logic::TilePos;

use crate::audio::AudioQueue;
use crate::components::{CivilianKind, EntityEvent, Pedestrian, PedestrianKind};
use crate::config::{PedestrianConfig, PopulationConfig};
use crate::map::IsoMap;

/// Outcome of one kill query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillReport {
    pub killed: usize,
    pub civilians: usize,
    pub hostiles: usize,
    pub animals: usize,
    /// Replacement hostiles spawned for killed ones.
    pub respawned: usize,
    /// Indices of pedestrians sent to mourn.
    pub mourners: Vec<usize>,
}

/// Owns every pedestrian and the population-wide timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationManager {
    pedestrians: Vec<Pedestrian>,
    spawn_timer: f64,
    de_escalation_timer: f64,
    /// De-escalation cycles completed since the last kill.
    quiet_cycles: usize,
    pub conversions: u64,
    pub reversions: u64,
    pub casualties: u64,
    config: PopulationConfig,
    pedestrian_config: PedestrianConfig,
}

impl PopulationManager {
    pub fn new(config: &PopulationConfig, pedestrian_config: &PedestrianConfig) -> Self {
        Self {
            pedestrians: Vec::new(),
            spawn_timer: config.spawn_interval,
            de_escalation_timer: config.de_escalation_period,
            quiet_cycles: 0,
            conversions: 0,
            reversions: 0,
            casualties: 0,
            config: config.clone(),
            pedestrian_config: pedestrian_config.clone(),
        }
    }

    pub fn pedestrians(&self) -> &[Pedestrian] {
        &self.pedestrians
    }

    /// Mutable access for scripted setups.
    pub fn pedestrians_mut(&mut self) -> &mut Vec<Pedestrian> {
        &mut self.pedestrians
    }

    pub fn de_escalation_remaining(&self) -> f64 {
        self.de_escalation_timer
    }

    pub fn quiet_cycles(&self) -> usize {
        self.quiet_cycles
    }

    // ── Counts ─────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.pedestrians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pedestrians.is_empty()
    }

    pub fn living_count(&self) -> usize {
        self.pedestrians.iter().filter(|p| p.is_alive()).count()
    }

    pub fn hostile_count(&self) -> usize {
        self.pedestrians
            .iter()
            .filter(|p| p.is_alive() && p.kind.is_hostile())
            .count()
    }

    /// Living hostiles that are not already reverting.
    pub fn effective_hostile_count(&self) -> usize {
        self.pedestrians
            .iter()
            .filter(|p| p.is_effective_hostile())
            .count()
    }

    // ── Spawning ───────────────────────────────────────────────────────

    fn random_civilian(&self, rng: &mut impl Rng) -> CivilianKind {
        match WeightedIndex::new(self.config.civilian_weights) {
            Ok(dist) => CivilianKind::ALL[dist.sample(rng)],
            Err(_) => CivilianKind::Man,
        }
    }

    fn random_peaceful_kind(&self, rng: &mut impl Rng) -> PedestrianKind {
        if rng.gen_bool(self.config.animal_chance.clamp(0.0, 1.0)) {
            PedestrianKind::Animal
        } else {
            PedestrianKind::Civilian(self.random_civilian(rng))
        }
    }

    fn random_hostile(&self, rng: &mut impl Rng) -> PedestrianKind {
        PedestrianKind::Hostile {
            former: self.random_civilian(rng),
        }
    }

    /// Add a pedestrian; returns its index.
    pub fn spawn(&mut self, kind: PedestrianKind, tile: TilePos) -> usize {
        self.pedestrians.push(Pedestrian::new(kind, tile));
        self.pedestrians.len() - 1
    }

    /// Replace everyone with a fresh population: the hostile floor first,
    /// then peaceful pedestrians up to the target.
    pub fn populate(&mut self, map: &IsoMap, rng: &mut impl Rng) {
        self.pedestrians.clear();
        let floor = self.config.hostile_floor.min(self.config.target);
        for _ in 0..floor {
            let kind = self.random_hostile(rng);
            let tile = map.random_tile_anywhere(rng);
            self.spawn(kind, tile);
        }
        for _ in floor..self.config.target {
            let kind = self.random_peaceful_kind(rng);
            let tile = map.random_tile_anywhere(rng);
            self.spawn(kind, tile);
        }
        self.spawn_timer = self.config.spawn_interval;
        self.de_escalation_timer = self.config.de_escalation_period;
        self.quiet_cycles = 0;
        info!(
            "Populated {} pedestrians ({} hostile)",
            self.pedestrians.len(),
            floor
        );
    }

    fn update_spawning(&mut self, dt: f64, map: &IsoMap, rng: &mut impl Rng) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            let jitter = if self.config.spawn_jitter > 0.0 {
                rng.gen_range(-self.config.spawn_jitter..=self.config.spawn_jitter)
            } else {
                0.0
            };
            let interval = self.config.spawn_interval;
            self.spawn_timer = (interval + jitter).max(interval * 0.1);
            if self.living_count() < self.config.target {
                let kind = self.random_peaceful_kind(rng);
                let tile = map.random_tile_off_screen(rng);
                self.spawn(kind, tile);
            }
        }

        let hostiles = self.effective_hostile_count();
        for _ in hostiles..self.config.hostile_floor {
            let kind = self.random_hostile(rng);
            let tile = map.random_tile_off_screen(rng);
            self.spawn(kind, tile);
        }
    }

    // ── De-escalation ──────────────────────────────────────────────────

    fn update_de_escalation(&mut self, dt: f64, rng: &mut impl Rng) {
        self.de_escalation_timer -= dt;
        if self.de_escalation_timer > 0.0 {
            return;
        }
        self.de_escalation_timer += self.config.de_escalation_period;
        self.quiet_cycles += 1;

        let quota = self.config.reversion_quota_start
            + self.config.reversion_quota_step * (self.quiet_cycles - 1);
        let spare = self
            .effective_hostile_count()
            .saturating_sub(self.config.hostile_floor);
        let count = quota.min(spare);
        if count == 0 {
            return;
        }

        let candidates: Vec<usize> = self
            .pedestrians
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_effective_hostile())
            .map(|(i, _)| i)
            .collect();
        let chosen: Vec<usize> = candidates.choose_multiple(rng, count).copied().collect();
        for i in chosen {
            self.pedestrians[i].begin_reversion();
        }
        debug!(
            "De-escalation cycle {}: reverting {} hostiles",
            self.quiet_cycles, count
        );
    }

    // ── Tick ───────────────────────────────────────────────────────────

    /// Timers first, then every pedestrian, then the removal sweep.
    pub fn update(
        &mut self,
        dt: f64,
        map: &IsoMap,
        rng: &mut impl Rng,
        audio: &mut AudioQueue,
    ) {
        self.update_spawning(dt, map, rng);
        self.update_de_escalation(dt, rng);

        for i in 0..self.pedestrians.len() {
            let event = self.pedestrians[i].update(dt, map, &self.pedestrian_config, rng);
            match event {
                Some(EntityEvent::MourningStarted) => audio.start_cry(),
                Some(EntityEvent::MourningEnded) => audio.stop_cry(),
                Some(EntityEvent::ConversionComplete) => {
                    let hostile = self.pedestrians[i].converted();
                    debug!("Civilian at {:?} turned hostile", hostile.tile);
                    self.pedestrians[i] = hostile;
                    self.conversions += 1;
                }
                Some(EntityEvent::ReversionComplete) => {
                    let civilian = self.pedestrians[i].reverted();
                    debug!("Hostile at {:?} reverted", civilian.tile);
                    self.pedestrians[i] = civilian;
                    self.reversions += 1;
                }
                None => {}
            }
        }

        self.pedestrians.retain(|p| !p.is_removed());
    }

    // ── Kills ──────────────────────────────────────────────────────────

    /// Kill every living pedestrian within `radius` tiles (square) of
    /// `center`, respawn some hostiles, restart the de-escalation clock and
    /// send mourners to the civilian casualties.
    pub fn kill(
        &mut self,
        center: TilePos,
        radius: i32,
        map: &IsoMap,
        rng: &mut impl Rng,
        audio: &mut AudioQueue,
    ) -> KillReport {
        let mut report = KillReport::default();
        let mut casualties: Vec<TilePos> = Vec::new();

        for p in self.pedestrians.iter_mut() {
            if !p.is_alive() || p.tile.chebyshev_distance(center) > radius {
                continue;
            }
            let kind = p.kind;
            if p.kill(&self.pedestrian_config, rng) == Some(EntityEvent::MourningEnded) {
                audio.stop_cry();
            }
            report.killed += 1;
            match kind {
                PedestrianKind::Civilian(_) => {
                    report.civilians += 1;
                    casualties.push(p.tile);
                }
                PedestrianKind::Hostile { .. } => report.hostiles += 1,
                PedestrianKind::Animal => report.animals += 1,
            }
        }

        for _ in 0..report.hostiles {
            if rng.gen_bool(self.config.hostile_respawn_chance.clamp(0.0, 1.0)) {
                let kind = self.random_hostile(rng);
                let tile = map.random_tile_off_screen(rng);
                self.spawn(kind, tile);
                report.respawned += 1;
            }
        }

        self.de_escalation_timer = self.config.de_escalation_period;
        self.quiet_cycles = 0;
        self.casualties += report.killed as u64;

        report.mourners = self.assign_mourners(&casualties, map, rng);
        debug!(
            "Strike at {:?}: {} killed ({} civilians, {} hostiles), {} mourners",
            center,
            report.killed,
            report.civilians,
            report.hostiles,
            report.mourners.len()
        );
        report
    }

    /// Pick the nearest eligible civilians across all casualties and send
    /// each to a spot beside its own nearest casualty.
    fn assign_mourners(
        &mut self,
        casualties: &[TilePos],
        map: &IsoMap,
        rng: &mut impl Rng,
    ) -> Vec<usize> {
        if casualties.is_empty() {
            return Vec::new();
        }
        let quota = casualties.len() * self.config.mourners_per_death;

        let nearest = |tile: TilePos| -> (i64, TilePos) {
            casualties
                .iter()
                .map(|&c| (tile.distance_squared(c), c))
                .min_by_key(|(d, _)| *d)
                .unwrap_or((i64::MAX, tile))
        };

        let mut candidates: Vec<(i64, usize, TilePos)> = self
            .pedestrians
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_available_mourner())
            .map(|(i, p)| {
                let (distance, casualty) = nearest(p.tile);
                (distance, i, casualty)
            })
            .collect();
        candidates.sort_by_key(|&(distance, i, _)| (distance, i));
        candidates.truncate(quota);

        let offset = self.config.mourn_offset;
        let mut sides = [(offset, 0), (-offset, 0), (0, offset), (0, -offset)];
        let mut assigned = Vec::with_capacity(candidates.len());
        for (_, i, casualty) in candidates {
            sides.shuffle(rng);
            let target = sides
                .iter()
                .map(|&(dx, dy)| casualty.offset(dx, dy).clamped(map.size()))
                .find(|&t| map.is_walkable(t))
                .unwrap_or(casualty);
            self.pedestrians[i].order_mourning(target, casualty);
            assigned.push(i);
        }
        assigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MoveState;
    use crate::config::MapConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f64 = 1.0 / 48.0;

    fn setup(config: PopulationConfig) -> (IsoMap, PopulationManager, StdRng, AudioQueue) {
        (
            IsoMap::new(&MapConfig::default()),
            PopulationManager::new(&config, &PedestrianConfig::default()),
            StdRng::seed_from_u64(3),
            AudioQueue::new(),
        )
    }

    fn man() -> PedestrianKind {
        PedestrianKind::Civilian(CivilianKind::Man)
    }

    fn hostile() -> PedestrianKind {
        PedestrianKind::Hostile {
            former: CivilianKind::Woman,
        }
    }

    #[test]
    fn test_populate_meets_target_and_floor() {
        let (map, mut pop, mut rng, _) = setup(PopulationConfig::default());
        pop.populate(&map, &mut rng);
        assert_eq!(pop.len(), 100);
        assert_eq!(pop.hostile_count(), 10);
    }

    #[test]
    fn test_floor_is_restored() {
        let (map, mut pop, mut rng, mut audio) = setup(PopulationConfig::default());
        pop.spawn(hostile(), TilePos::new(5, 5));
        pop.update(DT, &map, &mut rng, &mut audio);
        assert_eq!(pop.effective_hostile_count(), 10);
    }

    #[test]
    fn test_killed_hostiles_respawn_off_screen() {
        let config = PopulationConfig {
            hostile_floor: 0,
            hostile_respawn_chance: 1.0,
            ..PopulationConfig::default()
        };
        let (map, mut pop, mut rng, mut audio) = setup(config);
        pop.spawn(hostile(), TilePos::new(60, 60));
        pop.spawn(hostile(), TilePos::new(61, 60));
        let report = pop.kill(TilePos::new(60, 60), 2, &map, &mut rng, &mut audio);

        assert_eq!(report.hostiles, 2);
        assert_eq!(report.respawned, 2);
        assert_eq!(pop.len(), 4);
        for p in &pop.pedestrians()[2..] {
            assert!(p.is_alive());
            assert!(p.kind.is_hostile());
            assert!(!map.is_on_screen(p.tile));
        }
    }

    #[test]
    fn test_spawns_off_screen_below_cap() {
        let config = PopulationConfig {
            target: 1,
            hostile_floor: 0,
            ..PopulationConfig::default()
        };
        let interval = config.spawn_interval;
        let jitter = config.spawn_jitter;
        let (map, mut pop, mut rng, _) = setup(config);

        pop.update_spawning(interval * 0.5, &map, &mut rng);
        assert!(pop.is_empty());
        pop.update_spawning(interval * 0.5 + 1e-9, &map, &mut rng);
        assert_eq!(pop.len(), 1);
        let p = &pop.pedestrians()[0];
        assert!(!p.kind.is_hostile());
        assert!(map.is_walkable(p.tile));
        assert!(!map.is_on_screen(p.tile));

        let next = pop.spawn_timer;
        assert!(next >= (interval - jitter).max(interval * 0.1) - 1e-9);
        assert!(next <= interval + jitter + 1e-9);

        // At the cap the timer still runs but nobody new appears.
        pop.update_spawning(next + 1e-9, &map, &mut rng);
        assert_eq!(pop.len(), 1);
    }

    #[test]
    fn test_kill_radius_is_square() {
        let config = PopulationConfig {
            hostile_floor: 0,
            ..PopulationConfig::default()
        };
        let (map, mut pop, mut rng, mut audio) = setup(config);
        let inside = pop.spawn(man(), TilePos::new(13, 13));
        let outside = pop.spawn(man(), TilePos::new(14, 10));
        let report = pop.kill(TilePos::new(10, 10), 3, &map, &mut rng, &mut audio);

        assert_eq!(report.killed, 1);
        assert_eq!(pop.pedestrians()[inside].state, MoveState::Dead);
        assert!(pop.pedestrians()[outside].is_alive());
        assert_eq!(report.mourners, vec![outside]);
    }

    #[test]
    fn test_mourners_are_nearest_first() {
        let config = PopulationConfig {
            hostile_floor: 0,
            mourners_per_death: 2,
            ..PopulationConfig::default()
        };
        let (map, mut pop, mut rng, mut audio) = setup(config);
        pop.spawn(man(), TilePos::new(50, 50));
        let far = pop.spawn(man(), TilePos::new(90, 90));
        let near = pop.spawn(man(), TilePos::new(56, 50));
        let mid = pop.spawn(man(), TilePos::new(60, 60));
        let dog = pop.spawn(PedestrianKind::Animal, TilePos::new(55, 50));

        let report = pop.kill(TilePos::new(50, 50), 1, &map, &mut rng, &mut audio);
        assert_eq!(report.mourners, vec![near, mid]);
        assert!(!report.mourners.contains(&far));
        assert!(!report.mourners.contains(&dog));

        let mourner = &pop.pedestrians()[near];
        assert!(mourner.pending_conversion);
        let target = mourner.future_destination.unwrap();
        assert_eq!(target.chebyshev_distance(TilePos::new(50, 50)), 2);
    }

    #[test]
    fn test_kill_resets_de_escalation() {
        let (map, mut pop, mut rng, mut audio) = setup(PopulationConfig::default());
        pop.update(30.0, &map, &mut rng, &mut audio);
        assert!(pop.de_escalation_remaining() < 90.0);
        pop.kill(TilePos::new(0, 0), 1, &map, &mut rng, &mut audio);
        assert_eq!(pop.de_escalation_remaining(), 90.0);
    }

    #[test]
    fn test_de_escalation_quota_grows() {
        let config = PopulationConfig {
            hostile_floor: 2,
            target: 20,
            ..PopulationConfig::default()
        };
        let (map, mut pop, mut rng, mut audio) = setup(config);
        for i in 0..10 {
            pop.spawn(hostile(), TilePos::new(10 + i, 10));
        }
        let period = pop.config.de_escalation_period;

        pop.update(period, &map, &mut rng, &mut audio);
        assert_eq!(pop.effective_hostile_count(), 9);
        pop.update(period, &map, &mut rng, &mut audio);
        assert_eq!(pop.effective_hostile_count(), 7);
        pop.update(period, &map, &mut rng, &mut audio);
        assert_eq!(pop.effective_hostile_count(), 4);
        pop.update(period, &map, &mut rng, &mut audio);
        assert_eq!(pop.effective_hostile_count(), 2);
    }

    #[test]
    fn test_conversion_replaces_in_place() {
        let config = PopulationConfig {
            hostile_floor: 0,
            target: 1,
            ..PopulationConfig::default()
        };
        let (map, mut pop, mut rng, mut audio) = setup(config);
        let i = pop.spawn(man(), TilePos::new(30, 30));
        pop.pedestrians_mut()[i].order_mourning(TilePos::new(30, 30), TilePos::new(32, 30));

        for _ in 0..(48 * 6) {
            pop.update(DT, &map, &mut rng, &mut audio);
        }
        assert_eq!(pop.conversions, 1);
        assert!(pop.pedestrians()[i].kind.is_hostile());
        assert_eq!(audio.criers(), 0);
    }
}
