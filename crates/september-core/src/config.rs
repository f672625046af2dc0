//! Simulation configuration.
//!
//! Every field defaults to the tuning constants in
//! `september_logic::constants`; a JSON file only needs the fields it
//! changes. Loaded configs are validated before use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use september_logic::constants::{buildings, map, pedestrians, population, strike, timing};

/// Top-level simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the engine's random number generator.
    pub seed: u64,
    /// Fixed simulation step in seconds.
    pub fixed_step: f64,
    /// Longest wall-clock slice simulated per `advance` call.
    pub max_frame_time: f64,
    /// Simulated seconds per real second.
    pub time_scale: f64,
    pub map: MapConfig,
    pub buildings: BuildingConfig,
    pub pedestrians: PedestrianConfig,
    pub population: PopulationConfig,
    pub strike: StrikeConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5e97_2001,
            fixed_step: timing::FIXED_STEP,
            max_frame_time: timing::MAX_FRAME_TIME,
            time_scale: 1.0,
            map: MapConfig::default(),
            buildings: BuildingConfig::default(),
            pedestrians: PedestrianConfig::default(),
            population: PopulationConfig::default(),
            strike: StrikeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub size: i32,
    pub screen_width: f64,
    pub screen_height: f64,
    pub tile_step_x: f64,
    pub tile_step_y: f64,
    pub random_tile_attempts: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            size: map::MAP_SIZE,
            screen_width: map::SCREEN_WIDTH,
            screen_height: map::SCREEN_HEIGHT,
            tile_step_x: map::TILE_STEP_X,
            tile_step_y: map::TILE_STEP_Y,
            random_tile_attempts: map::RANDOM_TILE_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub regrowth_interval: f64,
    pub regrowth_increment: i32,
    pub blast_radius: i32,
    pub blast_center_damage: i32,
    pub blast_ring_decrement: i32,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            regrowth_interval: buildings::REGROWTH_INTERVAL,
            regrowth_increment: buildings::REGROWTH_INCREMENT,
            blast_radius: buildings::BLAST_RADIUS,
            blast_center_damage: buildings::BLAST_CENTER_DAMAGE,
            blast_ring_decrement: buildings::BLAST_RING_DECREMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedestrianConfig {
    pub parts_per_tile: u32,
    pub part_time: f64,
    pub anim_frame_time: f64,
    pub mourn_duration: f64,
    pub death_duration: f64,
    pub death_jitter: f64,
    pub fade_duration: f64,
}

impl Default for PedestrianConfig {
    fn default() -> Self {
        Self {
            parts_per_tile: pedestrians::PARTS_PER_TILE,
            part_time: pedestrians::PART_TIME,
            anim_frame_time: pedestrians::ANIM_FRAME_TIME,
            mourn_duration: pedestrians::MOURN_DURATION,
            death_duration: pedestrians::DEATH_DURATION,
            death_jitter: pedestrians::DEATH_JITTER,
            fade_duration: pedestrians::FADE_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub target: usize,
    pub hostile_floor: usize,
    pub spawn_interval: f64,
    pub spawn_jitter: f64,
    pub mourners_per_death: usize,
    pub mourn_offset: i32,
    pub hostile_respawn_chance: f64,
    pub de_escalation_period: f64,
    pub reversion_quota_start: usize,
    pub reversion_quota_step: usize,
    pub animal_chance: f64,
    /// Relative weights for men, women and kids.
    pub civilian_weights: [u32; 3],
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            target: population::TARGET,
            hostile_floor: population::HOSTILE_FLOOR,
            spawn_interval: population::SPAWN_INTERVAL,
            spawn_jitter: population::SPAWN_JITTER,
            mourners_per_death: population::MOURNERS_PER_DEATH,
            mourn_offset: population::MOURN_OFFSET,
            hostile_respawn_chance: population::HOSTILE_RESPAWN_CHANCE,
            de_escalation_period: population::DE_ESCALATION_PERIOD,
            reversion_quota_start: population::REVERSION_QUOTA_START,
            reversion_quota_step: population::REVERSION_QUOTA_STEP,
            animal_chance: population::ANIMAL_CHANCE,
            civilian_weights: population::CIVILIAN_WEIGHTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeConfig {
    pub frame_rate: f64,
    pub explode_frame: u32,
    pub destruct_frame: u32,
    pub frame_count: u32,
    pub scar_fade_time: f64,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            frame_rate: strike::FRAME_RATE,
            explode_frame: strike::EXPLODE_FRAME,
            destruct_frame: strike::DESTRUCT_FRAME,
            frame_count: strike::FRAME_COUNT,
            scar_fade_time: strike::SCAR_FADE_TIME,
        }
    }
}

/// A single problem found by [`SimConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    /// A duration or rate that must be strictly positive.
    NonPositive(&'static str),
    /// A value that may be zero but not negative.
    Negative(&'static str),
    /// A probability outside `[0, 1]`.
    InvalidProbability(&'static str),
    /// Hostile floor larger than the whole population.
    FloorAboveTarget { floor: usize, target: usize },
    /// Strike frames out of order.
    StrikeFrameOrder,
    /// All civilian weights are zero.
    NoCivilianWeight,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::NonPositive(field) => write!(f, "{} must be positive", field),
            ConfigIssue::Negative(field) => write!(f, "{} must not be negative", field),
            ConfigIssue::InvalidProbability(field) => {
                write!(f, "{} must be between 0 and 1", field)
            }
            ConfigIssue::FloorAboveTarget { floor, target } => write!(
                f,
                "hostile floor {} exceeds population target {}",
                floor, target
            ),
            ConfigIssue::StrikeFrameOrder => write!(
                f,
                "strike frames must satisfy explode <= destruct < frame_count"
            ),
            ConfigIssue::NoCivilianWeight => write!(f, "at least one civilian weight must be set"),
        }
    }
}

impl SimConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    /// Check the config, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let positive = [
            ("fixed_step", self.fixed_step),
            ("max_frame_time", self.max_frame_time),
            ("map.screen_width", self.map.screen_width),
            ("map.screen_height", self.map.screen_height),
            ("map.tile_step_x", self.map.tile_step_x),
            ("map.tile_step_y", self.map.tile_step_y),
            ("buildings.regrowth_interval", self.buildings.regrowth_interval),
            ("pedestrians.part_time", self.pedestrians.part_time),
            ("pedestrians.anim_frame_time", self.pedestrians.anim_frame_time),
            ("pedestrians.fade_duration", self.pedestrians.fade_duration),
            ("population.spawn_interval", self.population.spawn_interval),
            ("population.de_escalation_period", self.population.de_escalation_period),
            ("strike.frame_rate", self.strike.frame_rate),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                issues.push(ConfigIssue::NonPositive(name));
            }
        }
        if self.time_scale.is_nan() || self.time_scale < 0.0 {
            issues.push(ConfigIssue::Negative("time_scale"));
        }
        if self.map.size <= 0 {
            issues.push(ConfigIssue::NonPositive("map.size"));
        }
        if self.buildings.regrowth_increment <= 0 {
            issues.push(ConfigIssue::NonPositive("buildings.regrowth_increment"));
        }
        if self.buildings.blast_radius < 0 {
            issues.push(ConfigIssue::Negative("buildings.blast_radius"));
        }
        if self.pedestrians.parts_per_tile == 0 {
            issues.push(ConfigIssue::NonPositive("pedestrians.parts_per_tile"));
        }

        let probabilities = [
            ("population.hostile_respawn_chance", self.population.hostile_respawn_chance),
            ("population.animal_chance", self.population.animal_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigIssue::InvalidProbability(name));
            }
        }

        if self.population.hostile_floor > self.population.target {
            issues.push(ConfigIssue::FloorAboveTarget {
                floor: self.population.hostile_floor,
                target: self.population.target,
            });
        }
        if self.population.civilian_weights.iter().all(|&w| w == 0) {
            issues.push(ConfigIssue::NoCivilianWeight);
        }
        let s = &self.strike;
        if s.explode_frame > s.destruct_frame || s.destruct_frame >= s.frame_count {
            issues.push(ConfigIssue::StrikeFrameOrder);
        }

        issues
    }
}

/// Errors that can occur while loading a config
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(Vec<ConfigIssue>),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(issues) => {
                let list: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
                write!(f, "Invalid config: {}", list.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(r#"{ "seed": 7, "population": { "target": 40 } }"#)
            .expect("valid config");
        assert_eq!(config.seed, 7);
        assert_eq!(config.population.target, 40);
        assert_eq!(config.population.hostile_floor, population::HOSTILE_FLOOR);
        assert_eq!(config.map.size, map::MAP_SIZE);
    }

    #[test]
    fn test_invalid_config_reports_all_issues() {
        let json = r#"{
            "fixed_step": 0.0,
            "population": { "target": 5, "hostile_floor": 10, "animal_chance": 1.5 }
        }"#;
        match SimConfig::from_json_str(json) {
            Err(ConfigError::Invalid(issues)) => {
                assert!(issues.contains(&ConfigIssue::NonPositive("fixed_step")));
                assert!(issues.contains(&ConfigIssue::InvalidProbability(
                    "population.animal_chance"
                )));
                assert!(issues.contains(&ConfigIssue::FloorAboveTarget {
                    floor: 10,
                    target: 5
                }));
            }
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_building_tuning_is_checked() {
        let mut config = SimConfig::default();
        config.buildings.regrowth_increment = 0;
        config.buildings.blast_radius = -1;
        let issues = config.validate();
        assert!(issues.contains(&ConfigIssue::NonPositive("buildings.regrowth_increment")));
        assert!(issues.contains(&ConfigIssue::Negative("buildings.blast_radius")));

        // A zero radius still hits the target tile.
        config.buildings.regrowth_increment = 5;
        config.buildings.blast_radius = 0;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
