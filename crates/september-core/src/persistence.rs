//! Save/Load functionality
//!
//! Two formats live here:
//! - the editor's placement list, plain JSON via `serde_json`
//! - full session snapshots, binary via `bincode`, versioned

use std::io::{Read, Write};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::components::Placement;
use crate::config::SimConfig;
use crate::engine::SimulationEngine;
use crate::map::IsoMap;
use crate::systems::{BuildingRegistry, PopulationManager, StrikeController};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub config: SimConfig,
    pub tick: u64,
    pub sim_time: f64,
    pub accumulator: f64,
    pub time_scale: f64,
    pub map: IsoMap,
    pub buildings: BuildingRegistry,
    pub population: PopulationManager,
    pub strikes: StrikeController,
}

/// Save the complete simulation to a writer
pub fn save_simulation<W: Write>(writer: W, engine: &SimulationEngine) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        config: engine.config.clone(),
        tick: engine.tick(),
        sim_time: engine.sim_time(),
        accumulator: engine.accumulator(),
        time_scale: engine.time_scale(),
        map: engine.map.clone(),
        buildings: engine.buildings.clone(),
        population: engine.population.clone(),
        strikes: engine.strikes.clone(),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a simulation from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<SimulationEngine, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut map = save_data.map;
    // The grid is derived data; rebuild it so it always matches the list.
    save_data.buildings.restamp(&mut map);

    info!(
        "Loaded session at tick {} ({} buildings, {} pedestrians)",
        save_data.tick,
        save_data.buildings.len(),
        save_data.population.len()
    );

    Ok(SimulationEngine::from_parts(
        save_data.config,
        map,
        save_data.buildings,
        save_data.population,
        save_data.strikes,
        save_data.tick,
        save_data.sim_time,
        save_data.accumulator,
        save_data.time_scale,
    ))
}

/// Read the editor's placement list.
pub fn load_placements<R: Read>(reader: R) -> Result<Vec<Placement>, SaveError> {
    let placements: Vec<Placement> = serde_json::from_reader(reader)?;
    let unknown = placements
        .iter()
        .filter(|p| september_logic::buildings::archetype(p.archetype).is_none())
        .count();
    if unknown > 0 {
        warn!("{} placements refer to unknown archetypes", unknown);
    }
    Ok(placements)
}

/// Parse a placement list from a JSON string.
pub fn placements_from_json(json: &str) -> Result<Vec<Placement>, SaveError> {
    load_placements(json.as_bytes())
}

/// Write a placement list as pretty JSON.
pub fn save_placements<W: Write>(writer: W, placements: &[Placement]) -> Result<(), SaveError> {
    serde_json::to_writer_pretty(writer, placements)?;
    Ok(())
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Json(e) => write!(f, "Placement JSON error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
