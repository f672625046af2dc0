//! C FFI bindings for the SeptemberWeb simulation engine
//!
//! This crate exposes a C-compatible API so a host renderer (a browser shell,
//! a game engine, or anything with C FFI) can drive the town simulation and
//! read back what to draw.
//!
//! # Basic Usage (C)
//! ```c
//! #include "september.h"
//!
//! SeptemberHandle sim = september_create();
//! september_load_placements(sim, town_json);
//! september_populate(sim);
//!
//! while (running) {
//!     september_advance(sim, delta_time);
//!
//!     uint32_t count = september_pedestrian_count(sim);
//!     for (uint32_t i = 0; i < count; i++) {
//!         SeptemberPedestrian ped;
//!         if (september_get_pedestrian(sim, i, &ped)) {
//!             // Draw ped.frame at (ped.screen_x, ped.screen_y).
//!         }
//!     }
//!
//!     uint8_t cue;
//!     while ((cue = september_next_audio_cue(sim)) != 0) {
//!         play_cue(cue);
//!     }
//! }
//!
//! september_destroy(sim);
//! ```

use std::collections::VecDeque;
use std::ffi::CStr;
use std::os::raw::c_char;

use log::warn;
use september_core::persistence::placements_from_json;
use september_core::prelude::*;
use september_core::systems::BuildingRegistry;
use september_logic::clips::PedestrianArchetype;

/// Engine plus the host-side state the C API needs between calls.
pub struct SeptemberSim {
    engine: SimulationEngine,
    atlas: StaticAtlas,
    cues: VecDeque<AudioCue>,
}

impl SeptemberSim {
    fn new(engine: SimulationEngine) -> Self {
        let atlas = StaticAtlas::with_defaults(engine.map.projection());
        Self {
            engine,
            atlas,
            cues: VecDeque::new(),
        }
    }
}

/// Opaque handle to the simulation
pub type SeptemberHandle = *mut SeptemberSim;

/// Pedestrian data returned to C
#[repr(C)]
pub struct SeptemberPedestrian {
    /// Index of this pedestrian (0 to pedestrian_count-1)
    pub index: u32,
    /// Screen position of the sprite anchor, scroll applied
    pub screen_x: f32,
    pub screen_y: f32,
    pub tile_x: i32,
    pub tile_y: i32,
    /// 0 = civilian, 1 = animal, 2 = hostile
    pub kind: u8,
    /// Sprite sheet `frame` indexes: 0 man, 1 woman, 2 kid, 3 dog,
    /// 4 hostile. A reverting hostile reports its former kind's sheet.
    pub sheet: u8,
    /// 0 idle, 1 moving, 2/3 avoiding, 4 mourning, 5 dead, 6 converting
    pub state: u8,
    /// Frame within the archetype's sprite sheet
    pub frame: u32,
    pub opacity: f32,
    /// Paint key shared with `SeptemberBuilding::depth`; draw lower first,
    /// breaking ties by `screen_y`
    pub depth: u32,
}

/// Building data returned to C, indexed in paint order
#[repr(C)]
pub struct SeptemberBuilding {
    /// Placement-order id
    pub id: u32,
    /// Catalog index
    pub archetype: u32,
    pub anchor_x: i32,
    pub anchor_y: i32,
    /// Screen point the sprite's registration point sits on
    pub screen_x: f32,
    pub screen_y: f32,
    pub health: i32,
    /// Index into the archetype's sprite list
    pub sprite: u32,
    /// 1 if destroyed
    pub destroyed: u8,
    /// 1 if tall
    pub tall: u8,
    /// Paint key shared with `SeptemberPedestrian::depth`
    pub depth: u32,
}

/// The missile in flight
#[repr(C)]
pub struct SeptemberStrike {
    pub target_x: i32,
    pub target_y: i32,
    /// Screen point of the tapped spot, scroll applied
    pub screen_x: f32,
    pub screen_y: f32,
    /// Frame of the missile sheet
    pub frame: u32,
    /// 1 once the explosion has started
    pub exploded: u8,
}

/// A fading scar left by an impact
#[repr(C)]
pub struct SeptemberScar {
    pub screen_x: f32,
    pub screen_y: f32,
    pub opacity: f32,
}

/// Result of a tap on the town
#[repr(C)]
pub struct SeptemberHit {
    pub building: u32,
    /// 0 = whole, 1 = upper half, 2 = lower half
    pub part: u8,
}

/// Simulation statistics
#[repr(C)]
pub struct SeptemberStats {
    pub tick: u64,
    /// Simulated seconds since start
    pub sim_time: f64,
    pub living: u32,
    pub civilians: u32,
    pub animals: u32,
    pub hostiles: u32,
    pub dead: u32,
    pub mourning: u32,
    pub strikes_fired: u32,
    pub casualties: u32,
    pub conversions: u32,
    pub reversions: u32,
    pub buildings_destroyed: u32,
    pub buildings_regrowing: u32,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn sim_ref<'a>(handle: SeptemberHandle) -> Option<&'a SeptemberSim> {
    if handle.is_null() {
        return None;
    }
    Some(unsafe { &*handle })
}

fn sim_mut<'a>(handle: SeptemberHandle) -> Option<&'a mut SeptemberSim> {
    if handle.is_null() {
        return None;
    }
    Some(unsafe { &mut *handle })
}

fn read_str<'a>(text: *const c_char) -> Option<&'a str> {
    if text.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(text) }.to_str().ok()
}

fn kind_code(kind: PedestrianKind) -> u8 {
    match kind {
        PedestrianKind::Civilian(_) => 0,
        PedestrianKind::Animal => 1,
        PedestrianKind::Hostile { .. } => 2,
    }
}

fn sheet_code(sheet: PedestrianArchetype) -> u8 {
    match sheet {
        PedestrianArchetype::Man => 0,
        PedestrianArchetype::Woman => 1,
        PedestrianArchetype::Kid => 2,
        PedestrianArchetype::Dog => 3,
        PedestrianArchetype::Hostile => 4,
    }
}

fn offset_point(map: &IsoMap, tile: TilePos, offset: ScreenOffset) -> (f32, f32) {
    let (x, y) = map.tile_center_to_screen(tile);
    ((x + offset.x) as f32, (y + offset.y) as f32)
}

// ============================================================================
// Lifecycle Functions
// ============================================================================

/// Create a simulation with default settings and an empty town
///
/// Returns a handle that must be freed with `september_destroy`
#[no_mangle]
pub extern "C" fn september_create() -> SeptemberHandle {
    Box::into_raw(Box::new(SeptemberSim::new(SimulationEngine::default())))
}

/// Create a simulation from a JSON config
///
/// Returns null if the config cannot be parsed or fails validation.
#[no_mangle]
pub extern "C" fn september_create_with_config(json: *const c_char) -> SeptemberHandle {
    let Some(text) = read_str(json) else {
        return std::ptr::null_mut();
    };
    match SimConfig::from_json_str(text) {
        Ok(config) => Box::into_raw(Box::new(SeptemberSim::new(SimulationEngine::new(config)))),
        Err(e) => {
            warn!("Rejected config: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Destroy a simulation and free its memory
#[no_mangle]
pub extern "C" fn september_destroy(handle: SeptemberHandle) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
    }
}

/// Place buildings from a JSON placement list
///
/// Returns the number of buildings placed, or -1 if the JSON is invalid.
#[no_mangle]
pub extern "C" fn september_load_placements(handle: SeptemberHandle, json: *const c_char) -> i32 {
    let (Some(sim), Some(text)) = (sim_mut(handle), read_str(json)) else {
        return -1;
    };
    match placements_from_json(text) {
        Ok(placements) => sim.engine.place_buildings(&placements) as i32,
        Err(e) => {
            warn!("Rejected placements: {}", e);
            -1
        }
    }
}

/// Spawn the starting population
#[no_mangle]
pub extern "C" fn september_populate(handle: SeptemberHandle) {
    if let Some(sim) = sim_mut(handle) {
        sim.engine.populate();
    }
}

// ============================================================================
// Simulation Control
// ============================================================================

/// Advance by real elapsed seconds. Returns the number of fixed steps run.
#[no_mangle]
pub extern "C" fn september_advance(handle: SeptemberHandle, delta_seconds: f64) -> u32 {
    let Some(sim) = sim_mut(handle) else {
        return 0;
    };
    let steps = sim.engine.advance(delta_seconds);
    sim.cues.extend(sim.engine.drain_audio_cues());
    steps
}

/// Set the time scale (1.0 = real-time, 0.0 = paused)
#[no_mangle]
pub extern "C" fn september_set_time_scale(handle: SeptemberHandle, scale: f64) {
    if let Some(sim) = sim_mut(handle) {
        sim.engine.set_time_scale(scale);
    }
}

/// Scroll the view horizontally by `amount` pixels
#[no_mangle]
pub extern "C" fn september_scroll(handle: SeptemberHandle, amount: f64) {
    if let Some(sim) = sim_mut(handle) {
        sim.engine.scroll(amount);
    }
}

/// Current horizontal scroll in pixels
#[no_mangle]
pub extern "C" fn september_get_scroll(handle: SeptemberHandle) -> f64 {
    sim_ref(handle).map_or(0.0, |sim| sim.engine.map.scroll_offset())
}

// ============================================================================
// Input
// ============================================================================

/// Launch a strike at the tile under a screen point
///
/// Returns false if a strike is already in flight.
#[no_mangle]
pub extern "C" fn september_fire(handle: SeptemberHandle, screen_x: f64, screen_y: f64) -> bool {
    let Some(sim) = sim_mut(handle) else {
        return false;
    };
    let launched = sim.engine.fire_at(screen_x, screen_y);
    sim.cues.extend(sim.engine.drain_audio_cues());
    launched
}

/// Report which building, if any, is under a tapped point
#[no_mangle]
pub extern "C" fn september_tap(
    handle: SeptemberHandle,
    screen_x: f64,
    screen_y: f64,
    hit: *mut SeptemberHit,
) -> bool {
    let Some(sim) = sim_mut(handle) else {
        return false;
    };
    let result = sim.engine.handle_tap(screen_x, screen_y, &sim.atlas);
    sim.cues.extend(sim.engine.drain_audio_cues());

    let Some(found) = result else {
        return false;
    };
    if !hit.is_null() {
        let out = unsafe { &mut *hit };
        out.building = found.building.0 as u32;
        out.part = match found.part {
            HitPart::Whole => 0,
            HitPart::Upper => 1,
            HitPart::Lower => 2,
        };
    }
    true
}

// ============================================================================
// Query Functions
// ============================================================================

/// Get simulation statistics
#[no_mangle]
pub extern "C" fn september_get_stats(handle: SeptemberHandle, stats: *mut SeptemberStats) -> bool {
    let Some(sim) = sim_ref(handle) else {
        return false;
    };
    if stats.is_null() {
        return false;
    }
    let s = sim.engine.stats();
    let out = unsafe { &mut *stats };

    out.tick = s.tick;
    out.sim_time = s.sim_time;
    out.living = s.living as u32;
    out.civilians = s.civilians as u32;
    out.animals = s.animals as u32;
    out.hostiles = s.hostiles as u32;
    out.dead = s.dead as u32;
    out.mourning = s.mourning as u32;
    out.strikes_fired = s.strikes_fired as u32;
    out.casualties = s.casualties as u32;
    out.conversions = s.conversions as u32;
    out.reversions = s.reversions as u32;
    out.buildings_destroyed = s.buildings_destroyed as u32;
    out.buildings_regrowing = s.buildings_regrowing as u32;

    true
}

/// Number of pedestrians, dead bodies included
#[no_mangle]
pub extern "C" fn september_pedestrian_count(handle: SeptemberHandle) -> u32 {
    sim_ref(handle).map_or(0, |sim| sim.engine.population.len() as u32)
}

/// Get pedestrian data by index
///
/// Returns true if successful, false if index out of bounds
#[no_mangle]
pub extern "C" fn september_get_pedestrian(
    handle: SeptemberHandle,
    index: u32,
    pedestrian: *mut SeptemberPedestrian,
) -> bool {
    let Some(sim) = sim_ref(handle) else {
        return false;
    };
    if pedestrian.is_null() {
        return false;
    }
    let Some(p) = sim.engine.population.pedestrians().get(index as usize) else {
        return false;
    };

    let (x, y) = p.screen_position(&sim.engine.map);
    let out = unsafe { &mut *pedestrian };
    out.index = index;
    out.screen_x = x as f32;
    out.screen_y = y as f32;
    out.tile_x = p.tile.x;
    out.tile_y = p.tile.y;
    out.kind = kind_code(p.kind);
    out.sheet = sheet_code(p.sheet());
    out.state = p.state as u8;
    out.frame = p.frame;
    out.opacity = p.opacity;
    out.depth = sim.engine.map.depth(p.depth_tile());

    true
}

/// Number of placed buildings
#[no_mangle]
pub extern "C" fn september_building_count(handle: SeptemberHandle) -> u32 {
    sim_ref(handle).map_or(0, |sim| sim.engine.buildings.len() as u32)
}

/// Get building data by paint-order index (back to front)
#[no_mangle]
pub extern "C" fn september_get_building(
    handle: SeptemberHandle,
    index: u32,
    building: *mut SeptemberBuilding,
) -> bool {
    let Some(sim) = sim_ref(handle) else {
        return false;
    };
    if building.is_null() {
        return false;
    }
    let engine = &sim.engine;
    let order = engine.buildings.render_order(&engine.map);
    let Some((id, b)) = order
        .get(index as usize)
        .and_then(|&id| engine.buildings.get(id).map(|b| (id, b)))
    else {
        return false;
    };

    let (x, y) = BuildingRegistry::anchor_point(&engine.map, b);
    let out = unsafe { &mut *building };
    out.id = id.0 as u32;
    out.archetype = b.archetype as u32;
    out.anchor_x = b.anchor.x;
    out.anchor_y = b.anchor.y;
    out.screen_x = x as f32;
    out.screen_y = y as f32;
    out.health = b.health;
    out.sprite = b.sprite as u32;
    out.destroyed = u8::from(b.destroyed);
    out.tall = u8::from(b.is_tall());
    out.depth = engine.map.depth(b.anchor);

    true
}

/// Get the strike in flight
///
/// Returns false when no strike is active.
#[no_mangle]
pub extern "C" fn september_get_strike(
    handle: SeptemberHandle,
    strike: *mut SeptemberStrike,
) -> bool {
    let Some(sim) = sim_ref(handle) else {
        return false;
    };
    if strike.is_null() {
        return false;
    }
    let Some(active) = sim.engine.strikes.active() else {
        return false;
    };

    let (x, y) = offset_point(&sim.engine.map, active.target, active.offset);
    let out = unsafe { &mut *strike };
    out.target_x = active.target.x;
    out.target_y = active.target.y;
    out.screen_x = x;
    out.screen_y = y;
    out.frame = active.frame;
    out.exploded = u8::from(active.exploded);

    true
}

/// Number of ground scars still fading
#[no_mangle]
pub extern "C" fn september_scar_count(handle: SeptemberHandle) -> u32 {
    sim_ref(handle).map_or(0, |sim| sim.engine.strikes.scars().len() as u32)
}

/// Get a ground scar by index
#[no_mangle]
pub extern "C" fn september_get_scar(
    handle: SeptemberHandle,
    index: u32,
    scar: *mut SeptemberScar,
) -> bool {
    let Some(sim) = sim_ref(handle) else {
        return false;
    };
    if scar.is_null() {
        return false;
    }
    let Some(s) = sim.engine.strikes.scars().get(index as usize) else {
        return false;
    };

    let (x, y) = offset_point(&sim.engine.map, s.tile, s.offset);
    let out = unsafe { &mut *scar };
    out.screen_x = x;
    out.screen_y = y;
    out.opacity = s.opacity;

    true
}

/// Pop the next queued audio cue. Returns 0 when the queue is empty.
#[no_mangle]
pub extern "C" fn september_next_audio_cue(handle: SeptemberHandle) -> u8 {
    sim_mut(handle)
        .and_then(|sim| sim.cues.pop_front())
        .map_or(0, |cue| cue as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_null_handle_is_harmless() {
        let null = std::ptr::null_mut();
        assert_eq!(september_advance(null, 1.0), 0);
        assert_eq!(september_pedestrian_count(null), 0);
        assert!(!september_fire(null, 0.0, 0.0));
        assert_eq!(september_next_audio_cue(null), 0);
        september_destroy(null);
    }

    #[test]
    fn test_lifecycle() {
        let sim = september_create();
        let json = CString::new(r#"[{"archetype": 0, "tile_x": 60, "tile_y": 60}]"#).unwrap();
        assert_eq!(september_load_placements(sim, json.as_ptr()), 1);
        september_populate(sim);
        assert_eq!(september_pedestrian_count(sim), 100);
        assert_eq!(september_building_count(sim), 1);

        let mut building = SeptemberBuilding {
            id: 0,
            archetype: 0,
            anchor_x: 0,
            anchor_y: 0,
            screen_x: 0.0,
            screen_y: 0.0,
            health: 0,
            sprite: 0,
            destroyed: 0,
            tall: 0,
            depth: 0,
        };
        assert!(september_get_building(sim, 0, &mut building));
        assert_eq!(building.anchor_x, 60);
        assert_eq!(building.health, 25);
        assert!(!september_get_building(sim, 1, &mut building));
        assert_eq!(building.depth, 60 * 120 + 60);

        assert!(september_fire(sim, 512.0, 384.0));
        assert_eq!(september_next_audio_cue(sim), AudioCue::MissileLaunch as u8);
        assert_eq!(september_next_audio_cue(sim), 0);
        september_destroy(sim);
    }

    #[test]
    fn test_bad_config_returns_null() {
        let json = CString::new(r#"{"fixed_step": -1.0}"#).unwrap();
        assert!(september_create_with_config(json.as_ptr()).is_null());
        let json = CString::new(r#"{"seed": 9}"#).unwrap();
        let sim = september_create_with_config(json.as_ptr());
        assert!(!sim.is_null());
        september_destroy(sim);
    }

    fn empty_pedestrian() -> SeptemberPedestrian {
        SeptemberPedestrian {
            index: 0,
            screen_x: 0.0,
            screen_y: 0.0,
            tile_x: 0,
            tile_y: 0,
            kind: 0,
            sheet: 0,
            state: 0,
            frame: 0,
            opacity: 0.0,
            depth: 0,
        }
    }

    #[test]
    fn test_pedestrian_reports_sheet_and_depth() {
        let sim = september_create();
        {
            let engine = &mut sim_mut(sim).unwrap().engine;
            engine.population.spawn(
                PedestrianKind::Civilian(CivilianKind::Kid),
                TilePos::new(20, 30),
            );
            let i = engine.population.spawn(
                PedestrianKind::Hostile {
                    former: CivilianKind::Woman,
                },
                TilePos::new(21, 30),
            );
            engine.population.pedestrians_mut()[i].state = MoveState::Converting;
        }

        let mut ped = empty_pedestrian();
        assert!(september_get_pedestrian(sim, 0, &mut ped));
        assert_eq!(ped.kind, 0);
        assert_eq!(ped.sheet, 2);
        assert_eq!(ped.depth, 30 * 120 + 20);

        assert!(september_get_pedestrian(sim, 1, &mut ped));
        assert_eq!(ped.kind, 2);
        assert_eq!(ped.sheet, 1);
        september_destroy(sim);
    }

    #[test]
    fn test_strike_and_scar_read_out() {
        let sim = september_create();
        let mut strike = SeptemberStrike {
            target_x: 0,
            target_y: 0,
            screen_x: 0.0,
            screen_y: 0.0,
            frame: 0,
            exploded: 0,
        };
        assert!(!september_get_strike(sim, &mut strike));
        assert_eq!(september_scar_count(sim), 0);

        assert!(september_fire(sim, 512.0, 384.0));
        assert!(september_get_strike(sim, &mut strike));
        assert_eq!(strike.exploded, 0);
        assert!((strike.screen_x - 512.0).abs() < 1e-3);
        assert!((strike.screen_y - 384.0).abs() < 1e-3);

        // Each call is capped at the max frame time.
        for _ in 0..8 {
            september_advance(sim, 0.25);
        }
        assert_eq!(september_scar_count(sim), 1);
        let mut scar = SeptemberScar {
            screen_x: 0.0,
            screen_y: 0.0,
            opacity: 0.0,
        };
        assert!(september_get_scar(sim, 0, &mut scar));
        assert!((scar.screen_x - 512.0).abs() < 1e-3);
        assert!(scar.opacity > 0.0);
        assert!(!september_get_scar(sim, 1, &mut scar));
        september_destroy(sim);
    }
}
