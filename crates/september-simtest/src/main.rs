//! SeptemberWeb Headless Simulation Harness
//!
//! Validates archetype data, the placement list, and long-run simulation
//! invariants without a renderer or audio backend.
//!
//! Usage:
//!   cargo run -p september-simtest
//!   cargo run -p september-simtest -- --verbose --seconds 600
//!   cargo run -p september-simtest -- --config sim.json --placements town.json

use log::{debug, info};
use september_core::config::SimConfig;
use september_core::engine::SimulationEngine;
use september_core::persistence::{load_placements, placements_from_json, SaveError};
use september_core::prelude::*;
use september_logic::blast::BlastGrid;
use september_logic::buildings::{RegenClass, CATALOG};
use september_logic::constants::buildings::DESTROYED_HEALTH;
use september_logic::iso::IsoProjection;

// ── Default town (same list the editor ships) ───────────────────────────
const TOWN_JSON: &str = include_str!("../../../data/town.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seconds: f64,
    config: Option<String>,
    placements: Option<String>,
}

fn parse_options() -> Options {
    let mut options = Options {
        verbose: false,
        seconds: 300.0,
        config: None,
        placements: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--seconds" => {
                if let Some(s) = args.next().and_then(|v| v.parse().ok()) {
                    options.seconds = s;
                }
            }
            "--config" => options.config = args.next(),
            "--placements" => options.placements = args.next(),
            other => eprintln!("ignoring unknown argument {}", other),
        }
    }
    options
}

fn main() {
    let options = parse_options();
    let level = if options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    println!("=== SeptemberWeb Simulation Harness ===\n");

    let mut results = Vec::new();

    let config = match &options.config {
        Some(path) => match SimConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                println!("  ✗ config_load: {}", e);
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    let placements = match &options.placements {
        Some(path) => std::fs::File::open(path)
            .map_err(SaveError::from)
            .and_then(|f| load_placements(std::io::BufReader::new(f))),
        None => placements_from_json(TOWN_JSON),
    };
    let placements = match placements {
        Ok(p) => p,
        Err(e) => {
            println!("  ✗ placements_load: {}", e);
            std::process::exit(1);
        }
    };

    // 1. Building catalog
    results.extend(validate_catalog(options.verbose));

    // 2. Placement list
    results.extend(validate_placements(&config, &placements, options.verbose));

    // 3. Projection sweep
    results.extend(validate_projection(&config, options.verbose));

    // 4. Blast kernel
    results.extend(validate_blast(&config, options.verbose));

    // 5. Long run with periodic strikes
    results.extend(validate_long_run(&config, &placements, options.seconds, options.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Building Catalog ─────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Building Catalog ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: !CATALOG.is_empty(),
        detail: format!("{} archetypes", CATALOG.len()),
    });

    // Sprite list length matches stages plus regrowth sprites
    let bad_sprites: Vec<_> = CATALOG
        .iter()
        .filter(|a| a.sprites.len() != a.stages + a.regen.regrowth_sprites())
        .map(|a| a.name)
        .collect();
    results.push(TestResult {
        name: "catalog_sprite_counts".into(),
        passed: bad_sprites.is_empty(),
        detail: if bad_sprites.is_empty() {
            "every archetype has a full sprite list".into()
        } else {
            format!("wrong sprite count: {}", bad_sprites.join(", "))
        },
    });

    let bad_stages: Vec<_> = CATALOG
        .iter()
        .filter(|a| !(3..=4).contains(&a.stages))
        .map(|a| a.name)
        .collect();
    results.push(TestResult {
        name: "catalog_stage_counts".into(),
        passed: bad_stages.is_empty(),
        detail: if bad_stages.is_empty() {
            "all archetypes have 3 or 4 damage stages".into()
        } else {
            format!("bad stages: {}", bad_stages.join(", "))
        },
    });

    let bad_health: Vec<_> = CATALOG
        .iter()
        .filter(|a| a.max_health <= 0 || a.width <= 0 || a.height <= 0)
        .map(|a| a.name)
        .collect();
    results.push(TestResult {
        name: "catalog_positive_health_and_size".into(),
        passed: bad_health.is_empty(),
        detail: if bad_health.is_empty() {
            "health and footprint positive".into()
        } else {
            format!("non-positive: {}", bad_health.join(", "))
        },
    });

    // Damage sprites never go backwards as health falls
    let mut regressions = Vec::new();
    for a in CATALOG.iter() {
        let mut last = a.damage_index(a.max_health);
        for health in (1..a.max_health).rev() {
            let index = a.damage_index(health);
            if index < last {
                regressions.push(a.name);
                break;
            }
            last = index;
        }
    }
    results.push(TestResult {
        name: "catalog_damage_monotonic".into(),
        passed: regressions.is_empty(),
        detail: if regressions.is_empty() {
            "damage sprites advance as health falls".into()
        } else {
            format!("regressing: {}", regressions.join(", "))
        },
    });

    let regrowing = CATALOG.iter().filter(|a| a.regen != RegenClass::None).count();
    if verbose {
        println!("  {} of {} archetypes regrow", regrowing, CATALOG.len());
    }

    results
}

// ── 2. Placements ───────────────────────────────────────────────────────

fn validate_placements(
    config: &SimConfig,
    placements: &[Placement],
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Placements ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "placements_not_empty".into(),
        passed: !placements.is_empty(),
        detail: format!("{} placements", placements.len()),
    });

    let unknown = placements
        .iter()
        .filter(|p| september_logic::buildings::archetype(p.archetype).is_none())
        .count();
    results.push(TestResult {
        name: "placements_known_archetypes".into(),
        passed: unknown == 0,
        detail: format!("{} unknown archetypes", unknown),
    });

    let mut engine = SimulationEngine::new(config.clone());
    let placed = engine.place_buildings(placements);
    results.push(TestResult {
        name: "placements_all_fit".into(),
        passed: placed == placements.len(),
        detail: format!("{} of {} placed", placed, placements.len()),
    });

    // Every covered tile points back at a building covering it
    let mut mismatches = 0;
    for (i, b) in engine.buildings.buildings().iter().enumerate() {
        for tile in b.footprint() {
            if tile.in_bounds(engine.map.size())
                && engine.map.tile_building(tile) != Some(BuildingId(i))
            {
                mismatches += 1;
            }
        }
    }
    results.push(TestResult {
        name: "placements_no_overlap".into(),
        passed: mismatches == 0,
        detail: format!("{} footprint tiles owned by another building", mismatches),
    });

    if verbose {
        let tall = engine.buildings.buildings().iter().filter(|b| b.is_tall()).count();
        println!("  {} buildings, {} tall", engine.buildings.len(), tall);
    }

    results
}

// ── 3. Projection ───────────────────────────────────────────────────────

fn validate_projection(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Projection ---");
    let mut results = Vec::new();
    let m = &config.map;
    let projection = IsoProjection::centered(
        m.size,
        m.screen_width,
        m.screen_height,
        m.tile_step_x,
        m.tile_step_y,
    );

    let mut failures = 0;
    let mut checked = 0;
    for y in 0..m.size {
        for x in 0..m.size {
            let tile = TilePos::new(x, y);
            let (sx, sy) = projection.tile_center(tile);
            if projection.tile_at(sx, sy) != tile {
                failures += 1;
            }
            checked += 1;
        }
    }
    results.push(TestResult {
        name: "projection_round_trip".into(),
        passed: failures == 0,
        detail: format!(
            "{} of {} tile centers map back to their tile",
            checked - failures,
            checked
        ),
    });

    let center = TilePos::new(m.size / 2, m.size / 2);
    let (cx, cy) = projection.tile_corner(center);
    let centered =
        (cx - m.screen_width / 2.0).abs() < 1e-6 && (cy - m.screen_height / 2.0).abs() < 1e-6;
    results.push(TestResult {
        name: "projection_centered".into(),
        passed: centered,
        detail: format!("map center projects to ({:.1}, {:.1})", cx, cy),
    });

    if verbose {
        println!(
            "  scroll limit ±{:.0}px",
            projection.scroll_limit(m.size, m.screen_width)
        );
    }

    results
}

// ── 4. Blast Kernel ─────────────────────────────────────────────────────

fn validate_blast(config: &SimConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Blast Kernel ---");
    let mut results = Vec::new();
    let b = &config.buildings;
    let blast = BlastGrid::new(b.blast_radius, b.blast_center_damage, b.blast_ring_decrement);

    let center = blast.damage_from_center(0, 0);
    results.push(TestResult {
        name: "blast_center_damage".into(),
        passed: center == Some(b.blast_center_damage.max(1)),
        detail: format!("center damage {:?}", center),
    });

    let falls_off = blast.offsets().all(|(dx, dy, damage)| {
        let ring = dx.abs().max(dy.abs());
        let inner = if ring == 0 {
            damage
        } else {
            blast.damage_from_center(ring - 1, 0).unwrap_or(damage)
        };
        damage >= 1 && damage <= inner
    });
    results.push(TestResult {
        name: "blast_falls_off".into(),
        passed: falls_off,
        detail: "damage never rises away from the center".into(),
    });

    results.push(TestResult {
        name: "blast_kernel_size".into(),
        passed: blast.offsets().count() as i32 == blast.side() * blast.side(),
        detail: format!("{}x{} kernel", blast.side(), blast.side()),
    });

    results
}

// ── 5. Long Run ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Violations {
    below_floor: u32,
    on_building: u32,
    health_out_of_range: u32,
    bad_sentinel: u32,
}

fn validate_long_run(
    config: &SimConfig,
    placements: &[Placement],
    seconds: f64,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Long Run ({:.0}s) ---", seconds);
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new(config.clone());
    engine.place_buildings(placements);
    engine.populate();

    let steps = (seconds / config.fixed_step).ceil() as u64;
    let strike_every = (8.0 / config.fixed_step).round().max(1.0) as u64;
    let report_every = ((60.0 / config.fixed_step) as u64).max(1);
    let mut violations = Violations::default();
    let mut rejected_launches = 0;

    for step in 0..steps {
        if step % strike_every == 0 {
            // Walk strikes around the town center.
            let size = engine.map.size();
            let k = (step / strike_every) as i32;
            let target = TilePos::new(size / 2 - 8 + (k * 5) % 17, size / 2 - 8 + (k * 7) % 17);
            let (x, y) = engine.map.tile_center_to_screen(target);
            if !engine.launch_strike(x, y, target.x, target.y) {
                rejected_launches += 1;
            }
        }
        let casualties = engine.population.casualties;
        engine.step();
        // Kills land after the floor top-up; the next tick restores it.
        let impact = engine.population.casualties != casualties;
        check_invariants(&engine, impact, &mut violations);

        if verbose && step % report_every == 0 {
            let s = engine.stats();
            debug!(
                "t={:.0}s living={} hostiles={} dead={} destroyed={}",
                s.sim_time, s.living, s.hostiles, s.dead, s.buildings_destroyed
            );
        }
        let _ = engine.drain_audio_cues();
    }

    let stats = engine.stats();
    info!("Long run finished at tick {}", stats.tick);

    results.push(TestResult {
        name: "run_hostile_floor".into(),
        passed: violations.below_floor == 0,
        detail: format!("{} ticks below the hostile floor", violations.below_floor),
    });
    results.push(TestResult {
        name: "run_pedestrians_walkable".into(),
        passed: violations.on_building == 0,
        detail: format!("{} walking pedestrians seen on buildings", violations.on_building),
    });
    results.push(TestResult {
        name: "run_building_health".into(),
        passed: violations.health_out_of_range == 0,
        detail: format!("{} health readings above max", violations.health_out_of_range),
    });
    results.push(TestResult {
        name: "run_destroyed_sentinel".into(),
        passed: violations.bad_sentinel == 0,
        detail: format!(
            "{} non-positive health readings off the sentinel",
            violations.bad_sentinel
        ),
    });
    results.push(TestResult {
        name: "run_strikes_landed".into(),
        passed: stats.strikes_fired > 0 && stats.casualties > 0,
        detail: format!(
            "{} strikes, {} rejected while in flight, {} casualties",
            stats.strikes_fired, rejected_launches, stats.casualties
        ),
    });
    results.push(TestResult {
        name: "run_population_alive".into(),
        passed: stats.living > 0,
        detail: format!(
            "{} living ({} civilians, {} animals, {} hostiles), {} conversions, {} reversions",
            stats.living,
            stats.civilians,
            stats.animals,
            stats.hostiles,
            stats.conversions,
            stats.reversions
        ),
    });

    // Snapshot round trip at the end of the run
    let mut buffer = Vec::new();
    let restored = engine
        .save(&mut buffer)
        .and_then(|_| SimulationEngine::load(buffer.as_slice()));
    let (passed, detail) = match restored {
        Ok(loaded) => (
            loaded.stats() == stats,
            format!("{} byte snapshot", buffer.len()),
        ),
        Err(e) => (false, format!("round trip failed: {}", e)),
    };
    results.push(TestResult {
        name: "run_snapshot_round_trip".into(),
        passed,
        detail,
    });

    if verbose {
        if let Ok(json) = serde_json::to_string_pretty(&stats) {
            println!("{}", json);
        }
    }

    results
}

fn check_invariants(engine: &SimulationEngine, impact: bool, violations: &mut Violations) {
    if !impact
        && engine.population.effective_hostile_count() < engine.config.population.hostile_floor
    {
        violations.below_floor += 1;
    }

    for p in engine.population.pedestrians() {
        let stranded = !engine.map.is_walkable(p.tile) && p.tile != engine.map.center();
        if p.state.is_walking() && stranded {
            violations.on_building += 1;
        }
    }

    for b in engine.buildings.buildings() {
        if b.health > b.info().max_health {
            violations.health_out_of_range += 1;
        }
        if b.health <= 0 && b.health != DESTROYED_HEALTH {
            violations.bad_sentinel += 1;
        }
    }
}
