//! Deadzone Headless Simulation Harness
//!
//! Drives the engine through scripted scenarios and checks the rules hold.
//! Runs entirely in-process, no window and no renderer.
//!
//! Usage:
//!   cargo run -p deadzone-simtest
//!   cargo run -p deadzone-simtest -- --verbose
//!   cargo run -p deadzone-simtest -- --config my_config.json
//!
//! Logging goes through `RUST_LOG` (default `info`).

use deadzone_core::prelude::*;
use deadzone_core::systems::{max_wall_penetration, COLLISION_EPSILON};
use deadzone_core::tilemap::LayoutFile;

// ── Layout data (same JSON a level editor would write) ──────────────────
const LAYOUT_JSON: &str = include_str!("../../../data/default_layout.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

struct Args {
    verbose: bool,
    config_path: Option<String>,
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        verbose: false,
        config_path: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => parsed.verbose = true,
            "--config" => parsed.config_path = args.next(),
            other => log::warn!("Ignoring unknown argument {}", other),
        }
    }
    parsed
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let verbose = args.verbose;
    println!("=== Deadzone Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Layout data
    results.extend(validate_layout(verbose));

    // 2. Configuration (file or defaults)
    let (config, config_results) = load_config(args.config_path.as_deref(), verbose);
    results.extend(config_results);

    // 3. Movement and collision
    results.extend(validate_movement(verbose));

    // 4. Zombie AI
    results.extend(validate_zombie_ai(verbose));

    // 5. Combat and pickups
    results.extend(validate_combat(verbose));

    // 6. Death and restart
    results.extend(validate_death_and_restart(verbose));

    // 7. Long run with the loaded configuration
    if let Some(config) = config {
        results.extend(soak(config, verbose));
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
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

// ── Scenario helpers ────────────────────────────────────────────────────

const IDLE: InputIntents = InputIntents::NONE;
const ZOMBIE: ActorId = ActorId(1);

/// One zombie that stands still unless it sees the player
fn lone_zombie_engine(config: Option<SimConfig>) -> Option<SimulationEngine> {
    let mut config = config.unwrap_or_default();
    config.zombie_spawns = vec![(20, 12)];
    config.zombie.idle_chance = 1.0;
    let mut engine = SimulationEngine::new(config, TileGrid::default_layout()).ok()?;
    for (_, brain) in engine.world.query_mut::<&mut ZombieBrain>() {
        brain.wander_direction = Vec2::ZERO;
    }
    Some(engine)
}

fn pin_in_contact(engine: &mut SimulationEngine) {
    engine.place_player(Vec2::new(400.0, 368.0));
    engine.place_actor(ZOMBIE, Vec2::new(410.0, 368.0));
}

fn engine_failed(name: &str) -> Vec<TestResult> {
    vec![TestResult::new(name, false, "engine refused to start")]
}

// ── 1. Layout ───────────────────────────────────────────────────────────

fn validate_layout(verbose: bool) -> Vec<TestResult> {
    println!("--- Layout ---");
    let mut results = Vec::new();

    let grid = match LayoutFile::from_json(LAYOUT_JSON).and_then(LayoutFile::into_grid) {
        Ok(g) => g,
        Err(e) => {
            results.push(TestResult::new("layout_parse", false, format!("{}", e)));
            return results;
        }
    };

    results.push(TestResult::new(
        "layout_dimensions",
        grid.width() == 30 && grid.height() == 25 && grid.cell_size() == 32.0,
        format!(
            "{}x{} cells of {}",
            grid.width(),
            grid.height(),
            grid.cell_size()
        ),
    ));

    let builtin = TileGrid::default_layout();
    let mut mismatches = 0;
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            if grid.cell_at(x, y) != builtin.cell_at(x, y) {
                mismatches += 1;
            }
        }
    }
    results.push(TestResult::new(
        "layout_matches_builtin",
        mismatches == 0,
        format!("{} cells differ from the built-in map", mismatches),
    ));

    let w = grid.width() as i32;
    let h = grid.height() as i32;
    let open_border = (0..w)
        .flat_map(|x| [(x, 0), (x, h - 1)])
        .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]))
        .filter(|&(x, y)| grid.cell_at(x, y) != CellKind::Wall)
        .count();
    results.push(TestResult::new(
        "layout_walled_border",
        open_border == 0,
        format!("{} border cells are not walls", open_border),
    ));

    let spawns = grid.item_spawns();
    results.push(TestResult::new(
        "layout_item_spawns",
        spawns.len() == 5,
        format!("item spawns at {:?}", spawns),
    ));

    // Play a round on the loaded map rather than the built-in one
    match SimulationEngine::new(SimConfig::default(), grid) {
        Ok(mut engine) => {
            let mut worst: f32 = 0.0;
            for i in 0..1200u32 {
                let input = InputIntents::new(
                    i % 200 < 60,
                    i % 200 >= 100,
                    i % 160 < 50,
                    i % 160 >= 90,
                );
                let delta = if i % 40 == 0 { 200.0 } else { 16.0 };
                engine.tick(input, delta);
                for (_, (_, body)) in engine.world.query::<(&ActorKind, &Body)>().iter() {
                    worst = worst.max(max_wall_penetration(body, engine.grid()));
                }
            }
            results.push(TestResult::new(
                "layout_playable",
                worst <= COLLISION_EPSILON,
                format!(
                    "{} ticks on the loaded map, deepest wall penetration {:.5}",
                    engine.tick_count(),
                    worst
                ),
            ));
        }
        Err(e) => results.push(TestResult::new("layout_playable", false, e.to_string())),
    }

    if verbose {
        println!("  layout loaded: {} item spawns", spawns.len());
    }
    results
}

// ── 2. Configuration ────────────────────────────────────────────────────

fn load_config(path: Option<&str>, verbose: bool) -> (Option<SimConfig>, Vec<TestResult>) {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let config = match path {
        None => SimConfig::default(),
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| SimConfig::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(c) => {
                    log::info!("Loaded configuration from {}", path);
                    c
                }
                Err(e) => {
                    results.push(TestResult::new("config_load", false, format!("{}: {}", path, e)));
                    return (None, results);
                }
            }
        }
    };

    let errors = deadzone_core::config::validate_config(&config, &TileGrid::default_layout());
    results.push(TestResult::new(
        "config_valid",
        errors.is_empty(),
        if errors.is_empty() {
            "configuration accepted".to_string()
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    ));

    let round_trip = config
        .to_json()
        .and_then(|json| SimConfig::from_json(&json))
        .map(|c| c.seed == config.seed && c.zombie_spawns == config.zombie_spawns);
    results.push(TestResult::new(
        "config_json_round_trip",
        matches!(round_trip, Ok(true)),
        "configuration survives JSON",
    ));

    if verbose {
        println!(
            "  seed {}, {} zombies, player {}/{}",
            config.seed,
            config.zombie_spawns.len(),
            config.player.starting_health,
            config.player.max_health
        );
    }

    if errors.is_empty() {
        (Some(config), results)
    } else {
        (None, results)
    }
}

// ── 3. Movement ─────────────────────────────────────────────────────────

fn validate_movement(verbose: bool) -> Vec<TestResult> {
    println!("--- Movement ---");
    let mut results = Vec::new();

    let Some(mut engine) = lone_zombie_engine(None) else {
        return engine_failed("movement_setup");
    };

    engine.place_player(Vec2::new(400.0, 368.0));
    engine.tick(InputIntents::new(false, true, true, false), 100.0);
    let speed = engine
        .snapshot()
        .player()
        .map(|p| p.velocity.length())
        .unwrap_or(0.0);
    results.push(TestResult::new(
        "diagonal_speed",
        (speed - 150.0).abs() < 0.1,
        format!("diagonal speed {:.2} (axis speed 150)", speed),
    ));

    // Drive into each room wall in turn, with smooth frames and with hitches
    engine.place_player(engine.grid().grid_to_world(5, 5));
    let pushes = [
        InputIntents::new(false, true, false, false),
        InputIntents::new(false, false, false, true),
        InputIntents::new(true, false, false, false),
        InputIntents::new(false, false, true, false),
        InputIntents::new(true, false, true, false),
    ];
    let mut worst: f32 = 0.0;
    let mut into_wall: f32 = 0.0;
    for delta in [16.0, 170.0, 400.0] {
        for input in pushes {
            let ticks = (2400.0 / delta) as u32;
            for _ in 0..ticks {
                engine.tick(input, delta);
                for (_, (_, body)) in engine.world.query::<(&ActorKind, &Body)>().iter() {
                    worst = worst.max(max_wall_penetration(body, engine.grid()));
                }
            }
            // Pressed against the wall by now: no velocity left along the push
            if let Some(player) = engine.snapshot().player() {
                into_wall = into_wall.max(player.velocity.length());
            }
        }
    }
    results.push(TestResult::new(
        "walls_hold",
        worst <= COLLISION_EPSILON,
        format!("deepest wall penetration {:.5}", worst),
    ));
    results.push(TestResult::new(
        "walls_stop_motion",
        into_wall == 0.0,
        format!("fastest player speed while pressed on a wall {:.3}", into_wall),
    ));

    if verbose {
        println!("  player ended at {:?}", engine.player_position());
    }
    results
}

// ── 4. Zombie AI ────────────────────────────────────────────────────────

fn validate_zombie_ai(verbose: bool) -> Vec<TestResult> {
    println!("--- Zombie AI ---");
    let mut results = Vec::new();

    let Some(mut engine) = lone_zombie_engine(None) else {
        return engine_failed("zombie_ai_setup");
    };

    // Detection sweep along the open strip
    let mut wrong = Vec::new();
    for offset in [150.0, 199.0, 199.9, 200.1, 201.0, 260.0] {
        engine.place_player(Vec2::new(100.0, 368.0));
        engine.place_actor(ZOMBIE, Vec2::new(100.0 + offset, 368.0));
        engine.tick(IDLE, 16.0);
        let expected = if offset < 200.0 {
            Behavior::Chasing
        } else {
            Behavior::Wandering
        };
        let got = engine.zombie_behavior(ZOMBIE);
        if got != Some(expected) {
            wrong.push(format!("{} -> {:?}", offset, got));
        }
    }
    results.push(TestResult::new(
        "detection_range",
        wrong.is_empty(),
        if wrong.is_empty() {
            "chase strictly inside 200".to_string()
        } else {
            wrong.join(", ")
        },
    ));

    // Same seed, same world
    let run = |seed: u64| -> Option<String> {
        let config = SimConfig {
            seed,
            ..SimConfig::default()
        };
        let mut engine = SimulationEngine::new(config, TileGrid::default_layout()).ok()?;
        for i in 0..900u32 {
            let input = InputIntents::new(i % 7 < 2, i % 5 == 0, i % 11 < 3, i % 3 == 0);
            engine.tick(input, 16.0);
        }
        serde_json::to_string(&engine.snapshot()).ok()
    };
    let first = run(1234);
    let second = run(1234);
    results.push(TestResult::new(
        "seeded_replay",
        first.is_some() && first == second,
        "two runs with seed 1234 produce identical snapshots",
    ));

    if verbose {
        println!("  detection sweep checked {} distances", 6);
    }
    results
}

// ── 5. Combat ───────────────────────────────────────────────────────────

fn validate_combat(verbose: bool) -> Vec<TestResult> {
    println!("--- Combat ---");
    let mut results = Vec::new();

    let Some(mut engine) = lone_zombie_engine(None) else {
        return engine_failed("combat_setup");
    };

    pin_in_contact(&mut engine);
    engine.tick(IDLE, 16.0);
    let after_first = engine.player_health().current;
    pin_in_contact(&mut engine);
    engine.tick(IDLE, 500.0);
    let during_cooldown = engine.player_health().current;
    pin_in_contact(&mut engine);
    engine.tick(IDLE, 501.0);
    let after_cooldown = engine.player_health().current;
    results.push(TestResult::new(
        "attack_cooldown",
        (after_first, during_cooldown, after_cooldown) == (9909, 9909, 9899),
        format!(
            "health {} -> {} -> {}",
            after_first, during_cooldown, after_cooldown
        ),
    ));

    let Some(mut engine) = lone_zombie_engine(None) else {
        return engine_failed("combat_setup");
    };
    for _ in 0..10 {
        pin_in_contact(&mut engine);
        engine.tick(IDLE, 1000.0);
    }
    let after_attacks = engine.player_health().current;
    engine.place_actor(ZOMBIE, Vec2::new(800.0, 700.0));
    engine.place_player(engine.grid().cell_center(6, 5));
    for _ in 0..10 {
        engine.tick(IDLE, 16.0);
    }
    let after_pickup = engine.player_health().current;
    let consumed = engine
        .drain_events()
        .iter()
        .filter(|e| matches!(e, SimEvent::ItemConsumed { .. }))
        .count();
    results.push(TestResult::new(
        "attacks_then_pickup",
        after_attacks == 9819 && after_pickup == 9839 && consumed == 1,
        format!(
            "9919 -> {} after 10 hits -> {} after pickup ({} item events)",
            after_attacks, after_pickup, consumed
        ),
    ));
    results.push(TestResult::new(
        "item_removed",
        engine.item_count() == 4,
        format!("{} items left", engine.item_count()),
    ));

    if verbose {
        println!("  final health {}", after_pickup);
    }
    results
}

// ── 6. Death and restart ────────────────────────────────────────────────

fn validate_death_and_restart(verbose: bool) -> Vec<TestResult> {
    println!("--- Death & Restart ---");
    let mut results = Vec::new();

    let mut config = SimConfig::default();
    config.player.max_health = 100;
    config.player.starting_health = 30;
    let Some(mut engine) = lone_zombie_engine(Some(config)) else {
        return engine_failed("death_setup");
    };

    let mut ticks = 0;
    while !engine.is_halted() && ticks < 20 {
        pin_in_contact(&mut engine);
        engine.tick(IDLE, 1000.0);
        ticks += 1;
    }
    let halted_status = engine.tick(IDLE, 1000.0);
    let events = engine.drain_events();
    let deaths = events.iter().filter(|e| **e == SimEvent::PlayerDied).count();
    results.push(TestResult::new(
        "death_halts",
        engine.is_halted() && halted_status == TickStatus::Halted && deaths == 1,
        format!("died after {} hits, {} death events", ticks, deaths),
    ));

    engine.restart();
    let health = engine.player_health();
    let restarted = !engine.is_halted()
        && health.current == health.max
        && engine.item_count() == 5
        && engine.zombie_behavior(ZOMBIE) == Some(Behavior::Wandering);
    results.push(TestResult::new(
        "restart_resets",
        restarted,
        format!(
            "health {}/{}, {} items, halted {}",
            health.current,
            health.max,
            engine.item_count(),
            engine.is_halted()
        ),
    ));

    if verbose {
        println!("  restart emitted {:?}", engine.pending_events());
    }
    results
}

// ── 7. Soak ─────────────────────────────────────────────────────────────

fn soak(config: SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Soak ---");
    let mut results = Vec::new();

    let max = config.player.max_health;
    let mut engine = match SimulationEngine::new(config, TileGrid::default_layout()) {
        Ok(e) => e,
        Err(e) => {
            results.push(TestResult::new("soak_setup", false, e.to_string()));
            return results;
        }
    };

    let mut out_of_range = 0;
    let mut deaths = 0;
    let mut pickups = 0;
    let mut worst: f32 = 0.0;
    for i in 0..20_000u32 {
        let input = InputIntents::new(
            (i / 90) % 4 == 0,
            (i / 70) % 3 == 0,
            (i / 110) % 4 == 1,
            (i / 50) % 3 == 1,
        );
        let delta = if i % 50 == 0 { 250.0 } else { 16.0 + (i % 5) as f64 };
        engine.tick(input, delta);

        let health = engine.player_health().current;
        if !(0..=max).contains(&health) {
            out_of_range += 1;
        }
        for event in engine.drain_events() {
            match event {
                SimEvent::PlayerDied => deaths += 1,
                SimEvent::ItemConsumed { .. } => pickups += 1,
                SimEvent::PlayerHealthChanged { .. } => {}
            }
        }
        if i % 100 == 0 {
            for (_, (_, body)) in engine.world.query::<(&ActorKind, &Body)>().iter() {
                worst = worst.max(max_wall_penetration(body, engine.grid()));
            }
        }
        if engine.is_halted() {
            engine.restart();
        }
    }

    results.push(TestResult::new(
        "soak_health_bounds",
        out_of_range == 0,
        format!("{} ticks outside 0..={}", out_of_range, max),
    ));
    results.push(TestResult::new(
        "soak_walls_hold",
        worst <= COLLISION_EPSILON,
        format!("deepest wall penetration {:.5}", worst),
    ));

    log::info!(
        "Soak finished: {:.1}s simulated, {} deaths, {} pickups",
        engine.clock_ms() / 1000.0,
        deaths,
        pickups
    );
    if verbose {
        println!("  {} deaths, {} pickups", deaths, pickups);
    }
    results
}
