//! Integration tests for the full tick loop.
//!
//! Exercises: input → movement → collision → zombie AI → combat/pickup → death → restart
//!
//! All tests drive `SimulationEngine` with an injected clock; nothing here
//! sleeps or reads wall time.

use deadzone_core::prelude::*;
use deadzone_core::systems::{max_wall_penetration, COLLISION_EPSILON};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Helpers ────────────────────────────────────────────────────────────

/// One zombie spawned in the open strip across rows 11-12
fn single_zombie_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.zombie_spawns = vec![(20, 12)];
    // Every new wander bout is spent standing still
    config.zombie.idle_chance = 1.0;
    config
}

/// Engine whose zombies never wander on their own
fn quiet_engine(config: SimConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(config, TileGrid::default_layout()).unwrap();
    for (_, brain) in engine.world.query_mut::<&mut ZombieBrain>() {
        brain.wander_direction = Vec2::ZERO;
    }
    engine
}

fn health_events(events: &[SimEvent]) -> Vec<i32> {
    events
        .iter()
        .filter_map(|e| match e {
            SimEvent::PlayerHealthChanged { health } => Some(*health),
            _ => None,
        })
        .collect()
}

const ZOMBIE: ActorId = ActorId(1);
const IDLE: InputIntents = InputIntents::NONE;

/// Player and zombie standing on top of each other in the open strip
fn pin_in_contact(engine: &mut SimulationEngine) {
    engine.place_player(Vec2::new(400.0, 368.0));
    engine.place_actor(ZOMBIE, Vec2::new(410.0, 368.0));
}

// ── Movement ───────────────────────────────────────────────────────────

#[test]
fn diagonal_movement_is_normalized() {
    let mut engine = quiet_engine(single_zombie_config());
    engine.place_player(Vec2::new(400.0, 368.0));

    engine.tick(InputIntents::new(false, true, true, false), 100.0);

    let snap = engine.snapshot();
    let player = snap.player().unwrap();
    assert!((player.velocity.x - 106.05).abs() < 1e-2);
    assert!((player.velocity.y + 106.05).abs() < 1e-2);
    assert!((player.position.x - 410.605).abs() < 1e-2);
    assert!((player.position.y - 357.395).abs() < 1e-2);
}

#[test]
fn opposing_keys_prefer_left_and_up() {
    let mut engine = quiet_engine(single_zombie_config());
    engine.place_player(Vec2::new(600.0, 368.0));

    engine.tick(InputIntents::new(true, true, false, false), 100.0);
    let v = engine.snapshot().player().unwrap().velocity;
    assert_eq!(v, Vec2::new(-150.0, 0.0));

    engine.tick(InputIntents::new(false, false, true, true), 100.0);
    let v = engine.snapshot().player().unwrap().velocity;
    assert_eq!(v, Vec2::new(0.0, -150.0));
}

#[test]
fn walls_are_never_penetrated() {
    let mut engine = SimulationEngine::with_defaults().unwrap();
    let inputs = [
        InputIntents::new(false, true, false, false),
        InputIntents::new(false, false, false, true),
        InputIntents::new(true, false, true, false),
        InputIntents::new(false, true, false, true),
    ];

    for (phase, input) in inputs.iter().enumerate() {
        for step in 0..120 {
            engine.tick(*input, 16.0);
            for (_, (_, body)) in engine.world.query::<(&ActorKind, &Body)>().iter() {
                let depth = max_wall_penetration(body, engine.grid());
                assert!(
                    depth <= COLLISION_EPSILON,
                    "phase {} step {}: body at {:?} is {} deep in a wall",
                    phase,
                    step,
                    body.position,
                    depth
                );
            }
        }
    }
}

#[test]
fn player_stops_at_room_wall() {
    let mut engine = quiet_engine(single_zombie_config());
    for _ in 0..200 {
        engine.tick(InputIntents::new(false, true, false, false), 16.0);
    }
    // Room wall starts at x = 9 * 32
    let pos = engine.player_position();
    assert!((pos.x - (288.0 - 12.0)).abs() < 1e-2, "player at {:?}", pos);
}

fn assert_clear_of_walls(engine: &SimulationEngine, context: &str) {
    for (_, (_, body)) in engine.world.query::<(&ActorKind, &Body)>().iter() {
        let depth = max_wall_penetration(body, engine.grid());
        assert!(
            depth <= COLLISION_EPSILON,
            "{}: body at {:?} is {} deep in a wall",
            context,
            body.position,
            depth
        );
    }
}

#[test]
fn long_frame_into_wall_row_does_not_embed() {
    let mut engine = quiet_engine(single_zombie_config());
    // Touching the top wall of the first room
    engine.place_player(Vec2::new(172.0, 140.0));

    engine.tick(InputIntents::new(false, false, true, false), 170.0);
    let player = *engine.snapshot().player().unwrap();
    assert!((player.position.x - 172.0).abs() < 1e-3, "player at {:?}", player.position);
    assert!((player.position.y - 140.0).abs() < 1e-3, "player at {:?}", player.position);
    assert_eq!(player.velocity.y, 0.0);
    assert_clear_of_walls(&engine, "after 170 ms frame");

    for _ in 0..5 {
        engine.tick(IDLE, 16.0);
    }
    assert!((engine.player_position().y - 140.0).abs() < 1e-3);
    assert_clear_of_walls(&engine, "after idle ticks");
}

#[test]
fn long_frames_stop_at_room_walls_and_corners() {
    // First room interior is x 128..288, y 128..256; the column at x = 176
    // has wall below it, not the doorway
    let cases: [(InputIntents, Option<f32>, Option<f32>); 6] = [
        (InputIntents::new(false, false, true, false), None, Some(140.0)),
        (InputIntents::new(false, false, false, true), None, Some(244.0)),
        (InputIntents::new(true, false, false, false), Some(140.0), None),
        (InputIntents::new(false, true, false, false), Some(276.0), None),
        (InputIntents::new(true, false, true, false), Some(140.0), Some(140.0)),
        (InputIntents::new(false, true, true, false), Some(276.0), Some(140.0)),
    ];

    for delta in [150.0, 250.0, 500.0, 800.0] {
        for (input, stop_x, stop_y) in cases {
            let mut engine = quiet_engine(single_zombie_config());
            engine.place_player(Vec2::new(176.0, 208.0));

            let ticks = (1200.0 / delta as f32).ceil() as usize + 1;
            for _ in 0..ticks {
                engine.tick(input, delta);
                assert_clear_of_walls(&engine, &format!("{:?} at {} ms", input, delta));
            }

            let player = *engine.snapshot().player().unwrap();
            if let Some(x) = stop_x {
                assert!((player.position.x - x).abs() < 1e-2, "{:?} at {} ms: {:?}", input, delta, player.position);
                assert_eq!(player.velocity.x, 0.0, "{:?} at {} ms", input, delta);
            }
            if let Some(y) = stop_y {
                assert!((player.position.y - y).abs() < 1e-2, "{:?} at {} ms: {:?}", input, delta, player.position);
                assert_eq!(player.velocity.y, 0.0, "{:?} at {} ms", input, delta);
            }
        }
    }
}

#[test]
fn crowd_with_frame_hitches_stays_out_of_walls() {
    let mut engine = SimulationEngine::with_defaults().unwrap();
    let mut rng = StdRng::seed_from_u64(31);

    for step in 0..1500 {
        let input = InputIntents::new(rng.gen(), rng.gen(), rng.gen(), rng.gen());
        let delta = if step % 10 == 0 {
            rng.gen_range(150.0..250.0)
        } else {
            rng.gen_range(0.0..40.0)
        };
        engine.tick(input, delta);
        assert_clear_of_walls(&engine, &format!("step {} ({} ms)", step, delta));
        if engine.is_halted() {
            engine.restart();
        }
    }
}

#[test]
fn actors_stay_inside_world() {
    let mut engine = SimulationEngine::with_defaults().unwrap();
    let bounds = engine.grid().world_bounds();
    let mut rng = StdRng::seed_from_u64(8);

    for _ in 0..1500 {
        let input = InputIntents::new(rng.gen(), rng.gen(), rng.gen(), rng.gen());
        engine.tick(input, rng.gen_range(0.0..40.0));
        if engine.is_halted() {
            engine.restart();
        }
        for actor in engine.snapshot().actors {
            assert!(actor.position.x - actor.half_extents.x >= bounds.min.x - COLLISION_EPSILON);
            assert!(actor.position.y - actor.half_extents.y >= bounds.min.y - COLLISION_EPSILON);
            assert!(actor.position.x + actor.half_extents.x <= bounds.max.x + COLLISION_EPSILON);
            assert!(actor.position.y + actor.half_extents.y <= bounds.max.y + COLLISION_EPSILON);
        }
    }
}

// ── Zombie AI ──────────────────────────────────────────────────────────

#[test]
fn zombie_detects_player_strictly_inside_range() {
    let mut engine = quiet_engine(single_zombie_config());

    engine.place_player(Vec2::new(100.0, 368.0));
    engine.place_actor(ZOMBIE, Vec2::new(299.0, 368.0));
    engine.tick(IDLE, 16.0);
    assert_eq!(engine.zombie_behavior(ZOMBIE), Some(Behavior::Chasing));

    engine.place_actor(ZOMBIE, Vec2::new(301.0, 368.0));
    engine.tick(IDLE, 16.0);
    assert_eq!(engine.zombie_behavior(ZOMBIE), Some(Behavior::Wandering));
}

#[test]
fn chasing_zombie_closes_distance() {
    let mut engine = quiet_engine(single_zombie_config());
    engine.place_player(Vec2::new(100.0, 368.0));
    engine.place_actor(ZOMBIE, Vec2::new(250.0, 368.0));

    engine.tick(IDLE, 16.0);
    let before = engine.snapshot().actor(ZOMBIE).unwrap().position;
    engine.tick(IDLE, 500.0);
    let snapshot_after = engine.snapshot();
    let after = snapshot_after.actor(ZOMBIE).unwrap();

    assert_eq!(after.tint, Tint::Alert);
    assert!((before.x - after.position.x - 20.0).abs() < 1e-2);
}

// ── Combat ─────────────────────────────────────────────────────────────

#[test]
fn attack_cooldown_uses_engine_clock() {
    let mut engine = quiet_engine(single_zombie_config());

    pin_in_contact(&mut engine);
    engine.tick(IDLE, 16.0);
    assert_eq!(engine.player_health().current, 9909);

    // 500 ms after the hit: still cooling down
    pin_in_contact(&mut engine);
    engine.tick(IDLE, 500.0);
    assert_eq!(engine.player_health().current, 9909);

    // 1001 ms after the hit
    pin_in_contact(&mut engine);
    engine.tick(IDLE, 501.0);
    assert_eq!(engine.player_health().current, 9899);

    assert_eq!(health_events(&engine.drain_events()), vec![9909, 9899]);
}

#[test]
fn hit_flashes_player_then_clears() {
    let mut engine = quiet_engine(single_zombie_config());

    pin_in_contact(&mut engine);
    engine.tick(IDLE, 16.0);
    assert_eq!(engine.snapshot().player().unwrap().tint, Tint::Hurt);

    engine.place_actor(ZOMBIE, Vec2::new(800.0, 700.0));
    engine.tick(IDLE, 150.0);
    assert_eq!(engine.snapshot().player().unwrap().tint, Tint::Normal);
}

#[test]
fn ten_attacks_then_one_pickup() {
    let mut engine = quiet_engine(single_zombie_config());
    assert_eq!(engine.player_health().current, 9919);

    for _ in 0..10 {
        pin_in_contact(&mut engine);
        engine.tick(IDLE, 1000.0);
    }
    assert_eq!(engine.player_health().current, 9819);

    // Item 0 sits in the centre of cell (6, 5)
    engine.place_actor(ZOMBIE, Vec2::new(800.0, 700.0));
    engine.place_player(Vec2::new(208.0, 176.0));
    engine.drain_events();
    engine.tick(IDLE, 16.0);

    assert_eq!(engine.player_health().current, 9839);
    assert_eq!(
        engine.drain_events(),
        vec![
            SimEvent::ItemConsumed { item_id: ItemId(0) },
            SimEvent::PlayerHealthChanged { health: 9839 },
        ]
    );
}

#[test]
fn item_heals_exactly_once() {
    let mut engine = quiet_engine(single_zombie_config());
    engine.place_player(Vec2::new(208.0, 176.0));

    for _ in 0..30 {
        engine.tick(IDLE, 16.0);
    }

    assert_eq!(engine.player_health().current, 9939);
    assert_eq!(engine.item_count(), 4);
    let consumed = engine
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SimEvent::ItemConsumed { .. }))
        .count();
    assert_eq!(consumed, 1);
}

#[test]
fn heal_is_capped_at_max() {
    let mut config = single_zombie_config();
    config.player.max_health = 100;
    config.player.starting_health = 95;
    let mut engine = quiet_engine(config);
    engine.place_player(Vec2::new(208.0, 176.0));

    engine.tick(IDLE, 16.0);

    assert_eq!(engine.player_health().current, 100);
    assert_eq!(health_events(&engine.drain_events()), vec![100]);
}

// ── Death and restart ──────────────────────────────────────────────────

fn fragile_config() -> SimConfig {
    let mut config = single_zombie_config();
    config.player.max_health = 100;
    config.player.starting_health = 25;
    config
}

#[test]
fn death_emits_once_and_halts() {
    let mut engine = quiet_engine(fragile_config());

    for _ in 0..3 {
        pin_in_contact(&mut engine);
        assert_eq!(engine.tick(IDLE, 1000.0), TickStatus::Advanced);
    }
    assert!(engine.is_halted());
    assert_eq!(engine.player_health().current, 0);

    let clock = engine.clock_ms();
    for _ in 0..5 {
        pin_in_contact(&mut engine);
        assert_eq!(engine.tick(IDLE, 1000.0), TickStatus::Halted);
    }
    assert_eq!(engine.clock_ms(), clock);
    assert_eq!(engine.player_health().current, 0);

    let events = engine.drain_events();
    assert_eq!(health_events(&events), vec![15, 5, 0]);
    assert_eq!(events.iter().filter(|e| **e == SimEvent::PlayerDied).count(), 1);
    assert_eq!(events.last(), Some(&SimEvent::PlayerDied));

    let snap = engine.snapshot();
    assert!(snap.halted);
    assert_eq!(snap.player().unwrap().tint, Tint::Dead);
}

#[test]
fn restart_restores_world() {
    let mut engine = quiet_engine(fragile_config());

    engine.place_player(Vec2::new(208.0, 176.0));
    engine.tick(IDLE, 16.0);
    assert_eq!(engine.item_count(), 4);

    // 45 health after the pickup: five hits
    for _ in 0..5 {
        pin_in_contact(&mut engine);
        engine.tick(IDLE, 1000.0);
    }
    assert!(engine.is_halted());

    engine.restart();

    assert!(!engine.is_halted());
    assert_eq!(engine.player_health(), Health::new(100, 100));
    assert_eq!(engine.item_count(), 5);
    assert_eq!(engine.zombie_ids(), vec![ZOMBIE]);
    assert_eq!(engine.zombie_behavior(ZOMBIE), Some(Behavior::Wandering));
    assert_eq!(
        engine.snapshot().actor(ZOMBIE).unwrap().position,
        engine.grid().grid_to_world(20, 12)
    );
    assert_eq!(engine.player_position(), engine.grid().grid_to_world(5, 5));
    assert_eq!(
        engine.drain_events(),
        vec![SimEvent::PlayerHealthChanged { health: 100 }]
    );

    assert_eq!(engine.tick(IDLE, 16.0), TickStatus::Advanced);
}

#[test]
fn health_stays_in_bounds() {
    let mut config = SimConfig::default();
    config.player.max_health = 120;
    config.player.starting_health = 60;
    let mut engine = SimulationEngine::new(config, TileGrid::default_layout()).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..3000 {
        let input = InputIntents::new(rng.gen(), rng.gen(), rng.gen(), rng.gen());
        engine.tick(input, rng.gen_range(0.0..50.0));
        let health = engine.player_health();
        assert!(health.current >= 0 && health.current <= health.max);
        for event in engine.drain_events() {
            if let SimEvent::PlayerHealthChanged { health } = event {
                assert!((0..=120).contains(&health));
            }
        }
        if engine.is_halted() {
            engine.restart();
        }
    }
}

// ── Determinism ────────────────────────────────────────────────────────

fn scripted_run(seed: u64) -> Vec<String> {
    let mut config = SimConfig::default();
    config.seed = seed;
    let mut engine = SimulationEngine::new(config, TileGrid::default_layout()).unwrap();
    let mut inputs = StdRng::seed_from_u64(77);

    let mut frames = Vec::new();
    for i in 0..600 {
        let input = InputIntents::new(inputs.gen(), inputs.gen(), inputs.gen(), inputs.gen());
        engine.tick(input, 16.0);
        if i % 50 == 0 {
            frames.push(serde_json::to_string(&engine.snapshot()).unwrap());
        }
    }
    frames
}

#[test]
fn same_seed_same_snapshots() {
    assert_eq!(scripted_run(99), scripted_run(99));
}

// ── Configuration ──────────────────────────────────────────────────────

#[test]
fn partial_json_config_keeps_defaults() {
    let config = SimConfig::from_json(r#"{ "seed": 7, "player": { "starting_health": 50 } }"#).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.player.starting_health, 50);
    assert_eq!(config.player.max_health, 99_999);
    assert_eq!(config.zombie_spawns.len(), 5);

    let engine = SimulationEngine::new(config, TileGrid::default_layout()).unwrap();
    assert_eq!(engine.player_health().current, 50);
}

#[test]
fn spawn_outside_grid_is_rejected() {
    let mut config = SimConfig::default();
    config.zombie_spawns.push((40, 3));
    match SimulationEngine::new(config, TileGrid::default_layout()) {
        Err(ConfigError::SpawnOutsideGrid { what, x, y }) => {
            assert_eq!((what, x, y), ("zombie", 40, 3));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("engine started with a spawn outside the grid"),
    }
}

#[test]
fn oversized_actor_is_rejected() {
    let mut config = SimConfig::default();
    config.player.half_extent = 1e7;
    match SimulationEngine::new(config, TileGrid::default_layout()) {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "player.half_extent"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("engine started with an actor larger than a doorway"),
    }
}
