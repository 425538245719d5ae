//! Zombie AI - wander/chase state machine.
//!
//! Each tick a zombie compares its distance to the player with the detection
//! range: strictly inside, it chases; otherwise it wanders. The same
//! threshold is used in both directions, so a zombie sitting exactly on the
//! boundary can switch state every tick.
//!
//! Wandering runs in bouts. A bout lasts a random time in
//! `[wander_min_ms, wander_max_ms)`; when it ends a new direction is drawn,
//! and some bouts are spent standing still.

use hecs::World;
use rand::Rng;

use crate::components::{ActorId, Behavior, Body, Vec2, ZombieBrain};
use crate::config::ZombieConfig;

/// State a zombie should be in for a given distance to the player
pub fn behavior_for_distance(distance: f32, detection_range: f32) -> Behavior {
    if distance < detection_range {
        Behavior::Chasing
    } else {
        Behavior::Wandering
    }
}

/// Velocity that heads straight from `from` towards `to`
pub fn chase_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let angle = from.angle_to(&to);
    Vec2::new(angle.cos() * speed, angle.sin() * speed)
}

/// Direction for a fresh zombie: each axis one of -1, 0, 1, then normalized.
///
/// About one spawn in nine starts out standing still.
pub fn initial_wander_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let x = rng.gen_range(-1..=1) as f32;
    let y = rng.gen_range(-1..=1) as f32;
    Vec2::new(x, y).normalize_or_zero()
}

/// Direction for a new wander bout.
///
/// Both axes are uniform in `[-1, 1]` before normalizing; a degenerate draw
/// yields zero. With probability `idle_chance` the bout is spent still.
pub fn draw_wander_direction<R: Rng + ?Sized>(rng: &mut R, idle_chance: f64) -> Vec2 {
    let x = rng.gen_range(-1.0f32..=1.0);
    let y = rng.gen_range(-1.0f32..=1.0);
    let direction = Vec2::new(x, y).normalize_or_zero();

    if rng.gen::<f64>() < idle_chance {
        Vec2::ZERO
    } else {
        direction
    }
}

/// Length of a new wander bout in milliseconds
pub fn draw_wander_threshold<R: Rng + ?Sized>(rng: &mut R, config: &ZombieConfig) -> f64 {
    rng.gen_range(config.wander_min_ms..config.wander_max_ms)
}

/// A freshly spawned zombie brain
pub fn new_brain<R: Rng + ?Sized>(rng: &mut R, config: &ZombieConfig) -> ZombieBrain {
    let direction = initial_wander_direction(rng);
    let threshold = draw_wander_threshold(rng, config);
    ZombieBrain::new(direction, threshold)
}

/// Advance one zombie's state machine and return the velocity it should move with
pub fn think<R: Rng + ?Sized>(
    brain: &mut ZombieBrain,
    position: Vec2,
    player_position: Vec2,
    delta_ms: f64,
    config: &ZombieConfig,
    rng: &mut R,
) -> Vec2 {
    let distance = position.distance(&player_position);
    brain.behavior = behavior_for_distance(distance, config.detection_range);

    match brain.behavior {
        Behavior::Chasing => chase_velocity(position, player_position, config.speed),
        Behavior::Wandering => {
            brain.wander_timer_ms += delta_ms;
            if brain.wander_timer_ms > brain.wander_threshold_ms {
                brain.wander_timer_ms = 0.0;
                brain.wander_threshold_ms = draw_wander_threshold(rng, config);
                brain.wander_direction = draw_wander_direction(rng, config.idle_chance);
            }
            brain.wander_direction * (config.speed * config.wander_speed_factor)
        }
    }
}

/// Re-evaluate every zombie against the player's current position
pub fn zombie_ai_system<R: Rng + ?Sized>(
    world: &mut World,
    player_position: Vec2,
    delta_ms: f64,
    config: &ZombieConfig,
    rng: &mut R,
) {
    let mut zombies: Vec<_> = world
        .query_mut::<(&ActorId, &mut Body, &mut ZombieBrain)>()
        .into_iter()
        .collect();
    // RNG draws happen in actor-id order so seeded runs replay exactly
    zombies.sort_by_key(|(_, (id, _, _))| **id);

    for (_, (id, body, brain)) in zombies {
        let before = brain.behavior;
        body.velocity = think(brain, body.position, player_position, delta_ms, config, rng);
        if brain.behavior != before {
            log::debug!("Zombie {} {:?} -> {:?}", id.0, before, brain.behavior);
        }
    }
}
