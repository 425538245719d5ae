//! Actor components: bodies, the player, zombie brains and pickups.

use serde::{Deserialize, Serialize};

use super::common::{Aabb, Vec2};

/// Stable identifier for an actor; a spawn point keeps its id across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Stable identifier for a pickup, assigned in row-major order of spawn cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Zombie,
}

/// Physics body - an axis-aligned box that moves with a per-second velocity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    /// Centre of the box in world units
    pub position: Vec2,
    /// Velocity in world units per second
    pub velocity: Vec2,
    pub half_extents: Vec2,
    /// Keep the box inside the world rectangle
    pub clamp_to_bounds: bool,
}

impl Body {
    pub fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            half_extents,
            clamp_to_bounds: true,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents)
    }

    /// Advance the position by `velocity * dt_secs`
    pub fn integrate(&mut self, dt_secs: f32) {
        self.position += self.velocity * dt_secs;
    }

    /// Keep the box inside `rect`, stopping motion on each axis that touched it
    pub fn clamp_to_bounds(&mut self, rect: &Aabb) {
        if !self.clamp_to_bounds {
            return;
        }
        let (x, hit_x) = clamp_axis(
            self.position.x,
            self.half_extents.x,
            rect.min.x,
            rect.max.x,
        );
        let (y, hit_y) = clamp_axis(
            self.position.y,
            self.half_extents.y,
            rect.min.y,
            rect.max.y,
        );
        self.position = Vec2::new(x, y);
        if hit_x {
            self.velocity.x = 0.0;
        }
        if hit_y {
            self.velocity.y = 0.0;
        }
    }
}

fn clamp_axis(center: f32, half: f32, lo: f32, hi: f32) -> (f32, bool) {
    let min_c = lo + half;
    let max_c = hi - half;
    if max_c < min_c {
        // Box wider than the world: centre it
        return ((lo + hi) * 0.5, true);
    }
    if center < min_c {
        (min_c, true)
    } else if center > max_c {
        (max_c, true)
    } else {
        (center, false)
    }
}

/// Marker and per-player presentation state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player {
    /// Clock time until which the player shows the hurt flash
    pub hurt_until_ms: Option<f64>,
}

/// Player health - always within `0..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(current: i32, max: i32) -> Self {
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

/// Zombie behavior states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Behavior {
    #[default]
    Wandering,
    Chasing,
}

/// Per-zombie AI state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZombieBrain {
    pub behavior: Behavior,
    /// Unit vector, or zero while standing still for a bout
    pub wander_direction: Vec2,
    /// Time spent in the current wander bout
    pub wander_timer_ms: f64,
    /// Length of the current wander bout
    pub wander_threshold_ms: f64,
    /// Clock time of the last successful attack
    pub last_attack_ms: Option<f64>,
}

impl ZombieBrain {
    pub fn new(wander_direction: Vec2, wander_threshold_ms: f64) -> Self {
        Self {
            behavior: Behavior::Wandering,
            wander_direction,
            wander_timer_ms: 0.0,
            wander_threshold_ms,
            last_attack_ms: None,
        }
    }

    pub fn can_attack(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        match self.last_attack_ms {
            Some(last) => now_ms - last >= cooldown_ms,
            None => true,
        }
    }

    pub fn record_attack(&mut self, now_ms: f64) {
        self.last_attack_ms = Some(now_ms);
    }
}

/// A pickup sitting on a grid cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub cell: (u32, u32),
}

/// Direction an actor last moved in, for sprite selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
    Up,
    #[default]
    Down,
}

impl Facing {
    /// Facing for a velocity, by dominant axis; `None` while at rest
    pub fn from_velocity(velocity: Vec2) -> Option<Self> {
        if velocity.is_zero() {
            return None;
        }
        if velocity.x.abs() >= velocity.y.abs() {
            Some(if velocity.x < 0.0 { Facing::Left } else { Facing::Right })
        } else {
            Some(if velocity.y < 0.0 { Facing::Up } else { Facing::Down })
        }
    }
}
