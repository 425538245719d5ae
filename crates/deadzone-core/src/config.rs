//! Simulation configuration and startup validation.
//!
//! Every tunable the rules use lives here with the game's shipped values as
//! defaults. A configuration can be loaded from JSON; missing fields keep
//! their defaults:
//!
//! ```
//! use deadzone_core::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{ "seed": 7, "player": { "starting_health": 50 } }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.player.starting_health, 50);
//! assert_eq!(config.player.speed, 150.0);
//! ```
//!
//! The engine refuses to start while [`validate_config`] reports problems.

use serde::{Deserialize, Serialize};

use crate::tilemap::TileGrid;

/// Player movement and health settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Axis speed in world units per second
    pub speed: f32,
    /// Scale applied to both axes when moving diagonally (~1/sqrt(2))
    pub diagonal_factor: f32,
    pub max_health: i32,
    /// Health at world start
    pub starting_health: i32,
    /// Half-size of the hitbox
    pub half_extent: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 150.0,
            diagonal_factor: 0.707,
            max_health: 99_999,
            starting_health: 9_919,
            half_extent: 12.0,
        }
    }
}

/// Zombie steering and wander settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZombieConfig {
    /// Chase speed in world units per second
    pub speed: f32,
    /// Player closer than this (strictly) is chased
    pub detection_range: f32,
    /// Wander speed as a fraction of chase speed
    pub wander_speed_factor: f32,
    /// Wander bout length is drawn from `[wander_min_ms, wander_max_ms)`
    pub wander_min_ms: f64,
    pub wander_max_ms: f64,
    /// Chance that a new wander bout is spent standing still
    pub idle_chance: f64,
    pub half_extent: f32,
}

impl Default for ZombieConfig {
    fn default() -> Self {
        Self {
            speed: 40.0,
            detection_range: 200.0,
            wander_speed_factor: 0.3,
            wander_min_ms: 2000.0,
            wander_max_ms: 4000.0,
            idle_chance: 0.3,
            half_extent: 12.0,
        }
    }
}

/// Damage, cooldown and pickup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub attack_damage: i32,
    pub attack_cooldown_ms: f64,
    pub item_heal: i32,
    /// Half-size of an item's pickup box
    pub item_half_extent: f32,
    /// How long the player shows the hurt tint after a hit
    pub hurt_flash_ms: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_damage: 10,
            attack_cooldown_ms: 1000.0,
            item_heal: 20,
            item_half_extent: 16.0,
            hurt_flash_ms: 100.0,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the wander RNG; equal seeds replay equal runs
    pub seed: u64,
    /// Player spawn in grid coordinates
    pub player_spawn: (i32, i32),
    /// Zombie spawns in grid coordinates
    pub zombie_spawns: Vec<(i32, i32)>,
    pub player: PlayerConfig,
    pub zombie: ZombieConfig,
    pub combat: CombatConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            player_spawn: (5, 5),
            zombie_spawns: vec![(15, 8), (20, 15), (8, 18), (25, 5), (12, 22)],
            player: PlayerConfig::default(),
            zombie: ZombieConfig::default(),
            combat: CombatConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Check a configuration against the grid it will run on.
///
/// Returns every problem found; an empty list means the engine may start.
pub fn validate_config(config: &SimConfig, grid: &TileGrid) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let p = &config.player;
    if p.max_health <= 0 {
        errors.push(invalid("player.max_health", "must be positive"));
    }
    if p.starting_health <= 0 || p.starting_health > p.max_health {
        errors.push(invalid(
            "player.starting_health",
            format!("must be in 1..={}, got {}", p.max_health, p.starting_health),
        ));
    }
    if !positive(p.speed) {
        errors.push(invalid("player.speed", "must be positive"));
    }
    if !(p.diagonal_factor > 0.0 && p.diagonal_factor <= 1.0) {
        errors.push(invalid("player.diagonal_factor", "must be in (0, 1]"));
    }
    // Actors must fit through a one-cell doorway
    let max_actor_half = grid.cell_size() * 0.5;
    check_half_extent(&mut errors, "player.half_extent", p.half_extent, max_actor_half);

    let z = &config.zombie;
    if !positive(z.speed) {
        errors.push(invalid("zombie.speed", "must be positive"));
    }
    if !positive(z.detection_range) {
        errors.push(invalid("zombie.detection_range", "must be positive"));
    }
    if !(z.wander_speed_factor >= 0.0 && z.wander_speed_factor.is_finite()) {
        errors.push(invalid("zombie.wander_speed_factor", "must be non-negative"));
    }
    if !(z.wander_min_ms > 0.0 && z.wander_min_ms < z.wander_max_ms && z.wander_max_ms.is_finite())
    {
        errors.push(invalid(
            "zombie.wander_min_ms",
            format!(
                "need 0 < min < max, got {}..{}",
                z.wander_min_ms, z.wander_max_ms
            ),
        ));
    }
    if !(0.0..=1.0).contains(&z.idle_chance) {
        errors.push(invalid("zombie.idle_chance", "must be in [0, 1]"));
    }
    check_half_extent(&mut errors, "zombie.half_extent", z.half_extent, max_actor_half);

    let c = &config.combat;
    if c.attack_damage < 0 {
        errors.push(invalid("combat.attack_damage", "must not be negative"));
    }
    if c.item_heal < 0 {
        errors.push(invalid("combat.item_heal", "must not be negative"));
    }
    if !(c.attack_cooldown_ms >= 0.0 && c.attack_cooldown_ms.is_finite()) {
        errors.push(invalid("combat.attack_cooldown_ms", "must not be negative"));
    }
    if !(c.hurt_flash_ms >= 0.0 && c.hurt_flash_ms.is_finite()) {
        errors.push(invalid("combat.hurt_flash_ms", "must not be negative"));
    }
    if !positive(c.item_half_extent) || c.item_half_extent > grid.cell_size() {
        errors.push(invalid(
            "combat.item_half_extent",
            format!("must be in (0, {}]", grid.cell_size()),
        ));
    }

    let (px, py) = config.player_spawn;
    if !grid.contains_cell(px, py) {
        errors.push(ConfigError::SpawnOutsideGrid {
            what: "player",
            x: px,
            y: py,
        });
    }
    for &(zx, zy) in &config.zombie_spawns {
        if !grid.contains_cell(zx, zy) {
            errors.push(ConfigError::SpawnOutsideGrid {
                what: "zombie",
                x: zx,
                y: zy,
            });
        }
    }

    errors
}

fn check_half_extent(errors: &mut Vec<ConfigError>, field: &'static str, value: f32, limit: f32) {
    if !positive(value) || value >= limit {
        errors.push(invalid(
            field,
            format!("must be in (0, {}), got {}", limit, value),
        ));
    }
}

fn positive(v: f32) -> bool {
    v > 0.0 && v.is_finite()
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

/// Errors that stop a world from starting
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    /// Grid dimensions or cell size are unusable
    InvalidGrid(String),
    UnknownCellCode { x: u32, y: u32, code: u8 },
    InvalidValue { field: &'static str, reason: String },
    SpawnOutsideGrid { what: &'static str, x: i32, y: i32 },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::InvalidGrid(msg) => write!(f, "Invalid grid: {}", msg),
            ConfigError::UnknownCellCode { x, y, code } => {
                write!(f, "Unknown cell code {} at ({}, {})", code, x, y)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            ConfigError::SpawnOutsideGrid { what, x, y } => {
                write!(f, "{} spawn ({}, {}) is outside the grid", what, x, y)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}
