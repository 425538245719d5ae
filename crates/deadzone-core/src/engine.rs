//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::{validate_config, ConfigError, SimConfig};
use crate::events::{EventQueue, SimEvent};
use crate::snapshot::{build_snapshot, WorldSnapshot};
use crate::systems::*;
use crate::tilemap::TileGrid;

/// What a call to [`SimulationEngine::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// The world advanced one step
    Advanced,
    /// The player is dead; nothing moves until [`SimulationEngine::restart`]
    Halted,
    /// The delta was negative or not finite and the tick was dropped
    Ignored,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing the player, zombies and items
    pub world: World,
    grid: TileGrid,
    config: SimConfig,
    rng: StdRng,
    events: EventQueue,
    player: Entity,
    /// Injected clock: sum of all accepted tick deltas
    clock_ms: f64,
    tick_count: u64,
    halted: bool,
}

impl SimulationEngine {
    /// Start a world on `grid` with `config`.
    ///
    /// Refuses to start if the configuration does not validate against the grid.
    pub fn new(config: SimConfig, grid: TileGrid) -> Result<Self, ConfigError> {
        let mut errors = validate_config(&config, &grid);
        if !errors.is_empty() {
            for e in &errors {
                log::warn!("Rejecting configuration: {}", e);
            }
            return Err(errors.remove(0));
        }

        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let player = populate(&mut world, &grid, &config, &mut rng);

        log::info!(
            "World started: {}x{} grid, {} zombies, {} items, seed {}",
            grid.width(),
            grid.height(),
            config.zombie_spawns.len(),
            grid.item_spawns().len(),
            config.seed
        );

        Ok(Self {
            world,
            grid,
            config,
            rng,
            events: EventQueue::new(),
            player,
            clock_ms: 0.0,
            tick_count: 0,
            halted: false,
        })
    }

    /// Built-in map with the default configuration
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(SimConfig::default(), TileGrid::default_layout())
    }

    /// Advance the simulation by `delta_ms` milliseconds.
    ///
    /// Order: player input, integration, wall and zombie collisions, zombie
    /// AI, attacks, pickups, death check. Integration and collisions run in
    /// as many sub-steps as a long frame needs to keep bodies out of walls.
    pub fn tick(&mut self, input: InputIntents, delta_ms: f64) -> TickStatus {
        if self.halted {
            return TickStatus::Halted;
        }
        if !(delta_ms >= 0.0 && delta_ms.is_finite()) {
            log::warn!("Ignoring tick with invalid delta {}", delta_ms);
            return TickStatus::Ignored;
        }

        self.clock_ms += delta_ms;
        self.tick_count += 1;
        let dt_secs = (delta_ms / 1000.0) as f32;

        player_input_system(&mut self.world, input, &self.config.player);

        let steps = substep_count(&self.world, dt_secs);
        let step_secs = dt_secs / steps as f32;
        for _ in 0..steps {
            integrate_system(&mut self.world, step_secs);
            static_collision_system(&mut self.world, &self.grid);
            zombie_separation_system(&mut self.world);
            // Separation may shove a zombie into a wall; walls win
            static_collision_system(&mut self.world, &self.grid);
        }

        let player_position = self.player_position();
        zombie_ai_system(
            &mut self.world,
            player_position,
            delta_ms,
            &self.config.zombie,
            &mut self.rng,
        );
        facing_system(&mut self.world);

        let outcome = zombie_attack_system(
            &mut self.world,
            self.clock_ms,
            &self.config.combat,
            &mut self.events,
        );

        if outcome.player_died {
            self.halted = true;
            self.events.push(SimEvent::PlayerDied);
            log::warn!(
                "Player died at {:.0} ms after tick {}",
                self.clock_ms,
                self.tick_count
            );
            return TickStatus::Advanced;
        }

        item_pickup_system(&mut self.world, &self.config.combat, &mut self.events);
        TickStatus::Advanced
    }

    /// Reset the world: full health, zombies back at their spawns, all items restored.
    pub fn restart(&mut self) {
        self.world.clear();
        self.player = populate(&mut self.world, &self.grid, &self.config, &mut self.rng);

        let max = self.config.player.max_health;
        if let Ok(mut health) = self.world.get::<&mut Health>(self.player) {
            *health = Health::full(max);
        }

        self.events.clear();
        self.events.push(SimEvent::PlayerHealthChanged { health: max });
        self.halted = false;
        log::info!("World restarted at {:.0} ms", self.clock_ms);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &[SimEvent] {
        self.events.pending()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        build_snapshot(&self.world, self.tick_count, self.clock_ms, self.halted)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn player_health(&self) -> Health {
        self.world
            .get::<&Health>(self.player)
            .map(|h| *h)
            .unwrap_or(Health::new(0, self.config.player.max_health))
    }

    pub fn player_position(&self) -> Vec2 {
        self.world
            .get::<&Body>(self.player)
            .map(|b| b.position)
            .unwrap_or(Vec2::ZERO)
    }

    /// Entity for an actor id
    pub fn find_actor(&self, id: ActorId) -> Option<Entity> {
        self.world
            .query::<&ActorId>()
            .iter()
            .find(|(_, actor)| **actor == id)
            .map(|(entity, _)| entity)
    }

    /// Ids of all zombies, ascending
    pub fn zombie_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self
            .world
            .query::<(&ActorId, &ZombieBrain)>()
            .iter()
            .map(|(_, (id, _))| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn zombie_behavior(&self, id: ActorId) -> Option<Behavior> {
        let entity = self.find_actor(id)?;
        self.world.get::<&ZombieBrain>(entity).ok().map(|b| b.behavior)
    }

    pub fn item_count(&self) -> usize {
        self.world.query::<&Item>().iter().count()
    }

    /// Move the player to a world position and stop it
    pub fn place_player(&mut self, position: Vec2) {
        if let Ok(mut body) = self.world.get::<&mut Body>(self.player) {
            body.position = position;
            body.velocity = Vec2::ZERO;
        }
    }

    /// Move an actor to a world position and stop it. Returns false for an unknown id.
    pub fn place_actor(&mut self, id: ActorId, position: Vec2) -> bool {
        let Some(entity) = self.find_actor(id) else {
            return false;
        };
        match self.world.get::<&mut Body>(entity) {
            Ok(mut body) => {
                body.position = position;
                body.velocity = Vec2::ZERO;
                true
            }
            Err(_) => false,
        }
    }
}

/// Spawn the player, zombies and items; returns the player entity
fn populate(world: &mut World, grid: &TileGrid, config: &SimConfig, rng: &mut StdRng) -> Entity {
    let (px, py) = config.player_spawn;
    let player_half = Vec2::new(config.player.half_extent, config.player.half_extent);
    let player = world.spawn((
        Player::default(),
        ActorId(0),
        ActorKind::Player,
        Body::new(grid.grid_to_world(px, py), player_half),
        Health::new(config.player.starting_health, config.player.max_health),
        Facing::default(),
    ));

    let zombie_half = Vec2::new(config.zombie.half_extent, config.zombie.half_extent);
    for (i, &(zx, zy)) in config.zombie_spawns.iter().enumerate() {
        world.spawn((
            ActorId(i as u32 + 1),
            ActorKind::Zombie,
            Body::new(grid.grid_to_world(zx, zy), zombie_half),
            new_brain(rng, &config.zombie),
            Facing::default(),
        ));
    }

    let item_half = Vec2::new(config.combat.item_half_extent, config.combat.item_half_extent);
    for (i, (cx, cy)) in grid.item_spawns().into_iter().enumerate() {
        let mut body = Body::new(grid.cell_center(cx as i32, cy as i32), item_half);
        body.clamp_to_bounds = false;
        world.spawn((
            Item {
                id: ItemId(i as u32),
                cell: (cx, cy),
            },
            body,
        ));
    }

    player
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::with_defaults().unwrap();
        assert_eq!(engine.player_health().current, 9919);
        assert_eq!(engine.player_health().max, 99_999);
        assert_eq!(engine.zombie_ids().len(), 5);
        assert_eq!(engine.item_count(), 5);
        assert_eq!(engine.player_position(), Vec2::new(160.0, 160.0));
        assert!(!engine.is_halted());
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let mut config = SimConfig::default();
        config.player.max_health = -1;
        assert!(SimulationEngine::new(config, TileGrid::default_layout()).is_err());
    }

    #[test]
    fn test_clock_advances_by_delta() {
        let mut engine = SimulationEngine::with_defaults().unwrap();
        for _ in 0..10 {
            assert_eq!(engine.tick(InputIntents::NONE, 16.0), TickStatus::Advanced);
        }
        assert!((engine.clock_ms() - 160.0).abs() < 1e-9);
        assert_eq!(engine.tick_count(), 10);
    }

    #[test]
    fn test_invalid_delta_ignored() {
        let mut engine = SimulationEngine::with_defaults().unwrap();
        assert_eq!(engine.tick(InputIntents::NONE, -5.0), TickStatus::Ignored);
        assert_eq!(engine.tick(InputIntents::NONE, f64::NAN), TickStatus::Ignored);
        assert_eq!(engine.clock_ms(), 0.0);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn test_player_moves_right() {
        let mut engine = SimulationEngine::with_defaults().unwrap();
        engine.tick(InputIntents::new(false, true, false, false), 100.0);
        let pos = engine.player_position();
        assert!((pos.x - 175.0).abs() < 1e-3);
        assert_eq!(pos.y, 160.0);
    }

    #[test]
    fn test_find_actor_and_place() {
        let mut engine = SimulationEngine::with_defaults().unwrap();
        assert_eq!(engine.find_actor(ActorId(0)), Some(engine.player_entity()));
        assert!(engine.place_actor(ActorId(3), Vec2::new(400.0, 370.0)));
        assert!(!engine.place_actor(ActorId(99), Vec2::ZERO));
    }
}
