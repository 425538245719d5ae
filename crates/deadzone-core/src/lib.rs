//! Deadzone Core - Top-down Zombie Survival Simulation
//!
//! A deterministic simulation of one player and a handful of zombies on a
//! tile map: the player walks around rooms picking up health items while
//! zombies wander and give chase.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: The player, zombies, items
//! - **Components**: Pure data attached to entities (Body, Health, ZombieBrain, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! Time is injected: every [`engine::SimulationEngine::tick`] receives the
//! frame delta, and nothing reads the wall clock. Two engines with the same
//! seed and inputs produce identical snapshots.
//!
//! # Example
//!
//! ```rust,no_run
//! use deadzone_core::prelude::*;
//!
//! let mut engine = SimulationEngine::with_defaults().unwrap();
//!
//! loop {
//!     let input = InputIntents::new(false, true, false, false);
//!     engine.tick(input, 1000.0 / 60.0); // 60 FPS
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//!     if engine.is_halted() {
//!         engine.restart();
//!     }
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod snapshot;
pub mod systems;
pub mod tilemap;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{ConfigError, SimConfig};
    pub use crate::engine::{SimulationEngine, TickStatus};
    pub use crate::events::SimEvent;
    pub use crate::snapshot::{ActorView, ItemView, Tint, WorldSnapshot};
    pub use crate::systems::InputIntents;
    pub use crate::tilemap::{CellKind, TileGrid};
}
