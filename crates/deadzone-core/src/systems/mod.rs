//! Systems - logic that operates on components

mod combat;
mod physics;
mod player;
mod zombie_ai;

pub use combat::*;
pub use physics::*;
pub use player::*;
pub use zombie_ai::*;
