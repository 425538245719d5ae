//! Player controller - turns movement intents into velocity

use hecs::World;
use serde::{Deserialize, Serialize};

use crate::components::{Body, Player, Vec2};
use crate::config::PlayerConfig;

/// Movement intents for one tick, as read from the input device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntents {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputIntents {
    pub const NONE: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
    };

    pub fn new(left: bool, right: bool, up: bool, down: bool) -> Self {
        Self {
            left,
            right,
            up,
            down,
        }
    }
}

/// Velocity for a set of intents.
///
/// Opposing intents on one axis do not cancel: left wins over right and up
/// over down. Diagonal motion is scaled by `diagonal_factor` on both axes.
pub fn player_velocity(input: InputIntents, speed: f32, diagonal_factor: f32) -> Vec2 {
    let vx = if input.left {
        -speed
    } else if input.right {
        speed
    } else {
        0.0
    };
    let vy = if input.up {
        -speed
    } else if input.down {
        speed
    } else {
        0.0
    };

    if vx != 0.0 && vy != 0.0 {
        Vec2::new(vx * diagonal_factor, vy * diagonal_factor)
    } else {
        Vec2::new(vx, vy)
    }
}

/// Apply this tick's intents to the player body
pub fn player_input_system(world: &mut World, input: InputIntents, config: &PlayerConfig) {
    let velocity = player_velocity(input, config.speed, config.diagonal_factor);
    for (_, (body, _)) in world.query_mut::<(&mut Body, &Player)>() {
        body.velocity = velocity;
    }
}
