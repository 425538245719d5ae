//! Read-only view of the world for renderers and UI.
//!
//! A snapshot is plain data: it owns copies of everything it reports and can
//! be serialized as-is.

use hecs::World;
use serde::{Deserialize, Serialize};

use crate::components::{
    ActorId, ActorKind, Behavior, Body, Facing, Health, Item, ItemId, Player, Vec2, ZombieBrain,
};

/// Colour hint for an actor's sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tint {
    #[default]
    Normal,
    /// Zombie is chasing
    Alert,
    /// Player was hit within the hurt-flash window
    Hurt,
    /// Player is dead
    Dead,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActorView {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub facing: Facing,
    pub tint: Tint,
    /// Zombies only
    pub behavior: Option<Behavior>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub cell: (u32, u32),
    pub position: Vec2,
}

/// Everything a presentation layer needs to draw one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub clock_ms: f64,
    /// Stepping stopped because the player died
    pub halted: bool,
    pub player_health: i32,
    pub player_max_health: i32,
    /// Sorted by actor id; the player comes first
    pub actors: Vec<ActorView>,
    /// Items still in the world, sorted by id
    pub items: Vec<ItemView>,
}

impl WorldSnapshot {
    pub fn actor(&self, id: ActorId) -> Option<&ActorView> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn player(&self) -> Option<&ActorView> {
        self.actors.iter().find(|a| a.kind == ActorKind::Player)
    }

    pub fn zombies(&self) -> impl Iterator<Item = &ActorView> {
        self.actors.iter().filter(|a| a.kind == ActorKind::Zombie)
    }
}

/// Build a snapshot of the current world state
pub fn build_snapshot(world: &World, tick: u64, clock_ms: f64, halted: bool) -> WorldSnapshot {
    let mut player_health = 0;
    let mut player_max_health = 0;

    let mut actors: Vec<ActorView> = Vec::new();
    for (_, (id, kind, body, facing, brain, player, health)) in world
        .query::<(
            &ActorId,
            &ActorKind,
            &Body,
            &Facing,
            Option<&ZombieBrain>,
            Option<&Player>,
            Option<&Health>,
        )>()
        .iter()
    {
        if let Some(health) = health {
            player_health = health.current;
            player_max_health = health.max;
        }

        let tint = match (brain, player) {
            (Some(brain), _) if brain.behavior == Behavior::Chasing => Tint::Alert,
            (_, Some(_)) if halted || health.is_some_and(|h| h.is_dead()) => Tint::Dead,
            (_, Some(p)) if p.hurt_until_ms.is_some_and(|until| clock_ms < until) => Tint::Hurt,
            _ => Tint::Normal,
        };

        actors.push(ActorView {
            id: *id,
            kind: *kind,
            position: body.position,
            velocity: body.velocity,
            half_extents: body.half_extents,
            facing: *facing,
            tint,
            behavior: brain.map(|b| b.behavior),
        });
    }
    actors.sort_by_key(|a| a.id);

    let mut items: Vec<ItemView> = world
        .query::<(&Item, &Body)>()
        .iter()
        .map(|(_, (item, body))| ItemView {
            id: item.id,
            cell: item.cell,
            position: body.position,
        })
        .collect();
    items.sort_by_key(|i| i.id);

    WorldSnapshot {
        tick,
        clock_ms,
        halted,
        player_health,
        player_max_health,
        actors,
        items,
    }
}
