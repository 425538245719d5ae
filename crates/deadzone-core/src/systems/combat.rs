//! Combat and pickups - overlap-triggered health changes

use hecs::{Entity, World};

use crate::components::{ActorId, Aabb, Body, Health, Item, ItemId, Player, ZombieBrain};
use crate::config::CombatConfig;
use crate::events::{EventQueue, SimEvent};

/// What the combat pass did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatOutcome {
    /// Successful zombie attacks
    pub hits: u32,
    /// Player health reached zero during this pass
    pub player_died: bool,
}

fn player_state(world: &World) -> Option<(Entity, Aabb)> {
    world
        .query::<(&Player, &Body)>()
        .iter()
        .next()
        .map(|(entity, (_, body))| (entity, body.aabb()))
}

/// Let every zombie touching the player attack, if its cooldown allows.
///
/// Zombies on cooldown are skipped silently and re-checked next tick.
/// Attacks stop as soon as the player dies.
pub fn zombie_attack_system(
    world: &mut World,
    now_ms: f64,
    config: &CombatConfig,
    events: &mut EventQueue,
) -> CombatOutcome {
    let mut outcome = CombatOutcome::default();
    let Some((player, player_box)) = player_state(world) else {
        return outcome;
    };

    let mut attackers: Vec<(ActorId, Entity)> = world
        .query::<(&ActorId, &Body, &ZombieBrain)>()
        .iter()
        .filter(|(_, (_, body, brain))| {
            body.aabb().overlaps(&player_box)
                && brain.can_attack(now_ms, config.attack_cooldown_ms)
        })
        .map(|(entity, (id, _, _))| (*id, entity))
        .collect();
    attackers.sort_by_key(|(id, _)| *id);

    for (id, zombie) in attackers {
        let health = {
            let Ok(mut health) = world.get::<&mut Health>(player) else {
                break;
            };
            if health.is_dead() {
                break;
            }
            health.take_damage(config.attack_damage);
            *health
        };

        if let Ok(mut brain) = world.get::<&mut ZombieBrain>(zombie) {
            brain.record_attack(now_ms);
        }
        if let Ok(mut p) = world.get::<&mut Player>(player) {
            p.hurt_until_ms = Some(now_ms + config.hurt_flash_ms);
        }

        outcome.hits += 1;
        log::debug!("Zombie {} hit player, health {}", id.0, health.current);
        events.push(SimEvent::PlayerHealthChanged {
            health: health.current,
        });

        if health.is_dead() {
            outcome.player_died = true;
            break;
        }
    }

    outcome
}

/// Consume every item the player touches.
///
/// Items are despawned as they are taken, so each heals exactly once.
pub fn item_pickup_system(
    world: &mut World,
    config: &CombatConfig,
    events: &mut EventQueue,
) -> Vec<ItemId> {
    let Some((player, player_box)) = player_state(world) else {
        return Vec::new();
    };

    let mut touched: Vec<(ItemId, Entity)> = world
        .query::<(&Item, &Body)>()
        .iter()
        .filter(|(_, (_, body))| body.aabb().overlaps(&player_box))
        .map(|(entity, (item, _))| (item.id, entity))
        .collect();
    touched.sort_by_key(|(id, _)| *id);

    let mut consumed = Vec::with_capacity(touched.len());
    for (item_id, entity) in touched {
        if world.despawn(entity).is_err() {
            continue;
        }
        let health = match world.get::<&mut Health>(player) {
            Ok(mut health) => {
                health.heal(config.item_heal);
                health.current
            }
            Err(_) => continue,
        };

        log::debug!("Item {} consumed, health {}", item_id.0, health);
        events.push(SimEvent::ItemConsumed { item_id });
        events.push(SimEvent::PlayerHealthChanged { health });
        consumed.push(item_id);
    }

    consumed
}
