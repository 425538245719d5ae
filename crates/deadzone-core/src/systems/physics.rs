//! Physics - integration, world bounds, and push-out collision resolution.
//!
//! Resolution is discrete: bodies move one sub-step, then any overlap with a
//! blocking cell (or another zombie) is removed along the axis of least
//! penetration and the velocity on that axis is zeroed. There is no mass or
//! restitution; bodies simply stop on contact.
//!
//! A sub-step never moves a body more than half its smallest half-extent, so
//! the penetration along the direction of travel stays shallower than the
//! overlap across it and push-out always backs the body out of the wall.

use hecs::{Entity, World};

use crate::components::{ActorId, ActorKind, Aabb, Body, Facing, Vec2, ZombieBrain};
use crate::tilemap::TileGrid;

/// Overlap at or below this depth counts as touching
pub const COLLISION_EPSILON: f32 = 1e-3;

/// Upper bound on push-out passes per body per tick
const MAX_RESOLVE_PASSES: usize = 8;

/// Upper bound on collision sub-steps per tick
pub const MAX_SUBSTEPS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Move every actor by its velocity
pub fn integrate_system(world: &mut World, dt_secs: f32) {
    for (_, (body, _)) in world.query_mut::<(&mut Body, &ActorKind)>() {
        body.integrate(dt_secs);
    }
}

/// Number of sub-steps needed so no actor travels more than half its
/// smallest half-extent in one step. At least 1, at most [`MAX_SUBSTEPS`].
pub fn substep_count(world: &World, dt_secs: f32) -> u32 {
    let mut steps: f32 = 1.0;
    for (_, (body, _)) in world.query::<(&Body, &ActorKind)>().iter() {
        let limit = body.half_extents.x.min(body.half_extents.y) * 0.5;
        if limit <= 0.0 {
            continue;
        }
        let travel = body.velocity.x.abs().max(body.velocity.y.abs()) * dt_secs;
        steps = steps.max((travel / limit).ceil());
    }
    if !steps.is_finite() || steps > MAX_SUBSTEPS as f32 {
        log::debug!("Capping collision sub-steps at {}", MAX_SUBSTEPS);
        return MAX_SUBSTEPS;
    }
    steps as u32
}

/// Clamp actors to the world rectangle and push them out of blocking cells
pub fn static_collision_system(world: &mut World, grid: &TileGrid) {
    let bounds = grid.world_bounds();
    for (_, (body, _)) in world.query_mut::<(&mut Body, &ActorKind)>() {
        body.clamp_to_bounds(&bounds);
        resolve_against_grid(body, grid);
    }
}

/// Push a body out of every blocking cell it overlaps.
///
/// The deepest overlap (by area) is resolved first, so a body sliding along a
/// wall is pushed off the wall face rather than snagging on a seam between
/// two wall cells. Returns true if the body was moved.
pub fn resolve_against_grid(body: &mut Body, grid: &TileGrid) -> bool {
    let mut moved = false;

    for _ in 0..MAX_RESOLVE_PASSES {
        let aabb = body.aabb();
        let (min_x, min_y, max_x, max_y) = grid.cells_overlapping(&aabb);

        let mut deepest: Option<(Aabb, Vec2)> = None;
        let mut deepest_area = 0.0;
        for ty in min_y..=max_y {
            for tx in min_x..=max_x {
                if !grid.is_blocking_at(tx, ty) {
                    continue;
                }
                let cell = grid.cell_rect(tx, ty);
                let Some(pen) = aabb.penetration(&cell) else {
                    continue;
                };
                if pen.x.min(pen.y) <= COLLISION_EPSILON {
                    continue;
                }
                let area = pen.x * pen.y;
                if area > deepest_area {
                    deepest_area = area;
                    deepest = Some((cell, pen));
                }
            }
        }

        let Some((cell, pen)) = deepest else {
            break;
        };
        push_out(body, grid, &cell, pen);
        moved = true;
    }

    moved
}

/// Push out of `obstacle` along the shallower axis, unless that lands the
/// body in another blocking cell while the other axis would not.
fn push_out(body: &mut Body, grid: &TileGrid, obstacle: &Aabb, pen: Vec2) {
    let preferred = min_axis(pen);
    let other = match preferred {
        Axis::X => Axis::Y,
        Axis::Y => Axis::X,
    };

    let first = pushed(body, obstacle, pen, preferred);
    let axis = if max_wall_penetration(&first, grid) > COLLISION_EPSILON
        && max_wall_penetration(&pushed(body, obstacle, pen, other), grid) <= COLLISION_EPSILON
    {
        other
    } else {
        preferred
    };

    *body = pushed(body, obstacle, pen, axis);
    match axis {
        Axis::X => body.velocity.x = 0.0,
        Axis::Y => body.velocity.y = 0.0,
    }
}

fn pushed(body: &Body, obstacle: &Aabb, pen: Vec2, axis: Axis) -> Body {
    let center = obstacle.center();
    let mut out = *body;
    match axis {
        Axis::X => {
            if body.position.x < center.x {
                out.position.x -= pen.x;
            } else {
                out.position.x += pen.x;
            }
        }
        Axis::Y => {
            if body.position.y < center.y {
                out.position.y -= pen.y;
            } else {
                out.position.y += pen.y;
            }
        }
    }
    out
}

fn min_axis(pen: Vec2) -> Axis {
    if pen.x <= pen.y {
        Axis::X
    } else {
        Axis::Y
    }
}

/// Separate overlapping zombies.
///
/// Each overlapping pair is pushed apart along its axis of least penetration,
/// half the depth each, and both stop on that axis. Pairs are processed in
/// actor-id order so the result does not depend on storage order.
pub fn zombie_separation_system(world: &mut World) {
    let mut zombies: Vec<(ActorId, Entity, Body)> = world
        .query::<(&ActorId, &Body, &ZombieBrain)>()
        .iter()
        .map(|(entity, (id, body, _))| (*id, entity, *body))
        .collect();

    if zombies.len() < 2 {
        return;
    }
    zombies.sort_by_key(|(id, _, _)| *id);

    for i in 0..zombies.len() {
        for j in (i + 1)..zombies.len() {
            let (head, tail) = zombies.split_at_mut(j);
            let a = &mut head[i].2;
            let b = &mut tail[0].2;
            separate_pair(a, b);
        }
    }

    for (_, entity, body) in zombies {
        if let Ok(mut b) = world.get::<&mut Body>(entity) {
            *b = body;
        }
    }
}

/// Push two bodies apart by half the penetration each. Returns true if they overlapped.
pub fn separate_pair(a: &mut Body, b: &mut Body) -> bool {
    let Some(pen) = a.aabb().penetration(&b.aabb()) else {
        return false;
    };
    match min_axis(pen) {
        Axis::X => {
            let half = pen.x * 0.5;
            if a.position.x <= b.position.x {
                a.position.x -= half;
                b.position.x += half;
            } else {
                a.position.x += half;
                b.position.x -= half;
            }
            a.velocity.x = 0.0;
            b.velocity.x = 0.0;
        }
        Axis::Y => {
            let half = pen.y * 0.5;
            if a.position.y <= b.position.y {
                a.position.y -= half;
                b.position.y += half;
            } else {
                a.position.y += half;
                b.position.y -= half;
            }
            a.velocity.y = 0.0;
            b.velocity.y = 0.0;
        }
    }
    true
}

/// Remember the last direction each actor moved in
pub fn facing_system(world: &mut World) {
    for (_, (body, facing)) in world.query_mut::<(&Body, &mut Facing)>() {
        if let Some(f) = Facing::from_velocity(body.velocity) {
            *facing = f;
        }
    }
}

/// Deepest penetration of a body into any blocking cell (0 when clear)
pub fn max_wall_penetration(body: &Body, grid: &TileGrid) -> f32 {
    let aabb = body.aabb();
    let (min_x, min_y, max_x, max_y) = grid.cells_overlapping(&aabb);
    let mut deepest: f32 = 0.0;
    for ty in min_y..=max_y {
        for tx in min_x..=max_x {
            if !grid.is_blocking_at(tx, ty) {
                continue;
            }
            if let Some(pen) = aabb.penetration(&grid.cell_rect(tx, ty)) {
                deepest = deepest.max(pen.x.min(pen.y));
            }
        }
    }
    deepest
}
