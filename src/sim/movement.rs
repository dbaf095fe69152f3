//! Movement resolution
//!
//! Turns per-actor intent into the maximal legal displacement against the
//! collision grid. Each axis resolves independently: the candidate coordinate
//! is walked back one pixel at a time until the footprint is free, which
//! gives slide-along-the-wall behavior instead of a binary move/no-move.

use glam::Vec2;

use crate::settings::Settings;
use crate::sim::actor::Actor;
use crate::sim::grid::CollisionGrid;
use crate::sim::rect::Rect;

/// Advance one actor by one tick of movement.
///
/// Frozen actors skip movement entirely. An unset (non-positive) speed is
/// defaulted to the configured base speed before displacement.
pub fn resolve_movement(actor: &mut Actor, grid: &CollisionGrid, settings: &Settings) {
    if actor.frozen {
        return;
    }
    if actor.speed <= 0.0 {
        actor.speed = settings.player_speed;
    }

    let intent = actor.effective_intent();
    let mut desired = actor.pos;
    if intent.up {
        desired.y = (actor.pos.y - actor.speed).max(0.0);
    }
    if intent.down {
        desired.y = (actor.pos.y + actor.speed).min(settings.screen_height - actor.height);
    }
    if intent.left {
        desired.x = (actor.pos.x - actor.speed).max(0.0);
    }
    if intent.right {
        desired.x = (actor.pos.x + actor.speed).min(settings.screen_width - actor.width);
    }

    // X first, then Y against the already-resolved X, so the final footprint
    // is collision-free even when sliding into a corner.
    let (w, h) = (actor.width, actor.height);
    let y0 = actor.pos.y;
    actor.pos.x = resolve_axis(grid, actor.pos.x, desired.x, |x| Rect::new(x, y0, w, h));
    let x1 = actor.pos.x;
    actor.pos.y = resolve_axis(grid, actor.pos.y, desired.y, |y| Rect::new(x1, y, w, h));
}

/// Largest coordinate along one axis, between `from` (assumed legal) and
/// `to`, whose footprint does not collide. Probes integer pixel offsets back
/// from the candidate toward `from`.
fn resolve_axis(
    grid: &CollisionGrid,
    from: f32,
    to: f32,
    rect_at: impl Fn(f32) -> Rect,
) -> f32 {
    if !grid.check_collision(&rect_at(to)) {
        return to;
    }
    let dir = (to - from).signum();
    let span = (to - from).abs().ceil() as i32;
    for step in 1..span {
        let probe = to - dir * step as f32;
        if !grid.check_collision(&rect_at(probe)) {
            return probe;
        }
    }
    from
}

/// Recover an actor whose rectangle is already embedded in a wall (after a
/// size change). Searches the 8 compass directions at increasing radius,
/// bounded by half a block; the first free offset wins. Returns whether a
/// free position was found; on failure the actor is left in place.
pub fn push_out_of_wall(actor: &mut Actor, grid: &CollisionGrid) -> bool {
    if !grid.check_collision(&actor.rect()) {
        return true;
    }
    const DIRS: [(f32, f32); 8] = [
        (0.0, -1.0),
        (0.0, 1.0),
        (-1.0, 0.0),
        (1.0, 0.0),
        (-1.0, -1.0),
        (1.0, -1.0),
        (-1.0, 1.0),
        (1.0, 1.0),
    ];
    let max_radius = (grid.block_size() / 2.0).ceil() as i32;
    for radius in 1..=max_radius {
        for (dx, dy) in DIRS {
            let candidate = actor.pos + Vec2::new(dx, dy) * radius as f32;
            if !grid.check_collision(&actor.rect_at(candidate)) {
                actor.pos = candidate;
                return true;
            }
        }
    }
    log::warn!(
        "player {:?} embedded in wall with no free position within {max_radius}px; leaving in place",
        actor.id
    );
    false
}
