//! World events
//!
//! Global timed modifiers independent of pickup interaction. At most one is
//! active at any time; the next trigger is a tick-count deadline drawn
//! uniformly from the configured interval, with both bounds shrinking by up
//! to 30% over the first minute of the race to raise the pressure.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{EVENT_RAMP_MAX_SHRINK, EVENT_RAMP_TICKS, FATIGUE_FACTOR};
use crate::settings::Settings;
use crate::sim::actor::Actor;
use crate::sim::grid::{CollisionGrid, RevealedWall};

/// Closed set of world-event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldEventKind {
    ShortcutReveal,
    Teleportation,
    Fatigue,
    InvisibleWalls,
}

impl WorldEventKind {
    pub fn name(self) -> &'static str {
        match self {
            WorldEventKind::ShortcutReveal => "shortcut reveal",
            WorldEventKind::Teleportation => "teleportation",
            WorldEventKind::Fatigue => "fatigue",
            WorldEventKind::InvisibleWalls => "invisible walls",
        }
    }
}

/// State needed to invert an active event exactly.
#[derive(Debug, Clone)]
enum EventRevert {
    /// Walls opened by ShortcutReveal
    Walls(Vec<RevealedWall>),
    /// Pre-event speed of each actor
    Speeds([f32; 2]),
    /// Render flag only
    WallsHidden,
}

/// A currently running world event.
#[derive(Debug, Clone)]
pub struct ActiveWorldEvent {
    pub kind: WorldEventKind,
    pub started: u64,
    pub duration: u64,
    revert: EventRevert,
}

/// Schedules and runs world events against the shared grid and actors.
#[derive(Debug)]
pub struct WorldEventScheduler {
    next_event_tick: u64,
    active: Option<ActiveWorldEvent>,
}

impl WorldEventScheduler {
    pub fn new(settings: &Settings, rng: &mut impl Rng, now: u64) -> Self {
        let mut scheduler = Self {
            next_event_tick: u64::MAX,
            active: None,
        };
        scheduler.schedule_next(now, settings, rng);
        scheduler
    }

    pub fn active_kind(&self) -> Option<WorldEventKind> {
        self.active.as_ref().map(|e| e.kind)
    }

    /// Remaining ticks of the active event, for the HUD.
    pub fn remaining_ticks(&self, now: u64) -> Option<u64> {
        self.active
            .as_ref()
            .map(|e| (e.started + e.duration).saturating_sub(now))
    }

    /// One scheduling step: expire the active event when its time is up,
    /// then trigger a fresh one if the interval deadline has passed. A
    /// deadline that falls while an event is still active simply retries
    /// next tick; it never preempts or stacks.
    pub fn update(
        &mut self,
        now: u64,
        actors: &mut [Actor; 2],
        grid: &mut CollisionGrid,
        settings: &Settings,
        rng: &mut impl Rng,
    ) {
        if !settings.events_enabled() {
            return;
        }

        if let Some(active) = &self.active {
            if now.saturating_sub(active.started) >= active.duration {
                self.deactivate(actors, grid);
            }
            // A deadline suppressed by this event fires next tick at the
            // earliest, never in the tick that ends it
            return;
        }

        if now >= self.next_event_tick {
            let kinds = settings.enabled_event_kinds();
            if !kinds.is_empty() {
                let kind = kinds[rng.random_range(0..kinds.len())];
                self.activate(kind, now, actors, grid, settings, rng);
            }
            self.schedule_next(now, settings, rng);
        }
    }

    fn activate(
        &mut self,
        kind: WorldEventKind,
        now: u64,
        actors: &mut [Actor; 2],
        grid: &mut CollisionGrid,
        settings: &Settings,
        rng: &mut impl Rng,
    ) {
        log::info!("world event triggered: {}", kind.name());
        let revert = match kind {
            WorldEventKind::ShortcutReveal => {
                let mut revealed = grid.reveal_adjacent_walls(actors[0].rect().center());
                revealed.extend(grid.reveal_adjacent_walls(actors[1].rect().center()));
                EventRevert::Walls(revealed)
            }
            WorldEventKind::Teleportation => {
                // One-shot: relocate both players to mirrored cells and stay idle
                teleport_both(actors, grid, settings, rng);
                return;
            }
            WorldEventKind::Fatigue => {
                let snapshot = [actors[0].speed, actors[1].speed];
                for actor in actors.iter_mut() {
                    actor.speed *= FATIGUE_FACTOR;
                }
                EventRevert::Speeds(snapshot)
            }
            WorldEventKind::InvisibleWalls => {
                grid.walls_hidden = true;
                EventRevert::WallsHidden
            }
        };
        self.active = Some(ActiveWorldEvent {
            kind,
            started: now,
            duration: settings.event_duration_ticks,
            revert,
        });
    }

    fn deactivate(&mut self, actors: &mut [Actor; 2], grid: &mut CollisionGrid) {
        let Some(active) = self.active.take() else {
            return;
        };
        log::info!("world event ended: {}", active.kind.name());
        match active.revert {
            EventRevert::Walls(revealed) => grid.restore_walls(revealed),
            EventRevert::Speeds(snapshot) => {
                // Each actor's own snapshot, not a flat un-halve, so the
                // restore composes with whatever else ran meanwhile
                for (actor, speed) in actors.iter_mut().zip(snapshot) {
                    actor.speed = speed;
                }
            }
            EventRevert::WallsHidden => grid.walls_hidden = false,
        }
    }

    /// Draw the next trigger deadline. Both interval bounds shrink linearly
    /// with elapsed game time, capped at `EVENT_RAMP_MAX_SHRINK` once the
    /// ramp saturates.
    fn schedule_next(&mut self, now: u64, settings: &Settings, rng: &mut impl Rng) {
        if !settings.events_enabled() {
            self.next_event_tick = u64::MAX;
            return;
        }
        let progress = (now as f32 / EVENT_RAMP_TICKS as f32).min(1.0);
        let shrink = 1.0 - EVENT_RAMP_MAX_SHRINK * progress;
        let min = (settings.event_min_interval_ticks as f32 * shrink) as u64;
        let max = ((settings.event_max_interval_ticks as f32 * shrink) as u64).max(min + 1);
        self.next_event_tick = now + rng.random_range(min..=max);
    }
}

/// Teleportation event: pick a floor cell on the left half, away from the
/// bridge, and place player one there and player two on its mirror image.
fn teleport_both(
    actors: &mut [Actor; 2],
    grid: &CollisionGrid,
    settings: &Settings,
    rng: &mut impl Rng,
) {
    let mid = settings.screen_width / 2.0;
    let margin = settings.block_size * 3.0;

    let candidates: Vec<_> = grid
        .floor_cells()
        .filter(|&cell| {
            let rect = grid.cell_rect(cell);
            rect.center().x < mid - margin
        })
        .collect();
    if candidates.is_empty() {
        log::warn!("teleportation event found no usable floor cell; skipped");
        return;
    }

    let cell = candidates[rng.random_range(0..candidates.len())];
    let mirror_col = grid.maze().width() - 1 - cell.col;
    let mirror = crate::sim::maze_gen::Cell::new(cell.row, mirror_col);

    for (actor, target) in actors.iter_mut().zip([cell, mirror]) {
        let pad = (settings.block_size - actor.width) / 2.0;
        actor.pos = grid.cell_rect(target).pos() + Vec2::splat(pad);
    }
    log::info!(
        "teleportation event moved players to {:?} / {:?}",
        cell,
        mirror
    );
}
