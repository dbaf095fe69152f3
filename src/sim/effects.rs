//! Power-up effects and their scheduled expiry
//!
//! Each applied power-up registers an active-effect record keyed by
//! `(category, affected player)` and pushes a deadline into an explicit
//! expiry queue checked once per tick. Removal is the exact algebraic
//! inverse of application: speed effects reset to the configured base speed,
//! size restores the configured dimensions about the preserved center,
//! freeze restores the saved speed. Re-registering an occupied key cancels
//! and replaces the prior expiry; the stale queue entry is recognized by its
//! generation stamp and dropped when it surfaces.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{ENLARGE_BLOCK_FRACTION, SLOW_DOWN_FACTOR, SPEED_BOOST_FACTOR};
use crate::settings::Settings;
use crate::sim::actor::{Actor, PlayerId};
use crate::sim::grid::CollisionGrid;
use crate::sim::movement::push_out_of_wall;

/// Closed set of power-up kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    SlowDown,
    Enlarge,
    Teleport,
    Freeze,
    ReverseControls,
}

impl PowerUpKind {
    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "speed boost",
            PowerUpKind::SlowDown => "slow down",
            PowerUpKind::Enlarge => "enlarge",
            PowerUpKind::Teleport => "teleport",
            PowerUpKind::Freeze => "freeze",
            PowerUpKind::ReverseControls => "reverse controls",
        }
    }

    /// Bookkeeping category; instantaneous kinds carry none.
    pub fn category(self) -> Option<EffectCategory> {
        match self {
            PowerUpKind::SpeedBoost | PowerUpKind::SlowDown => Some(EffectCategory::Speed),
            PowerUpKind::Enlarge => Some(EffectCategory::Size),
            PowerUpKind::Freeze => Some(EffectCategory::Freeze),
            PowerUpKind::ReverseControls => Some(EffectCategory::Controls),
            PowerUpKind::Teleport => None,
        }
    }
}

/// Mutually exclusive effect slot per actor: a new registration in an
/// occupied slot replaces the old one, never stacks beside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCategory {
    Speed,
    Size,
    Freeze,
    Controls,
}

pub type EffectKey = (EffectCategory, PlayerId);

/// Bookkeeping record linking an applied modifier to its future inverse.
#[derive(Debug, Clone)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    /// Generation stamp matching the live queue entry
    seq: u64,
}

/// A scheduled inverse action. Ordered by deadline, then registration order,
/// so simultaneous expiries resolve oldest-registered-first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Expiry {
    deadline: u64,
    seq: u64,
    key: EffectKey,
}

impl Ord for Expiry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.deadline, self.seq).cmp(&(other.deadline, other.seq))
    }
}

impl PartialOrd for Expiry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Owns the set of currently active power-up effects and their expiry queue.
#[derive(Debug, Default)]
pub struct EffectScheduler {
    active: HashMap<EffectKey, ActiveEffect>,
    queue: BinaryHeap<Reverse<Expiry>>,
    next_seq: u64,
}

impl EffectScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, category: EffectCategory, player: PlayerId) -> bool {
        self.active.contains_key(&(category, player))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Apply a picked-up power-up. `picker` is the actor that touched it;
    /// offensive kinds target the opponent.
    pub fn apply_power_up(
        &mut self,
        kind: PowerUpKind,
        picker: PlayerId,
        actors: &mut [Actor; 2],
        grid: &mut CollisionGrid,
        settings: &Settings,
        rng: &mut impl Rng,
        now: u64,
    ) {
        let opponent = picker.opponent();
        match kind {
            PowerUpKind::SpeedBoost => {
                let actor = &mut actors[picker.index()];
                actor.speed *= SPEED_BOOST_FACTOR;
                self.register(kind, picker, settings, now);
            }
            PowerUpKind::SlowDown => {
                let actor = &mut actors[opponent.index()];
                actor.speed *= SLOW_DOWN_FACTOR;
                self.register(kind, opponent, settings, now);
            }
            PowerUpKind::Enlarge => {
                let size = (grid.block_size() * ENLARGE_BLOCK_FRACTION).floor();
                let actor = &mut actors[opponent.index()];
                actor.set_size_preserving_center(size, size);
                push_out_of_wall(actor, grid);
                self.register(kind, opponent, settings, now);
            }
            PowerUpKind::Teleport => {
                // Instantaneous: no registration, no expiry
                teleport_actor(&mut actors[picker.index()], grid, settings, rng);
            }
            PowerUpKind::Freeze => {
                let actor = &mut actors[opponent.index()];
                let current = if actor.speed > 0.0 {
                    actor.speed
                } else {
                    settings.player_speed
                };
                actor.saved_speed = Some(current);
                actor.speed = 0.0;
                actor.frozen = true;
                self.register(kind, opponent, settings, now);
            }
            PowerUpKind::ReverseControls => {
                actors[opponent.index()].reversed_controls = true;
                self.register(kind, opponent, settings, now);
            }
        }
        log::info!("power-up applied: {} (picked by {picker:?})", kind.name());
    }

    fn register(&mut self, kind: PowerUpKind, target: PlayerId, settings: &Settings, now: u64) {
        let Some(category) = kind.category() else {
            return;
        };
        let key = (category, target);
        let seq = self.next_seq;
        self.next_seq += 1;
        if self.active.insert(key, ActiveEffect { kind, seq }).is_some() {
            // Cancel-and-replace: the superseded queue entry goes stale and
            // is dropped when it surfaces.
            log::info!("effect {category:?} on {target:?} re-registered; prior expiry cancelled");
        }
        self.queue.push(Reverse(Expiry {
            deadline: now + settings.power_up_duration_ticks,
            seq,
            key,
        }));
    }

    /// Run the inverse of every effect whose deadline has passed,
    /// oldest-registered-first.
    pub fn resolve_expiries(
        &mut self,
        now: u64,
        actors: &mut [Actor; 2],
        grid: &CollisionGrid,
        settings: &Settings,
    ) {
        while let Some(Reverse(head)) = self.queue.peek() {
            if head.deadline > now {
                break;
            }
            let Some(Reverse(entry)) = self.queue.pop() else {
                break;
            };
            // Stale entries belong to cancelled-and-replaced registrations
            let live = self
                .active
                .get(&entry.key)
                .is_some_and(|active| active.seq == entry.seq);
            if !live {
                continue;
            }
            if let Some(effect) = self.active.remove(&entry.key) {
                let (category, player) = entry.key;
                remove_effect(category, &mut actors[player.index()], grid, settings);
                log::info!("effect expired: {} on {player:?}", effect.kind.name());
            }
        }
    }

    /// Race teardown: drop every active effect and pending expiry so nothing
    /// scheduled under the old race fires against a reset actor.
    pub fn clear(&mut self) {
        self.active.clear();
        self.queue.clear();
    }
}

/// Exact inverse of the category's application.
fn remove_effect(
    category: EffectCategory,
    actor: &mut Actor,
    grid: &CollisionGrid,
    settings: &Settings,
) {
    match category {
        // Reset to the settings-defined base speed rather than inverse
        // multiplying, so interleaved modifiers cannot drift the value.
        EffectCategory::Speed => actor.speed = settings.player_speed,
        EffectCategory::Size => {
            actor.set_size_preserving_center(settings.player_width, settings.player_height);
            // The smaller footprint can still straddle a wall revealed away
            push_out_of_wall(actor, grid);
        }
        EffectCategory::Freeze => {
            actor.frozen = false;
            actor.speed = actor.saved_speed.take().unwrap_or(settings.player_speed);
        }
        EffectCategory::Controls => actor.reversed_controls = false,
    }
}

/// Relocate `actor` to a uniformly chosen floor cell on its own half, outside
/// the win zone, whose footprint is collision-free. No-op (logged) when no
/// such cell exists.
pub fn teleport_actor(
    actor: &mut Actor,
    grid: &CollisionGrid,
    settings: &Settings,
    rng: &mut impl Rng,
) -> bool {
    let mid = settings.screen_width / 2.0;
    let margin = settings.block_size * 2.0;

    // Row-major floor-cell order keeps the seeded pick deterministic
    let candidates: Vec<_> = grid
        .floor_cells()
        .filter_map(|cell| {
            let pos = grid.cell_rect(cell).pos();
            let in_win_zone = match actor.id {
                PlayerId::One => pos.x > mid - margin,
                PlayerId::Two => pos.x < mid + margin,
            };
            if in_win_zone || grid.check_collision(&actor.rect_at(pos)) {
                return None;
            }
            Some(pos)
        })
        .collect();

    if candidates.is_empty() {
        log::warn!("teleport found no free target for {:?}; leaving in place", actor.id);
        return false;
    }
    actor.pos = candidates[rng.random_range(0..candidates.len())];
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::maze_gen::build_map;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn fixture() -> (Settings, [Actor; 2], CollisionGrid, Pcg32, EffectScheduler) {
        let mut settings = Settings::default();
        settings.player_speed = 5.0;
        let mut rng = Pcg32::seed_from_u64(11);
        let maze = build_map(settings.maze_width, settings.maze_height, &mut rng).unwrap();
        let grid = CollisionGrid::new(maze, settings.block_size, settings.maze_offset());
        let actors = [
            Actor::new(PlayerId::One, &settings),
            Actor::new(PlayerId::Two, &settings),
        ];
        (settings, actors, grid, rng, EffectScheduler::new())
    }

    #[test]
    fn speed_boost_applies_and_inverts_exactly() {
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        fx.apply_power_up(
            PowerUpKind::SpeedBoost,
            PlayerId::One,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            0,
        );
        assert_eq!(actors[0].speed, 7.5);
        assert!(fx.is_active(EffectCategory::Speed, PlayerId::One));

        let deadline = settings.power_up_duration_ticks;
        fx.resolve_expiries(deadline - 1, &mut actors, &grid, &settings);
        assert_eq!(actors[0].speed, 7.5);
        fx.resolve_expiries(deadline, &mut actors, &grid, &settings);
        assert_eq!(actors[0].speed, 5.0);
        assert_eq!(fx.active_count(), 0);
    }

    #[test]
    fn slow_down_targets_the_opponent() {
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        fx.apply_power_up(
            PowerUpKind::SlowDown,
            PlayerId::One,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            0,
        );
        assert_eq!(actors[0].speed, 5.0);
        assert_eq!(actors[1].speed, 2.5);
        assert!(fx.is_active(EffectCategory::Speed, PlayerId::Two));

        fx.resolve_expiries(settings.power_up_duration_ticks, &mut actors, &grid, &settings);
        assert_eq!(actors[1].speed, 5.0);
    }

    #[test]
    fn freeze_restores_the_pre_freeze_speed() {
        // A boost is active on player two when the freeze lands; the thaw
        // must bring back the boosted speed, not the base speed.
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        fx.apply_power_up(
            PowerUpKind::SpeedBoost,
            PlayerId::Two,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            0,
        );
        assert_eq!(actors[1].speed, 7.5);
        fx.apply_power_up(
            PowerUpKind::Freeze,
            PlayerId::One,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            10,
        );
        assert!(actors[1].frozen);
        assert_eq!(actors[1].speed, 0.0);
        assert_eq!(actors[1].saved_speed, Some(7.5));

        // Boost expires first (registered first), then the thaw
        let d = settings.power_up_duration_ticks;
        fx.resolve_expiries(d, &mut actors, &grid, &settings);
        assert!(actors[1].frozen);
        fx.resolve_expiries(d + 10, &mut actors, &grid, &settings);
        assert!(!actors[1].frozen);
        assert_eq!(actors[1].speed, 7.5);
        assert_eq!(actors[1].saved_speed, None);
    }

    #[test]
    fn enlarge_resizes_about_center_and_inverts() {
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        let before_center = actors[1].rect().center();
        fx.apply_power_up(
            PowerUpKind::Enlarge,
            PlayerId::One,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            0,
        );
        let big = (settings.block_size * ENLARGE_BLOCK_FRACTION).floor();
        assert_eq!(actors[1].width, big);
        assert_eq!(actors[1].height, big);
        assert!(!grid.check_collision(&actors[1].rect()));

        fx.resolve_expiries(settings.power_up_duration_ticks, &mut actors, &grid, &settings);
        assert_eq!(actors[1].width, settings.player_width);
        assert_eq!(actors[1].height, settings.player_height);
        assert!(!grid.check_collision(&actors[1].rect()));
        // Push-out may have nudged the footprint; the center stays close
        let after_center = actors[1].rect().center();
        assert!((before_center - after_center).length() <= settings.block_size);
    }

    #[test]
    fn reverse_controls_toggles_the_flag() {
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        fx.apply_power_up(
            PowerUpKind::ReverseControls,
            PlayerId::Two,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            0,
        );
        assert!(actors[0].reversed_controls);
        assert!(!actors[1].reversed_controls);
        fx.resolve_expiries(settings.power_up_duration_ticks, &mut actors, &grid, &settings);
        assert!(!actors[0].reversed_controls);
    }

    #[test]
    fn teleport_lands_on_a_free_cell_on_own_half() {
        let (settings, mut actors, grid, mut rng, _) = fixture();
        let moved = teleport_actor(&mut actors[0], &grid, &settings, &mut rng);
        assert!(moved);
        assert!(!grid.check_collision(&actors[0].rect()));
        let mid = settings.screen_width / 2.0;
        assert!(actors[0].pos.x <= mid - settings.block_size * 2.0);
    }

    #[test]
    fn reapplication_cancels_the_prior_expiry() {
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        fx.apply_power_up(
            PowerUpKind::Freeze,
            PlayerId::One,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            0,
        );
        fx.apply_power_up(
            PowerUpKind::Freeze,
            PlayerId::One,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            100,
        );
        assert_eq!(fx.active_count(), 1);

        // The original deadline passes without thawing
        let d = settings.power_up_duration_ticks;
        fx.resolve_expiries(d, &mut actors, &grid, &settings);
        assert!(actors[1].frozen);
        // The replacement deadline thaws
        fx.resolve_expiries(d + 100, &mut actors, &grid, &settings);
        assert!(!actors[1].frozen);
    }

    #[test]
    fn no_duplicate_keys_across_a_timeline() {
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        for now in [0, 50, 100] {
            fx.apply_power_up(
                PowerUpKind::SlowDown,
                PlayerId::One,
                &mut actors,
                &mut grid,
                &settings,
                &mut rng,
                now,
            );
            assert_eq!(fx.active_count(), 1);
        }
    }

    #[test]
    fn clear_drops_all_bookkeeping() {
        let (settings, mut actors, mut grid, mut rng, mut fx) = fixture();
        fx.apply_power_up(
            PowerUpKind::Freeze,
            PlayerId::One,
            &mut actors,
            &mut grid,
            &settings,
            &mut rng,
            0,
        );
        fx.clear();
        assert_eq!(fx.active_count(), 0);
        // Nothing fires after teardown
        let speed = actors[1].speed;
        fx.resolve_expiries(u64::MAX, &mut actors, &grid, &settings);
        assert_eq!(actors[1].speed, speed);
    }
}
