//! Fixed-tick driver
//!
//! Advances the race by exactly one step in a fixed phase order: intent
//! latch, power-up expiries, world-event scheduling, movement, pickups,
//! verdict. The order is load-bearing; expiries run before movement so a
//! thawed actor moves on the very tick its freeze ends, and pickups run
//! after movement so an effect applies on the touch tick.

use crate::sim::actor::{Intent, PlayerId};
use crate::sim::judge::RaceOutcome;
use crate::sim::movement::resolve_movement;
use crate::sim::state::RaceState;

/// Per-tick input: one intent per racer, produced by the input collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub p1: Intent,
    pub p2: Intent,
}

/// Advance the race one tick. A finished race is inert; call
/// [`RaceState::restart`] to go again.
pub fn tick(state: &mut RaceState, input: TickInput) {
    if state.outcome.is_some() {
        return;
    }

    state.actors[PlayerId::One.index()].movements = input.p1;
    state.actors[PlayerId::Two.index()].movements = input.p2;

    state
        .effects
        .resolve_expiries(state.ticks, &mut state.actors, &state.grid, &state.settings);

    state.events.update(
        state.ticks,
        &mut state.actors,
        &mut state.grid,
        &state.settings,
        &mut state.rng,
    );

    for actor in state.actors.iter_mut() {
        resolve_movement(actor, &state.grid, &state.settings);
    }

    for id in [PlayerId::One, PlayerId::Two] {
        let rect = state.actors[id.index()].rect();
        for index in state.grid.check_power_up_collision(&rect) {
            state.grid.power_ups[index].active = false;
            let kind = state.grid.power_ups[index].kind;
            state.effects.apply_power_up(
                kind,
                id,
                &mut state.actors,
                &mut state.grid,
                &state.settings,
                &mut state.rng,
                state.ticks,
            );
        }
    }

    state.ticks += 1;
    if let Some(winner) = state.win_zone.check(&state.actors) {
        state.outcome = Some(RaceOutcome::new(winner, &state.settings, state.ticks));
        state.effects.clear();
        log::info!("race over: {winner:?} wins after {} ticks", state.ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::effects::PowerUpKind;
    use crate::sim::state::RacePhase;

    fn running_race(seed: u64) -> RaceState {
        let mut settings = Settings::default();
        // Quiet background so scenarios control the whole timeline
        settings.events.enabled = false;
        settings.power_ups.enabled = false;
        RaceState::new(settings, seed).unwrap()
    }

    fn right() -> TickInput {
        TickInput {
            p1: Intent {
                right: true,
                ..Default::default()
            },
            p2: Intent::default(),
        }
    }

    #[test]
    fn identical_input_streams_stay_in_lockstep() {
        let mut a = running_race(42);
        let mut b = running_race(42);
        let inputs = [
            TickInput {
                p1: Intent { down: true, ..Default::default() },
                p2: Intent { left: true, ..Default::default() },
            },
            right(),
            TickInput::default(),
        ];
        for round in 0..200 {
            let input = inputs[round % inputs.len()];
            tick(&mut a, input);
            tick(&mut b, input);
        }
        assert_eq!(a.actors[0].pos, b.actors[0].pos);
        assert_eq!(a.actors[1].pos, b.actors[1].pos);
        assert_eq!(a.ticks, b.ticks);
    }

    #[test]
    fn crossing_the_band_finishes_the_race() {
        let mut state = running_race(9);
        state.actors[0].pos.x = state.win_zone.left - 2.0;
        // Park on the bridge row so the move is unobstructed
        let bridge_row = state.grid.maze().height() / 2;
        state.actors[0].pos.y = state.grid.offset().y
            + bridge_row as f32 * state.settings.block_size
            + (state.settings.block_size - state.actors[0].height) / 2.0;

        tick(&mut state, right());
        let outcome = state.outcome.expect("crossing tick must decide the race");
        assert_eq!(outcome.winner, PlayerId::One);
        assert_eq!(outcome.loser, PlayerId::Two);
        assert_eq!(outcome.elapsed_ticks, 1);
        assert_eq!(state.phase(), RacePhase::Finished);

        // Finished race is inert
        let frozen_at = state.actors[0].pos;
        tick(&mut state, right());
        assert_eq!(state.actors[0].pos, frozen_at);
        assert_eq!(state.ticks, 1);
    }

    #[test]
    fn frozen_racer_ignores_intent_until_expiry() {
        let mut state = running_race(13);
        let (settings, now) = (state.settings.clone(), state.ticks);
        state.effects.apply_power_up(
            PowerUpKind::Freeze,
            PlayerId::One,
            &mut state.actors,
            &mut state.grid,
            &settings,
            &mut state.rng,
            now,
        );
        let parked = state.actors[1].pos;
        let input = TickInput {
            p1: Intent::default(),
            p2: Intent { down: true, ..Default::default() },
        };
        for _ in 0..settings.power_up_duration_ticks {
            tick(&mut state, input);
            if state.ticks < settings.power_up_duration_ticks {
                assert_eq!(state.actors[1].pos, parked);
            }
        }
        // Expiry resolved at the deadline tick, before movement
        tick(&mut state, input);
        assert!(!state.actors[1].frozen);
        assert_ne!(state.actors[1].pos, parked);
    }

    #[test]
    fn pickup_applies_on_the_touch_tick() {
        let mut settings = Settings::default();
        settings.events.enabled = false;
        let mut state = RaceState::new(settings, 17).unwrap();
        assert!(!state.grid.power_ups.is_empty());

        // Drop player one straight onto a power-up
        let target = state.grid.power_ups[0].rect.center();
        state.actors[0].pos = target - glam::Vec2::splat(state.actors[0].width / 2.0);
        let before = state.effects.active_count();
        let kind = state.grid.power_ups[0].kind;

        tick(&mut state, TickInput::default());
        assert!(!state.grid.power_ups[0].active);
        if kind.category().is_some() {
            assert_eq!(state.effects.active_count(), before + 1);
        }
    }
}
