//! Race state
//!
//! The single aggregate the tick driver advances: resolved settings, the
//! collision grid with its power-ups, both actors, the two schedulers, and
//! the seeded RNG every random decision draws from. Two states built from
//! the same settings and seed and fed the same intent stream stay identical
//! forever.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::error::MazeError;
use crate::settings::Settings;
use crate::sim::actor::{Actor, PlayerId};
use crate::sim::effects::EffectScheduler;
use crate::sim::events::WorldEventScheduler;
use crate::sim::grid::CollisionGrid;
use crate::sim::judge::{RaceOutcome, WinZone};
use crate::sim::maze_gen::{MapFile, build_map};

/// Lifecycle phase of the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    Running,
    Finished,
}

/// Everything one running race owns.
#[derive(Debug)]
pub struct RaceState {
    pub settings: Settings,
    pub grid: CollisionGrid,
    pub actors: [Actor; 2],
    pub effects: EffectScheduler,
    pub events: WorldEventScheduler,
    pub win_zone: WinZone,
    pub rng: Pcg32,
    pub seed: u64,
    pub ticks: u64,
    pub outcome: Option<RaceOutcome>,
}

impl RaceState {
    /// Build a fresh race: generate the mirrored maze, scatter power-ups,
    /// place both actors at their starting cells, arm the event scheduler.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, MazeError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let maze = build_map(settings.maze_width, settings.maze_height, &mut rng)?;
        let mut grid = CollisionGrid::new(maze, settings.block_size, settings.maze_offset());
        grid.place_power_ups(&settings, &mut rng);
        let actors = [
            Actor::new(PlayerId::One, &settings),
            Actor::new(PlayerId::Two, &settings),
        ];
        let events = WorldEventScheduler::new(&settings, &mut rng, 0);
        let win_zone = WinZone::new(&settings);
        log::info!(
            "race ready: {}x{} maze, seed {seed}, {} power-ups",
            settings.maze_width,
            settings.maze_height,
            grid.power_ups.len()
        );
        Ok(Self {
            settings,
            grid,
            actors,
            effects: EffectScheduler::new(),
            events,
            win_zone,
            rng,
            seed,
            ticks: 0,
            outcome: None,
        })
    }

    pub fn phase(&self) -> RacePhase {
        if self.outcome.is_some() {
            RacePhase::Finished
        } else {
            RacePhase::Running
        }
    }

    /// Start over on a fresh maze under a new seed. Teardown is synchronous:
    /// nothing scheduled under the old race survives into the new one.
    pub fn restart(&mut self, seed: u64) -> Result<(), MazeError> {
        self.effects.clear();
        *self = RaceState::new(self.settings.clone(), seed)?;
        Ok(())
    }

    /// Change the maze dimensions and restart. The win zone and every derived
    /// metric follow the new block size.
    pub fn set_maze_size(&mut self, width: usize, height: usize, seed: u64) -> Result<(), MazeError> {
        let mut settings = self.settings.clone();
        settings.set_maze_size(width, height)?;
        self.effects.clear();
        *self = RaceState::new(settings, seed)?;
        Ok(())
    }

    /// Export the current cell grid for persistence or an external viewer.
    pub fn map_file(&self) -> MapFile {
        MapFile::from_grid(self.grid.maze())
    }
}
