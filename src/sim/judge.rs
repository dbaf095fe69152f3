//! Win judging
//!
//! The win zone is the vertical band `1.5` blocks either side of the screen
//! midline. A racer wins the moment their rectangle crosses into the band
//! from their own side; the check runs once per tick after movement, so the
//! verdict lands on the exact crossing tick.

use serde::{Deserialize, Serialize};

use crate::consts::WIN_ZONE_BLOCKS;
use crate::settings::Settings;
use crate::sim::actor::{Actor, PlayerId};

/// Precomputed pixel thresholds of the win band. Both are adjusted by half a
/// player width so the comparison against the rectangle's left edge tests the
/// player's center against the band edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinZone {
    pub left: f32,
    pub right: f32,
}

impl WinZone {
    /// Derive the band from the viewport and block metrics. Must be rebuilt
    /// whenever the maze size (and with it the block size) changes.
    pub fn new(settings: &Settings) -> Self {
        let mid = settings.screen_width / 2.0;
        let half_band = WIN_ZONE_BLOCKS * settings.block_size;
        let half_player = settings.player_width / 2.0;
        Self {
            left: mid - half_band - half_player,
            right: mid + half_band - half_player,
        }
    }

    /// First racer found inside the band, player one checked first.
    pub fn check(&self, actors: &[Actor; 2]) -> Option<PlayerId> {
        if actors[PlayerId::One.index()].pos.x > self.left {
            Some(PlayerId::One)
        } else if actors[PlayerId::Two.index()].pos.x < self.right {
            Some(PlayerId::Two)
        } else {
            None
        }
    }
}

/// Final verdict of one race.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub maze_width: usize,
    pub maze_height: usize,
    pub elapsed_ticks: u64,
}

impl RaceOutcome {
    pub fn new(winner: PlayerId, settings: &Settings, elapsed_ticks: u64) -> Self {
        Self {
            winner,
            loser: winner.opponent(),
            maze_width: settings.maze_width,
            maze_height: settings.maze_height,
            elapsed_ticks,
        }
    }

    /// Elapsed race time in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ticks as f32 * crate::consts::SIM_DT
    }
}
