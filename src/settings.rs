//! Race configuration
//!
//! A `Settings` value is resolved once per race start and treated as
//! immutable while the race runs. Every feature toggle is an explicit field
//! with a default; the sim never probes for optionally-present configuration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::MazeError;
use crate::sim::actor::PlayerId;
use crate::sim::effects::PowerUpKind;
use crate::sim::events::WorldEventKind;
use crate::sim::maze_gen::Cell;

/// Per-kind power-up enablement. A disabled kind is never placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpToggles {
    /// Master switch; when false no power-ups are generated at all
    pub enabled: bool,
    pub speed_boost: bool,
    pub slow_down: bool,
    pub enlarge: bool,
    pub teleport: bool,
    pub freeze: bool,
    pub reverse_controls: bool,
}

impl Default for PowerUpToggles {
    fn default() -> Self {
        Self {
            enabled: true,
            speed_boost: true,
            slow_down: true,
            enlarge: true,
            teleport: true,
            freeze: true,
            reverse_controls: true,
        }
    }
}

/// Per-kind world-event enablement. A disabled kind is never scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventToggles {
    /// Master switch; when false the event scheduler stays idle
    pub enabled: bool,
    pub shortcut_reveal: bool,
    pub teleportation: bool,
    pub fatigue: bool,
    pub invisible_walls: bool,
}

impl Default for EventToggles {
    fn default() -> Self {
        Self {
            enabled: true,
            shortcut_reveal: true,
            teleportation: true,
            fatigue: true,
            invisible_walls: true,
        }
    }
}

/// Resolved race configuration: viewport, maze dimensions, and everything
/// derived from them (block size, player size/speed, start positions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub screen_width: f32,
    pub screen_height: f32,
    /// Half-maze dimensions in cells; both satisfy `dim % 4 == 3`
    pub maze_width: usize,
    pub maze_height: usize,
    /// Cell edge length in pixels, derived from screen and maze size
    pub block_size: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Base speed in pixels per tick
    pub player_speed: f32,
    pub power_ups: PowerUpToggles,
    pub events: EventToggles,
    pub power_up_duration_ticks: u64,
    pub event_duration_ticks: u64,
    pub event_min_interval_ticks: u64,
    pub event_max_interval_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        // The default dimensions are valid by construction
        Self::new(
            DEFAULT_SCREEN_WIDTH,
            DEFAULT_SCREEN_HEIGHT,
            DEFAULT_MAZE_WIDTH,
            DEFAULT_MAZE_HEIGHT,
        )
        .expect("default maze dimensions are valid")
    }
}

impl Settings {
    /// Resolve a configuration. Fails if the maze dimensions break the
    /// `dim % 4 == 3` contract; a bad size is never silently substituted.
    pub fn new(
        screen_width: f32,
        screen_height: f32,
        maze_width: usize,
        maze_height: usize,
    ) -> Result<Self, MazeError> {
        if maze_width % 4 != 3 || maze_height % 4 != 3 {
            return Err(MazeError::InvalidDimensions {
                width: maze_width,
                height: maze_height,
            });
        }
        let mut settings = Self {
            screen_width,
            screen_height,
            maze_width,
            maze_height,
            block_size: 0.0,
            player_width: 0.0,
            player_height: 0.0,
            player_speed: 0.0,
            power_ups: PowerUpToggles::default(),
            events: EventToggles::default(),
            power_up_duration_ticks: POWER_UP_DURATION_TICKS,
            event_duration_ticks: EVENT_DURATION_TICKS,
            event_min_interval_ticks: EVENT_MIN_INTERVAL_TICKS,
            event_max_interval_ticks: EVENT_MAX_INTERVAL_TICKS,
        };
        settings.recalculate();
        Ok(settings)
    }

    /// Change the maze size, revalidating and rederiving block/player metrics.
    pub fn set_maze_size(&mut self, width: usize, height: usize) -> Result<(), MazeError> {
        if width % 4 != 3 || height % 4 != 3 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        self.maze_width = width;
        self.maze_height = height;
        self.recalculate();
        Ok(())
    }

    fn recalculate(&mut self) {
        self.block_size = (self.screen_width / self.map_cols() as f32)
            .min(self.screen_height / self.maze_height as f32)
            .floor();
        self.player_width = (self.block_size / 2.0).floor();
        self.player_height = self.player_width;
        self.player_speed = (self.block_size / 8.0).floor().max(1.0);
    }

    /// Total columns of the mirrored map including the bridge.
    pub fn map_cols(&self) -> usize {
        2 * self.maze_width + BRIDGE_COLS
    }

    /// Top-left pixel of the map, centered in the viewport.
    pub fn maze_offset(&self) -> Vec2 {
        let map_w = self.map_cols() as f32 * self.block_size;
        let map_h = self.maze_height as f32 * self.block_size;
        Vec2::new(
            ((self.screen_width - map_w) / 2.0).floor(),
            ((self.screen_height - map_h) / 2.0).floor(),
        )
    }

    /// Starting grid cell: player one at the top-left room, player two at
    /// its mirror image.
    pub fn start_cell(&self, id: PlayerId) -> Cell {
        match id {
            PlayerId::One => Cell::new(1, 1),
            PlayerId::Two => Cell::new(1, self.map_cols() - 2),
        }
    }

    pub fn power_ups_enabled(&self) -> bool {
        self.power_ups.enabled
    }

    /// The power-up kinds the randomizer may draw from. A disabled kind is
    /// never selected.
    pub fn enabled_power_up_kinds(&self) -> Vec<PowerUpKind> {
        let t = &self.power_ups;
        [
            (t.speed_boost, PowerUpKind::SpeedBoost),
            (t.slow_down, PowerUpKind::SlowDown),
            (t.enlarge, PowerUpKind::Enlarge),
            (t.teleport, PowerUpKind::Teleport),
            (t.freeze, PowerUpKind::Freeze),
            (t.reverse_controls, PowerUpKind::ReverseControls),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }

    pub fn events_enabled(&self) -> bool {
        self.events.enabled
    }

    /// The world-event kinds the scheduler may trigger.
    pub fn enabled_event_kinds(&self) -> Vec<WorldEventKind> {
        let t = &self.events;
        [
            (t.shortcut_reveal, WorldEventKind::ShortcutReveal),
            (t.teleportation, WorldEventKind::Teleportation),
            (t.fatigue, WorldEventKind::Fatigue),
            (t.invisible_walls, WorldEventKind::InvisibleWalls),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }

    /// Starting pixel position, centered within the starting cell.
    pub fn start_position(&self, id: PlayerId) -> Vec2 {
        let cell = self.start_cell(id);
        let offset = self.maze_offset();
        let pad = (self.block_size - self.player_width) / 2.0;
        Vec2::new(
            offset.x + cell.col as f32 * self.block_size + pad,
            offset.y + cell.row as f32 * self.block_size + pad,
        )
    }
}
