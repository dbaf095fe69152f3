//! Maze Race - a two-player competitive maze race engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze generation, collisions, effects, judging)
//! - `settings`: Resolved immutable race configuration
//! - `stats`: Race-record leaderboard consumed by the stats collaborator
//! - `error`: Error taxonomy
//!
//! Rendering, menus and input mapping are external collaborators: they read
//! actor/wall/power-up state from the sim and feed back per-actor movement
//! intent plus race lifecycle calls. Nothing in this crate draws or blocks.

pub mod error;
pub mod settings;
pub mod sim;
pub mod stats;

pub use error::MazeError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick rate (Hz)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep (seconds)
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Default maze half-dimensions (must satisfy `dim % 4 == 3`)
    pub const DEFAULT_MAZE_WIDTH: usize = 7;
    pub const DEFAULT_MAZE_HEIGHT: usize = 7;

    /// Default viewport the maze is centered in (pixels)
    pub const DEFAULT_SCREEN_WIDTH: f32 = 1280.0;
    pub const DEFAULT_SCREEN_HEIGHT: f32 = 720.0;

    /// Number of wall columns separating the two mirrored halves
    pub const BRIDGE_COLS: usize = 3;

    /// Speed multiplier applied by the SpeedBoost power-up
    pub const SPEED_BOOST_FACTOR: f32 = 1.5;
    /// Speed multiplier applied by the SlowDown power-up
    pub const SLOW_DOWN_FACTOR: f32 = 0.5;
    /// Speed multiplier applied by the Fatigue world event
    pub const FATIGUE_FACTOR: f32 = 0.5;
    /// Enlarged actor size as a fraction of the block size
    pub const ENLARGE_BLOCK_FRACTION: f32 = 0.99;
    /// Power-up sprite size as a fraction of the block size
    pub const POWER_UP_BLOCK_FRACTION: f32 = 0.6;

    /// One power-up per this many half-maze cells
    pub const CELLS_PER_POWER_UP: usize = 25;
    /// Half-width (in cells) of the power-up-free block around the map center
    pub const CENTER_EXCLUSION_CELLS: i64 = 2;

    /// Default timed power-up duration (ticks, 5 s)
    pub const POWER_UP_DURATION_TICKS: u64 = 5 * TICK_RATE as u64;
    /// Default world event duration (ticks, 5 s)
    pub const EVENT_DURATION_TICKS: u64 = 5 * TICK_RATE as u64;
    /// Default bounds for the random world-event interval (ticks)
    pub const EVENT_MIN_INTERVAL_TICKS: u64 = 10 * TICK_RATE as u64;
    pub const EVENT_MAX_INTERVAL_TICKS: u64 = 20 * TICK_RATE as u64;
    /// Event intervals shrink by up to this fraction as the race drags on
    pub const EVENT_RAMP_MAX_SHRINK: f32 = 0.3;
    /// The interval ramp saturates after this much game time (ticks, 60 s)
    pub const EVENT_RAMP_TICKS: u64 = 60 * TICK_RATE as u64;

    /// Win corridor half-width in blocks, measured from the map midline
    pub const WIN_ZONE_BLOCKS: f32 = 1.5;
}
