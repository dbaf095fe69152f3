//! Deterministic simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (row-major cells, fixed actor order)
//! - No rendering or platform dependencies

pub mod actor;
pub mod effects;
pub mod events;
pub mod grid;
pub mod judge;
pub mod maze_gen;
pub mod movement;
pub mod rect;
pub mod state;
pub mod tick;
pub mod union_find;

pub use actor::{Actor, Intent, PlayerId};
pub use effects::{EffectCategory, EffectScheduler, PowerUpKind};
pub use events::{WorldEventKind, WorldEventScheduler};
pub use grid::{CollisionGrid, PowerUp, RevealedWall};
pub use judge::{RaceOutcome, WinZone};
pub use maze_gen::{Cell, CellKind, MapFile, MazeGrid, build_map, generate};
pub use movement::{push_out_of_wall, resolve_movement};
pub use rect::Rect;
pub use state::{RacePhase, RaceState};
pub use tick::{TickInput, tick};
pub use union_find::UnionFind;
