//! Error taxonomy
//!
//! Only maze generation can fail hard; everything else in the sim is a total
//! function. Recoverable "no free position" situations (push-out, teleport
//! target selection) are reported through return values, not errors.

use thiserror::Error;

use crate::sim::maze_gen::Cell;

/// Errors surfaced by maze generation and race construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    /// Maze dimensions must satisfy `dim % 4 == 3` so the grid is odd-sized
    /// with an exact center row for the win corridor.
    #[error("invalid maze dimensions {width}x{height}: both must satisfy dim % 4 == 3")]
    InvalidDimensions { width: usize, height: usize },

    /// A union-find query hit a cell that was never registered. This is an
    /// internal generator bug, not a user error.
    #[error("union-find queried with unregistered cell {0:?}")]
    UnknownElement(Cell),
}
