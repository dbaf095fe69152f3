//! Procedural maze generation
//!
//! One half-maze is carved with randomized Kruskal's algorithm over a
//! union-find of odd-coordinate "rooms", then mirrored into a two-arena map:
//! left half, a 3-column wall bridge, and the mirrored right half. A short
//! corridor pierced through the bridge center is the only link between the
//! halves and doubles as the win zone.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::BRIDGE_COLS;
use crate::error::MazeError;
use crate::sim::union_find::UnionFind;

/// A (row, col) grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Classification of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Floor,
}

/// The full two-arena map: `height` rows by `2 * width + 3` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    cells: Vec<Vec<CellKind>>,
}

impl MazeGrid {
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn kind(&self, row: usize, col: usize) -> CellKind {
        self.cells[row][col]
    }

    /// Out-of-bounds coordinates count as walls.
    pub fn is_wall(&self, row: i64, col: i64) -> bool {
        if row < 0 || col < 0 || row as usize >= self.height() || col as usize >= self.width() {
            return true;
        }
        self.cells[row as usize][col as usize] == CellKind::Wall
    }

    pub fn set(&mut self, cell: Cell, kind: CellKind) {
        self.cells[cell.row][cell.col] = kind;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellKind]> {
        self.cells.iter().map(Vec::as_slice)
    }
}

/// On-disk map format: `0` = floor, `1` = wall, one array per row.
///
/// Written once per race start; the view layer and any external tools read
/// the same file back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFile {
    pub maze: Vec<Vec<u8>>,
}

impl MapFile {
    pub fn from_grid(grid: &MazeGrid) -> Self {
        let maze = grid
            .rows()
            .map(|row| {
                row.iter()
                    .map(|&k| if k == CellKind::Wall { 1 } else { 0 })
                    .collect()
            })
            .collect();
        Self { maze }
    }

    pub fn into_grid(self) -> MazeGrid {
        let cells = self
            .maze
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| if v == 0 { CellKind::Floor } else { CellKind::Wall })
                    .collect()
            })
            .collect();
        MazeGrid { cells }
    }

    pub fn to_json(&self) -> String {
        // Serialization of a plain nested array cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A candidate wall between two rooms, in Kruskal edge form.
struct CandidateWall {
    wall: Cell,
    room_a: Cell,
    room_b: Cell,
}

fn validate(width: usize, height: usize) -> Result<(), MazeError> {
    // `dim % 4 == 3` gives an odd grid with an exact center row so the win
    // corridor lands between two room rows instead of through one.
    if width % 4 != 3 || height % 4 != 3 {
        return Err(MazeError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Carve one perfect half-maze of `height x width` cells.
///
/// Every odd-coordinate cell is a room; shuffled candidate walls are opened
/// whenever they join two different components, producing a uniform spanning
/// tree: exactly one path between any two rooms, no cycles.
pub fn generate(
    width: usize,
    height: usize,
    rng: &mut impl Rng,
) -> Result<MazeGrid, MazeError> {
    validate(width, height)?;

    let mut cells = vec![vec![CellKind::Wall; width]; height];
    let rooms: Vec<Cell> = (1..height)
        .step_by(2)
        .flat_map(|row| (1..width).step_by(2).map(move |col| Cell::new(row, col)))
        .collect();
    for room in &rooms {
        cells[room.row][room.col] = CellKind::Floor;
    }

    let mut walls = Vec::new();
    for &room in &rooms {
        if room.row + 2 < height {
            walls.push(CandidateWall {
                wall: Cell::new(room.row + 1, room.col),
                room_a: room,
                room_b: Cell::new(room.row + 2, room.col),
            });
        }
        if room.col + 2 < width {
            walls.push(CandidateWall {
                wall: Cell::new(room.row, room.col + 1),
                room_a: room,
                room_b: Cell::new(room.row, room.col + 2),
            });
        }
    }
    walls.shuffle(rng);

    let mut components = UnionFind::new(rooms);
    for candidate in walls {
        if components.union(candidate.room_a, candidate.room_b)? {
            cells[candidate.wall.row][candidate.wall.col] = CellKind::Floor;
        }
    }

    Ok(MazeGrid { cells })
}

/// Build the full race map: half-maze, mirrored copy, 3-column wall bridge,
/// and the 3/5/3 win corridor pierced through the bridge center.
pub fn build_map(
    width: usize,
    height: usize,
    rng: &mut impl Rng,
) -> Result<MazeGrid, MazeError> {
    let half = generate(width, height, rng)?;

    let mut cells: Vec<Vec<CellKind>> = half
        .rows()
        .map(|row| {
            let mut full = Vec::with_capacity(2 * width + BRIDGE_COLS);
            full.extend_from_slice(row);
            full.extend(std::iter::repeat_n(CellKind::Wall, BRIDGE_COLS));
            full.extend(row.iter().rev());
            full
        })
        .collect();

    // Win corridor: three floor cells above and below the center row, five on
    // the center row itself so it meets both halves.
    let mid = height / 2;
    for col in width..width + BRIDGE_COLS {
        cells[mid - 1][col] = CellKind::Floor;
        cells[mid + 1][col] = CellKind::Floor;
    }
    for col in (width - 1)..=(width + BRIDGE_COLS) {
        cells[mid][col] = CellKind::Floor;
    }

    Ok(MazeGrid { cells })
}
