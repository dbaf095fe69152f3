//! Collision grid
//!
//! Owns the cell classification plus the derived pixel-space geometry, and
//! answers every rectangle query the resolver and effect scheduler make. The
//! grid mutates in exactly two ways after load: ShortcutReveal temporarily
//! opens walls, and InvisibleWalls flips the render-only `walls_hidden` flag.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::{CELLS_PER_POWER_UP, CENTER_EXCLUSION_CELLS, POWER_UP_BLOCK_FRACTION};
use crate::settings::Settings;
use crate::sim::actor::PlayerId;
use crate::sim::effects::PowerUpKind;
use crate::sim::maze_gen::{Cell, CellKind, MazeGrid};
use crate::sim::rect::Rect;

/// A pickable point entity on the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub rect: Rect,
    /// Cleared on pickup; inactive power-ups are neither pickable nor drawn
    pub active: bool,
}

/// Record of one wall opened by ShortcutReveal, enough to invert the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedWall {
    pub cell: Cell,
}

/// The maze in pixel space: cell grid, viewport offset, power-up set.
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    maze: MazeGrid,
    block_size: f32,
    offset: Vec2,
    pub power_ups: Vec<PowerUp>,
    /// InvisibleWalls camouflage: affects rendering only, never collision
    pub walls_hidden: bool,
}

impl CollisionGrid {
    pub fn new(maze: MazeGrid, block_size: f32, offset: Vec2) -> Self {
        Self {
            maze,
            block_size,
            offset,
            power_ups: Vec::new(),
            walls_hidden: false,
        }
    }

    pub fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Pixel rectangle of a grid cell.
    pub fn cell_rect(&self, cell: Cell) -> Rect {
        Rect::new(
            self.offset.x + cell.col as f32 * self.block_size,
            self.offset.y + cell.row as f32 * self.block_size,
            self.block_size,
            self.block_size,
        )
    }

    /// Grid coordinates of a pixel point (may fall outside the map).
    pub fn cell_at(&self, point: Vec2) -> (i64, i64) {
        (
            ((point.y - self.offset.y) / self.block_size).floor() as i64,
            ((point.x - self.offset.x) / self.block_size).floor() as i64,
        )
    }

    /// True iff `rect` overlaps any wall cell. Broad phase is the cell range
    /// the rectangle spans, so cost scales with the rectangle, not the map.
    pub fn check_collision(&self, rect: &Rect) -> bool {
        let (row0, col0) = self.cell_at(rect.pos());
        let (row1, col1) = self.cell_at(rect.pos() + Vec2::new(rect.w, rect.h));
        for row in row0..=row1 {
            for col in col0..=col1 {
                if self.maze.is_wall(row, col)
                    && self.in_bounds(row, col)
                    && rect.intersects(&self.cell_rect(Cell::new(row as usize, col as usize)))
                {
                    return true;
                }
            }
        }
        false
    }

    fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.maze.height() && (col as usize) < self.maze.width()
    }

    /// Indices of active power-ups intersecting `rect`. The caller applies
    /// the effects and marks them consumed.
    pub fn check_power_up_collision(&self, rect: &Rect) -> Vec<usize> {
        self.power_ups
            .iter()
            .enumerate()
            .filter(|(_, p)| p.active && p.rect.intersects(rect))
            .map(|(i, _)| i)
            .collect()
    }

    /// All floor cells, row-major (stable order keeps teleports seed-stable).
    pub fn floor_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.maze.height()).flat_map(move |row| {
            (0..self.maze.width()).filter_map(move |col| {
                (self.maze.kind(row, col) == CellKind::Floor).then_some(Cell::new(row, col))
            })
        })
    }

    /// Wall rectangles for the view layer.
    pub fn wall_rects(&self) -> Vec<Rect> {
        (0..self.maze.height())
            .flat_map(|row| (0..self.maze.width()).map(move |col| Cell::new(row, col)))
            .filter(|&c| self.maze.kind(c.row, c.col) == CellKind::Wall)
            .map(|c| self.cell_rect(c))
            .collect()
    }

    /// Open any wall in the 5-cell neighborhood (own cell + 4 compass
    /// neighbors) of `around`, skipping the outer border. Returns the records
    /// needed to invert the change exactly.
    pub fn reveal_adjacent_walls(&mut self, around: Vec2) -> Vec<RevealedWall> {
        let (row, col) = self.cell_at(around);
        let mut revealed = Vec::new();
        for (r, c) in [
            (row, col),
            (row - 1, col),
            (row + 1, col),
            (row, col - 1),
            (row, col + 1),
        ] {
            let interior = r > 0
                && c > 0
                && (r as usize) < self.maze.height() - 1
                && (c as usize) < self.maze.width() - 1;
            if interior && self.maze.is_wall(r, c) {
                let cell = Cell::new(r as usize, c as usize);
                self.maze.set(cell, CellKind::Floor);
                revealed.push(RevealedWall { cell });
            }
        }
        revealed
    }

    /// Exact inverse of `reveal_adjacent_walls`.
    pub fn restore_walls(&mut self, revealed: Vec<RevealedWall>) {
        for wall in revealed {
            self.maze.set(wall.cell, CellKind::Wall);
        }
    }

    /// Scatter power-ups across floor cells: one per `CELLS_PER_POWER_UP`
    /// half-maze cells, split evenly between the players' sides by Manhattan
    /// distance, never in the center block or on a starting cell, kinds drawn
    /// uniformly from the enabled set.
    pub fn place_power_ups(&mut self, settings: &Settings, rng: &mut impl Rng) {
        self.power_ups.clear();
        if !settings.power_ups_enabled() {
            return;
        }
        let kinds = settings.enabled_power_up_kinds();
        if kinds.is_empty() {
            return;
        }

        let count = ((settings.maze_width * settings.maze_height) / CELLS_PER_POWER_UP).max(1);
        let center_row = self.maze.height() as i64 / 2;
        let center_col = self.maze.width() as i64 / 2;
        let starts = [
            settings.start_cell(PlayerId::One),
            settings.start_cell(PlayerId::Two),
        ];
        let start_px = [
            settings.start_position(PlayerId::One),
            settings.start_position(PlayerId::Two),
        ];

        let mut side_one: Vec<Cell> = Vec::new();
        let mut side_two: Vec<Cell> = Vec::new();
        for cell in self.floor_cells().collect::<Vec<_>>() {
            let (r, c) = (cell.row as i64, cell.col as i64);
            if (center_col - c).abs() <= CENTER_EXCLUSION_CELLS
                && (center_row - r).abs() <= CENTER_EXCLUSION_CELLS
            {
                continue;
            }
            if starts.contains(&cell) {
                continue;
            }
            let pos = self.cell_rect(cell).pos();
            let d1 = (pos.x - start_px[0].x).abs() + (pos.y - start_px[0].y).abs();
            let d2 = (pos.x - start_px[1].x).abs() + (pos.y - start_px[1].y).abs();
            if d1 < d2 {
                side_one.push(cell);
            } else {
                side_two.push(cell);
            }
        }

        side_one.shuffle(rng);
        side_two.shuffle(rng);
        let per_side = count / 2;
        let chosen = side_one
            .into_iter()
            .take(per_side.max(1))
            .chain(side_two.into_iter().take(per_side.max(1)));

        let size = (self.block_size * POWER_UP_BLOCK_FRACTION).floor();
        let pad = ((self.block_size - size) / 2.0).floor();
        for cell in chosen {
            let cell_pos = self.cell_rect(cell).pos();
            let kind = kinds[rng.random_range(0..kinds.len())];
            self.power_ups.push(PowerUp {
                kind,
                rect: Rect::new(cell_pos.x + pad, cell_pos.y + pad, size, size),
                active: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PowerUpToggles;
    use crate::sim::maze_gen::MapFile;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    // 5x5 test map: border walls, open interior with one center wall.
    fn test_grid() -> CollisionGrid {
        let map = MapFile {
            maze: vec![
                vec![1, 1, 1, 1, 1],
                vec![1, 0, 0, 0, 1],
                vec![1, 0, 1, 0, 1],
                vec![1, 0, 0, 0, 1],
                vec![1, 1, 1, 1, 1],
            ],
        };
        CollisionGrid::new(map.into_grid(), 20.0, Vec2::ZERO)
    }

    #[test]
    fn detects_wall_overlap() {
        let grid = test_grid();
        // Center wall occupies (40, 40, 20, 20)
        assert!(grid.check_collision(&Rect::new(45.0, 45.0, 10.0, 10.0)));
        assert!(grid.check_collision(&Rect::new(35.0, 45.0, 10.0, 10.0)));
        assert!(!grid.check_collision(&Rect::new(21.0, 21.0, 18.0, 18.0)));
    }

    #[test]
    fn flush_contact_is_not_a_collision() {
        let grid = test_grid();
        // Right edge exactly on the center wall's left edge
        assert!(!grid.check_collision(&Rect::new(30.0, 42.0, 10.0, 10.0)));
    }

    #[test]
    fn reveal_and_restore_are_exact_inverses() {
        let mut grid = test_grid();
        let before = grid.maze().clone();
        // Actor centered on the floor cell left of the center wall
        let revealed = grid.reveal_adjacent_walls(Vec2::new(30.0, 50.0));
        assert_eq!(revealed, vec![RevealedWall { cell: Cell::new(2, 2) }]);
        assert!(!grid.check_collision(&Rect::new(45.0, 45.0, 10.0, 10.0)));
        grid.restore_walls(revealed);
        assert_eq!(*grid.maze(), before);
    }

    #[test]
    fn border_walls_are_never_revealed() {
        let mut grid = test_grid();
        // Corner floor cell: both neighbors in the border must stay walls
        let revealed = grid.reveal_adjacent_walls(Vec2::new(30.0, 30.0));
        assert!(revealed.is_empty());
    }

    #[test]
    fn power_up_pickup_query_respects_active_flag() {
        let mut grid = test_grid();
        grid.power_ups.push(PowerUp {
            kind: PowerUpKind::SpeedBoost,
            rect: Rect::new(25.0, 25.0, 10.0, 10.0),
            active: true,
        });
        let actor = Rect::new(22.0, 22.0, 10.0, 10.0);
        assert_eq!(grid.check_power_up_collision(&actor), vec![0]);
        grid.power_ups[0].active = false;
        assert!(grid.check_power_up_collision(&actor).is_empty());
    }

    #[test]
    fn placement_honors_toggles_and_exclusion() {
        let mut settings = Settings::default();
        settings.set_maze_size(11, 11).unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        let maze = crate::sim::maze_gen::build_map(11, 11, &mut rng).unwrap();
        let mut grid = CollisionGrid::new(maze, settings.block_size, settings.maze_offset());

        grid.place_power_ups(&settings, &mut rng);
        assert!(!grid.power_ups.is_empty());
        let center_col = grid.maze().width() as i64 / 2;
        let center_row = grid.maze().height() as i64 / 2;
        for p in &grid.power_ups {
            let (row, col) = grid.cell_at(p.rect.center());
            assert!(
                (center_col - col).abs() > CENTER_EXCLUSION_CELLS
                    || (center_row - row).abs() > CENTER_EXCLUSION_CELLS,
                "power-up inside center exclusion at ({row},{col})"
            );
        }

        settings.power_ups.enabled = false;
        grid.place_power_ups(&settings, &mut rng);
        assert!(grid.power_ups.is_empty());

        settings.power_ups.enabled = true;
        settings.power_ups = PowerUpToggles {
            enabled: true,
            speed_boost: false,
            slow_down: false,
            enlarge: false,
            teleport: false,
            freeze: false,
            reverse_controls: false,
        };
        grid.place_power_ups(&settings, &mut rng);
        assert!(grid.power_ups.is_empty());
    }
}
