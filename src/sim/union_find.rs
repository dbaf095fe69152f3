//! Disjoint-set union over maze cells
//!
//! Path compression + union by rank. Backs the randomized Kruskal generator:
//! two rooms are connected exactly when their roots match.

use std::collections::HashMap;

use crate::error::MazeError;
use crate::sim::maze_gen::Cell;

/// Disjoint-set structure over a fixed set of registered cells.
///
/// Querying a cell that was never registered is a generator bug and yields
/// `MazeError::UnknownElement` instead of panicking.
#[derive(Debug)]
pub struct UnionFind {
    index: HashMap<Cell, usize>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Build the structure with each element in its own singleton set.
    pub fn new(elements: impl IntoIterator<Item = Cell>) -> Self {
        let index: HashMap<Cell, usize> = elements
            .into_iter()
            .enumerate()
            .map(|(i, cell)| (cell, i))
            .collect();
        let n = index.len();
        Self {
            index,
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Root of the set containing `cell`, with path compression.
    pub fn find(&mut self, cell: Cell) -> Result<usize, MazeError> {
        let slot = *self
            .index
            .get(&cell)
            .ok_or(MazeError::UnknownElement(cell))?;
        Ok(self.find_slot(slot))
    }

    fn find_slot(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Compress the walked path
        let mut cur = slot;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b` using union by rank.
    /// Returns whether a merge actually occurred.
    pub fn union(&mut self, a: Cell, b: Cell) -> Result<bool, MazeError> {
        let root_a = self.find(a)?;
        let root_b = self.find(b)?;
        if root_a == root_b {
            return Ok(false);
        }
        if self.rank[root_a] > self.rank[root_b] {
            self.parent[root_b] = root_a;
        } else {
            self.parent[root_a] = root_b;
            if self.rank[root_a] == self.rank[root_b] {
                self.rank[root_b] += 1;
            }
        }
        Ok(true)
    }
}
