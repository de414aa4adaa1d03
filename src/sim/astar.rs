//! Grid A* used to lay out patrol routes at level load
//!
//! Scoring: `g` is the Manhattan distance from the start cell (not accumulated edge
//! cost) and `h` the Manhattan distance to the goal. The open set orders by `f`,
//! then `g`, then insertion order. Patrol route shapes depend on this exact scoring,
//! so keep it even where textbook A* would differ.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::grid::{GridPos, TileGrid};

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    f: i32,
    g: i32,
    parent: Option<usize>,
    visited: bool,
}

impl SearchNode {
    const FRESH: SearchNode = SearchNode {
        f: i32::MAX,
        g: i32::MAX,
        parent: None,
        visited: false,
    };
}

/// Open-set entry. Min-heap on (f, g, seq) via `Reverse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: i32,
    g: i32,
    seq: u32,
    index: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.f, self.g, self.seq).cmp(&(other.f, other.g, other.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable pathfinder. One search node per grid cell, reset between calls.
#[derive(Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<SearchNode>,
    open: BinaryHeap<Reverse<OpenEntry>>,
}

impl Pathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, cells: usize) {
        self.nodes.clear();
        self.nodes.resize(cells, SearchNode::FRESH);
        self.open.clear();
    }

    /// Find a path from `start` to `goal`.
    ///
    /// Returns cells in start → goal order, a single cell when `start == goal`, or
    /// an empty vec when no path exists (or either end is off the grid).
    pub fn find_path(&mut self, grid: &TileGrid, start: GridPos, goal: GridPos) -> Vec<GridPos> {
        let (Some(start_idx), Some(_)) = (grid.index(start), grid.index(goal)) else {
            log::warn!("Pathfinder called out of bounds: {start:?} -> {goal:?}");
            return Vec::new();
        };

        self.reset(grid.len());
        let mut seq = 0u32;

        let h = start.manhattan(goal);
        self.nodes[start_idx].f = h;
        self.nodes[start_idx].g = 0;
        self.open.push(Reverse(OpenEntry {
            f: h,
            g: 0,
            seq,
            index: start_idx,
        }));

        let width = grid.width();

        while let Some(Reverse(entry)) = self.open.pop() {
            let current_idx = entry.index;
            if self.nodes[current_idx].visited {
                // Stale duplicate
                continue;
            }
            self.nodes[current_idx].visited = true;

            let current = GridPos::new((current_idx % width) as i32, (current_idx / width) as i32);
            if current == goal {
                return self.reconstruct(width, current_idx);
            }

            for neighbor in current.neighbors() {
                let Some(n_idx) = grid.index(neighbor) else {
                    continue;
                };
                if !grid.is_walkable(neighbor) || self.nodes[n_idx].visited {
                    continue;
                }

                let g = start.manhattan(neighbor);
                let f = g + neighbor.manhattan(goal);
                if f < self.nodes[n_idx].f {
                    let node = &mut self.nodes[n_idx];
                    node.f = f;
                    node.g = g;
                    node.parent = Some(current_idx);
                    seq += 1;
                    self.open.push(Reverse(OpenEntry {
                        f,
                        g,
                        seq,
                        index: n_idx,
                    }));
                }
            }
        }

        Vec::new()
    }

    fn reconstruct(&self, width: usize, goal_idx: usize) -> Vec<GridPos> {
        let mut path = Vec::new();
        let mut cursor = Some(goal_idx);
        while let Some(idx) = cursor {
            path.push(GridPos::new((idx % width) as i32, (idx / width) as i32));
            cursor = self.nodes[idx].parent;
        }
        path.reverse();
        path
    }
}

/// One-shot convenience wrapper
pub fn find_path(grid: &TileGrid, start: GridPos, goal: GridPos) -> Vec<GridPos> {
    Pathfinder::new().find_path(grid, start, goal)
}
