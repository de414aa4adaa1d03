//! Tile grid model
//!
//! A fixed-size walkability map handed over by the level loader. Walkability never
//! changes after a level is built; portal bookkeeping lives on wall entities instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CELL_SIZE;

/// Integer cell coordinate (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Cardinal neighbours in search order: up, right, down, left
    pub fn neighbors(self) -> [GridPos; 4] {
        [
            GridPos::new(self.col, self.row - 1),
            GridPos::new(self.col + 1, self.row),
            GridPos::new(self.col, self.row + 1),
            GridPos::new(self.col - 1, self.row),
        ]
    }

    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.col - other.col).abs() + (self.row - other.row).abs()
    }

    /// World-space centre of this cell
    pub fn to_world(self) -> Vec2 {
        Vec2::new(
            self.col as f32 * CELL_SIZE + CELL_SIZE / 2.0,
            self.row as f32 * CELL_SIZE + CELL_SIZE / 2.0,
        )
    }

    /// Cell containing a world-space point (truncating, like the tile lookup in the renderer)
    pub fn from_world(pos: Vec2) -> Self {
        Self::new((pos.x / CELL_SIZE) as i32, (pos.y / CELL_SIZE) as i32)
    }

    /// Offset by one cell along a facing
    pub fn step(self, dir: crate::Direction) -> Self {
        match dir {
            crate::Direction::Top => GridPos::new(self.col, self.row - 1),
            crate::Direction::Right => GridPos::new(self.col + 1, self.row),
            crate::Direction::Bottom => GridPos::new(self.col, self.row + 1),
            crate::Direction::Left => GridPos::new(self.col - 1, self.row),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub walkable: bool,
}

/// Row-major walkability grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// All-walkable grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile { walkable: true }; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as usize) < self.width
            && (pos.row as usize) < self.height
    }

    /// Flat index of an in-bounds cell
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.row as usize * self.width + pos.col as usize)
    }

    pub fn tile(&self, pos: GridPos) -> Option<Tile> {
        self.index(pos).map(|i| self.tiles[i])
    }

    /// Out-of-bounds cells count as blocked
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.tile(pos).is_some_and(|t| t.walkable)
    }

    /// Used only while building a level
    pub fn set_walkable(&mut self, pos: GridPos, walkable: bool) {
        if let Some(i) = self.index(pos) {
            self.tiles[i].walkable = walkable;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_round_trip() {
        let cell = GridPos::new(3, 7);
        let centre = cell.to_world();
        assert_eq!(centre, Vec2::new(224.0, 480.0));
        assert_eq!(GridPos::from_world(centre), cell);
    }

    #[test]
    fn test_neighbor_order() {
        let n = GridPos::new(5, 5).neighbors();
        assert_eq!(n[0], GridPos::new(5, 4));
        assert_eq!(n[1], GridPos::new(6, 5));
        assert_eq!(n[2], GridPos::new(5, 6));
        assert_eq!(n[3], GridPos::new(4, 5));
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let mut grid = TileGrid::new(4, 3);
        assert!(grid.is_walkable(GridPos::new(3, 2)));
        assert!(!grid.is_walkable(GridPos::new(4, 2)));
        assert!(!grid.is_walkable(GridPos::new(-1, 0)));

        grid.set_walkable(GridPos::new(1, 1), false);
        assert!(!grid.is_walkable(GridPos::new(1, 1)));
        // Silently ignored
        grid.set_walkable(GridPos::new(9, 9), false);
        assert_eq!(grid.len(), 12);
    }
}
