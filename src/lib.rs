//! Portal Maze - simulation core of a tile-based portal maze game
//!
//! Core modules:
//! - `sim`: Simulation (pathfinding, AI, motion, collisions, game state)
//! - `settings`: Data-driven tuning values
//! - `error`: Startup/configuration errors
//!
//! Rendering, audio, input devices and level file parsing live outside this crate.
//! The core only consumes a walkability grid plus placements and hands back entity
//! positions, animation frames and `GameEvent`s.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::Settings;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Level grid dimensions (tiles)
    pub const GRID_WIDTH_TILES: usize = 20;
    pub const GRID_HEIGHT_TILES: usize = 14;

    /// Tile size in world pixels
    pub const CELL_SIZE: f32 = 64.0;

    /// World dimensions (pixels)
    pub const WORLD_WIDTH_PX: f32 = CELL_SIZE * GRID_WIDTH_TILES as f32;
    pub const WORLD_HEIGHT_PX: f32 = CELL_SIZE * GRID_HEIGHT_TILES as f32;

    /// Player bounding box (sprite is 64px but the mouse is drawn inset)
    pub const PLAYER_BB_SIZE: f32 = CELL_SIZE - 10.0;

    /// Explosion effect size
    pub const EXPLOSION_SIZE: f32 = 50.0;

    /// Weapon indicator size and distance from the player
    pub const INDICATOR_SIZE: f32 = 20.0;
    pub const INDICATOR_SPACING: f32 = 40.0;

    /// Boomerang and boid sprite sizes
    pub const BOOMERANG_SIZE: f32 = 70.0;
    pub const BOID_SIZE: f32 = 40.0;
}

/// One of the four cardinal facings. Screen space: y grows downward, so `Top` is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    /// Unit vector pointing out of the face
    #[inline]
    pub fn normal(self) -> Vec2 {
        match self {
            Direction::Top => Vec2::new(0.0, -1.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Bottom => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// Sprite rotation in degrees for an entity facing this way
    pub fn angle_degrees(self) -> f32 {
        match self {
            Direction::Top => 0.0,
            Direction::Right => 90.0,
            Direction::Bottom => 180.0,
            Direction::Left => 270.0,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Top | Direction::Bottom)
    }
}

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Length-limit a vector (keeps direction, caps magnitude)
#[inline]
pub fn limit(v: Vec2, max: f32) -> Vec2 {
    if v.length() > max {
        v.normalize_or_zero() * max
    } else {
        v
    }
}
