//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (boid wander, flock placement)
//! - Stable iteration order (registry order)
//! - Fixed phase order within a tick
//! - No rendering or platform dependencies

pub mod animation;
pub mod astar;
pub mod boids;
pub mod collision;
pub mod grid;
pub mod level;
pub mod mesh;
pub mod motion;
pub mod patrol;
pub mod player;
pub mod resolve;
pub mod sniper;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use animation::{Animation, Clip};
pub use astar::{Pathfinder, find_path};
pub use collision::{CollisionPair, DetectionReport, PortalProximity, detect};
pub use grid::{GridPos, TileGrid};
pub use level::{FlockSpec, LevelLayout, Placement};
pub use mesh::{MeshId, MeshLibrary};
pub use resolve::{Outcome, resolve};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use world::{Entity, EntityId, Facet, Motion, World};
