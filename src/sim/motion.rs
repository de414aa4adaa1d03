//! Motion integration
//!
//! Linear Euler step for everything with a velocity, cubic Bézier playback for
//! boomerangs. Boids move themselves in `boids::update_boids`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{EntityId, World};
use crate::consts::{WORLD_HEIGHT_PX, WORLD_WIDTH_PX};

/// Boomerang flight: a cubic Bézier flown forward then backward, forever
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boomerang {
    pub start: Vec2,
    pub end: Vec2,
    pub start_control: Vec2,
    pub end_control: Vec2,
    pub elapsed_ms: f32,
    /// Time for one leg
    pub duration_ms: f32,
    /// Flying back toward `start`
    pub reverse: bool,
}

/// B(t) = (1-t)³P₀ + 3(1-t)²tP₁ + 3(1-t)t²P₂ + t³P₃, `t` clamped to [0, 1]
pub fn bezier_position(path: &Boomerang, t: f32) -> Vec2 {
    let t = t.clamp(0.0, 1.0);
    let mt = 1.0 - t;
    mt * mt * mt * path.start
        + 3.0 * mt * mt * t * path.start_control
        + 3.0 * mt * t * t * path.end_control
        + t * t * t * path.end
}

/// Curve tangent B'(t)
pub fn bezier_velocity(path: &Boomerang, t: f32) -> Vec2 {
    let t = t.clamp(0.0, 1.0);
    let mt = 1.0 - t;
    3.0 * mt * mt * (path.start_control - path.start)
        + 6.0 * mt * t * (path.end_control - path.start_control)
        + 3.0 * t * t * (path.end - path.end_control)
}

/// Tangent is in curve units per unit t; scale it down to something sprite-sized
const BOOMERANG_VELOCITY_SCALE: f32 = 0.01;

impl Boomerang {
    /// Advance the flight clock and return (position, velocity) for this tick
    pub fn step(&mut self, elapsed_ms: f32) -> (Vec2, Vec2) {
        self.elapsed_ms += elapsed_ms;
        let mut ratio = self.elapsed_ms / self.duration_ms;
        if ratio >= 1.0 {
            self.reverse = !self.reverse;
            self.elapsed_ms = 0.0;
            ratio = 0.0;
        }

        let t = if self.reverse { 1.0 - ratio } else { ratio };
        let tangent = bezier_velocity(self, t) * BOOMERANG_VELOCITY_SCALE;
        let velocity = if self.reverse { -tangent } else { tangent };
        (bezier_position(self, t), velocity)
    }
}

/// Move every entity one step. Boids are skipped.
pub fn integrate(world: &mut World, elapsed_ms: f32) {
    let dt = elapsed_ms / 1000.0;
    for (_, entity) in world.iter_mut() {
        if entity.boid.is_some() {
            continue;
        }
        if let Some(path) = entity.boomerang.as_mut() {
            let (position, velocity) = path.step(elapsed_ms);
            entity.motion.position = position;
            entity.motion.velocity = velocity;
            continue;
        }
        entity.motion.position += entity.motion.velocity * dt;
    }
}

/// Remove entities that left the world rectangle. The player and the aim
/// indicator are never culled. Returns the removed ids.
pub fn cull_offscreen(world: &mut World) -> Vec<EntityId> {
    let gone: Vec<EntityId> = world
        .iter()
        .filter(|(_, e)| e.player.is_none() && !e.indicator)
        .filter(|(_, e)| {
            let m = &e.motion;
            m.position.x + m.scale.x.abs() < 0.0
                || m.position.x > WORLD_WIDTH_PX
                || m.position.y + m.scale.y.abs() < 0.0
                || m.position.y > WORLD_HEIGHT_PX
        })
        .map(|(id, _)| id)
        .collect();
    for &id in &gone {
        world.despawn(id);
    }
    gone
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::{Entity, Motion, Player};

    fn arc() -> Boomerang {
        Boomerang {
            start: Vec2::new(100.0, 500.0),
            end: Vec2::new(100.0, 500.0),
            start_control: Vec2::new(420.0, 52.0),
            end_control: Vec2::new(-220.0, 52.0),
            elapsed_ms: 0.0,
            duration_ms: 2000.0,
            reverse: false,
        }
    }

    #[test]
    fn test_bezier_endpoints() {
        let path = arc();
        assert_eq!(bezier_position(&path, 0.0), path.start);
        assert_eq!(bezier_position(&path, 1.0), path.end);
        // Clamped
        assert_eq!(bezier_position(&path, -3.0), path.start);
        assert_eq!(bezier_velocity(&path, 0.0), 3.0 * (path.start_control - path.start));
    }

    #[test]
    fn test_boomerang_ping_pongs() {
        let mut path = arc();
        let (p1, v1) = path.step(500.0);
        assert!(!path.reverse);
        assert!(p1.y < 500.0);
        assert_ne!(v1, Vec2::ZERO);

        // Crossing the duration flips direction and restarts the clock
        path.step(1600.0);
        assert!(path.reverse);
        assert_eq!(path.elapsed_ms, 0.0);

        let (p2, _) = path.step(500.0);
        // Same curve point as t = 0.75 going forward
        assert!((p2 - bezier_position(&arc(), 0.75)).length() < 1e-3);
    }

    #[test]
    fn test_linear_integration() {
        let mut world = World::default();
        let id = world.spawn(Entity {
            motion: Motion {
                position: Vec2::new(100.0, 100.0),
                velocity: Vec2::new(100.0, -50.0),
                ..Default::default()
            },
            ..Default::default()
        });
        integrate(&mut world, 500.0);
        assert_eq!(world.motion(id).map(|m| m.position), Some(Vec2::new(150.0, 75.0)));
    }

    #[test]
    fn test_cull_keeps_player() {
        let mut world = World::default();
        let off = Vec2::new(-200.0, 100.0);
        let shot = world.spawn(Entity {
            motion: Motion::at(off, Vec2::splat(30.0)),
            ..Default::default()
        });
        let player = world.spawn(Entity {
            motion: Motion::at(off, Vec2::splat(54.0)),
            player: Some(Player {
                health: 10,
                keys: 0,
                on_ice: false,
            }),
            ..Default::default()
        });
        let inside = world.spawn(Entity {
            motion: Motion::at(Vec2::new(10.0, 10.0), Vec2::splat(30.0)),
            ..Default::default()
        });
        let removed = cull_offscreen(&mut world);
        assert_eq!(removed, vec![shot]);
        assert!(world.contains(player));
        assert!(world.contains(inside));
    }
}
