//! Flocking cats
//!
//! Classic separation / alignment / cohesion plus a wander term. Neighbour
//! lookup is a linear scan over every boid; flocks are a few dozen at most.
//!
//! Boids integrate their own position here (the shared integrator skips them)
//! because containment has to run on the freshly moved position.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::world::{EntityId, Facet, World};
use crate::consts::{WORLD_HEIGHT_PX, WORLD_WIDTH_PX};
use crate::limit;
use crate::settings::BoidSettings;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Boid {
    /// Random-walk heading on the wander circle (radians)
    pub wander_angle: f32,
}

/// Steer toward `target` at full speed, capped to the max force
fn seek(position: Vec2, velocity: Vec2, target: Vec2, cfg: &BoidSettings) -> Vec2 {
    let desired = (target - position).normalize_or_zero() * cfg.max_speed;
    limit(desired - velocity, cfg.max_force)
}

#[derive(Debug, Clone, Copy)]
struct Member {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
}

fn separation(me: &Member, neighbors: &[Member], cfg: &BoidSettings) -> Vec2 {
    let mut steer = Vec2::ZERO;
    let mut count = 0;
    for other in neighbors {
        let diff = me.position - other.position;
        let distance = diff.length();
        if distance > 0.0 && distance < cfg.separation_radius {
            steer += diff.normalize() / distance;
            count += 1;
        }
    }
    if count > 0 {
        steer /= count as f32;
    }
    if steer.length() > 0.0 {
        limit(steer.normalize() * cfg.max_speed - me.velocity, cfg.max_force)
    } else {
        steer
    }
}

fn alignment(me: &Member, neighbors: &[Member], cfg: &BoidSettings) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let average = neighbors.iter().map(|n| n.velocity).sum::<Vec2>() / neighbors.len() as f32;
    let desired = average.normalize_or_zero() * cfg.max_speed;
    limit(desired - me.velocity, cfg.max_force)
}

fn cohesion(me: &Member, neighbors: &[Member], cfg: &BoidSettings) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let centroid = neighbors.iter().map(|n| n.position).sum::<Vec2>() / neighbors.len() as f32;
    seek(me.position, me.velocity, centroid, cfg)
}

fn wander(velocity: Vec2, wander_angle: f32, cfg: &BoidSettings) -> Vec2 {
    let mut ahead = velocity.normalize_or_zero();
    if ahead.length() < 0.01 {
        ahead = Vec2::X;
    }
    let circle_center = ahead * cfg.wander_distance;
    let displacement = Vec2::from_angle(wander_angle) * cfg.wander_radius;
    limit(circle_center + displacement, cfg.max_force)
}

/// Wrap at the true world edge, then bounce off the inset padding
fn contain(position: &mut Vec2, velocity: &mut Vec2, cfg: &BoidSettings) {
    let size = Vec2::new(WORLD_WIDTH_PX, WORLD_HEIGHT_PX);
    for axis in 0..2 {
        if position[axis] < 0.0 {
            position[axis] += size[axis];
        }
        if position[axis] > size[axis] {
            position[axis] -= size[axis];
        }

        let pad = cfg.edge_padding;
        if position[axis] < pad {
            position[axis] = pad;
            velocity[axis] = velocity[axis].abs() * cfg.bounce_damping;
        } else if position[axis] > size[axis] - pad {
            position[axis] = size[axis] - pad;
            velocity[axis] = -velocity[axis].abs() * cfg.bounce_damping;
        }
    }
}

/// Steer, move and contain every boid
pub fn update_boids(world: &mut World, elapsed_ms: f32, cfg: &BoidSettings, rng: &mut impl Rng) {
    let dt = elapsed_ms / 1000.0;

    // Everyone steers off the same snapshot so update order doesn't matter
    let flock: Vec<Member> = world
        .iter()
        .filter(|(_, e)| e.has(Facet::Boid))
        .map(|(id, e)| Member {
            id,
            position: e.motion.position,
            velocity: e.motion.velocity,
        })
        .collect();

    for me in &flock {
        let neighbors: Vec<Member> = flock
            .iter()
            .filter(|o| o.id != me.id && (o.position - me.position).length() < cfg.neighbor_radius)
            .copied()
            .collect();

        let Some(entity) = world.get_mut(me.id) else {
            continue;
        };
        let Some(boid) = entity.boid.as_mut() else {
            continue;
        };
        boid.wander_angle += rng.random_range(-cfg.wander_jitter..=cfg.wander_jitter);

        let force = separation(me, &neighbors, cfg) * cfg.separation_weight
            + alignment(me, &neighbors, cfg) * cfg.alignment_weight
            + cohesion(me, &neighbors, cfg) * cfg.cohesion_weight
            + wander(me.velocity, boid.wander_angle, cfg) * cfg.wander_weight;

        let motion = &mut entity.motion;
        motion.velocity = limit(motion.velocity + force, cfg.max_speed);
        motion.position += motion.velocity * dt;
        if motion.velocity.length() > 0.001 {
            motion.angle = motion.velocity.y.atan2(motion.velocity.x).to_degrees();
        }
        contain(&mut motion.position, &mut motion.velocity, cfg);
    }
}
