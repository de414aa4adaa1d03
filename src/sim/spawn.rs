//! Entity constructors
//!
//! One function per thing that can exist in a level. Cell-based constructors
//! centre the entity on the cell.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::animation::{Animation, Clip};
use super::boids::Boid;
use super::grid::GridPos;
use super::mesh::MeshId;
use super::motion::Boomerang;
use super::patrol::Patrol;
use super::sniper::Sniper;
use super::world::{
    Cheese, Door, Entity, EntityId, Harmful, Motion, Player, Portal, ProjectileKind, Wall, World,
};
use crate::Direction;
use crate::consts::{
    BOID_SIZE, BOOMERANG_SIZE, CELL_SIZE, EXPLOSION_SIZE, INDICATOR_SIZE, PLAYER_BB_SIZE,
};
use crate::settings::Settings;

fn cell_motion(cell: GridPos) -> Motion {
    Motion::at(cell.to_world(), Vec2::splat(CELL_SIZE))
}

/// Full-cell static tile with the square outline
fn tile(cell: GridPos) -> Entity {
    Entity {
        motion: cell_motion(cell),
        mesh: Some(MeshId::Square),
        ..Default::default()
    }
}

pub fn player(world: &mut World, position: Vec2, settings: &Settings) -> EntityId {
    world.spawn(Entity {
        motion: Motion::at(position, Vec2::splat(PLAYER_BB_SIZE)),
        mesh: Some(MeshId::Mouse),
        player: Some(Player {
            health: settings.player_health,
            keys: 0,
            on_ice: false,
        }),
        animation: Some(Animation::looping(Clip::MouseIdle)),
        ..Default::default()
    })
}

/// Aim marker orbiting the player. No mesh: never collides.
pub fn indicator(world: &mut World, position: Vec2) -> EntityId {
    world.spawn(Entity {
        motion: Motion::at(position, Vec2::splat(INDICATOR_SIZE)),
        indicator: true,
        ..Default::default()
    })
}

pub fn wall(world: &mut World, cell: GridPos) -> EntityId {
    world.spawn(Entity {
        wall: Some(Wall::default()),
        ..tile(cell)
    })
}

/// Starts locked
pub fn door(world: &mut World, cell: GridPos) -> EntityId {
    world.spawn(Entity {
        door: Some(Door { locked: true }),
        ..tile(cell)
    })
}

pub fn exit(world: &mut World, cell: GridPos) -> EntityId {
    world.spawn(Entity {
        exit: true,
        ..tile(cell)
    })
}

pub fn key(world: &mut World, cell: GridPos) -> EntityId {
    world.spawn(Entity {
        key: true,
        ..tile(cell)
    })
}

pub fn ice(world: &mut World, cell: GridPos) -> EntityId {
    world.spawn(Entity {
        ice: true,
        ..tile(cell)
    })
}

pub fn cheese(world: &mut World, cell: GridPos, points: u32) -> EntityId {
    world.spawn(Entity {
        cheese: Some(Cheese { points }),
        mesh: Some(MeshId::Trap),
        ..tile(cell)
    })
}

pub fn mousetrap(world: &mut World, cell: GridPos, damage: i32) -> EntityId {
    world.spawn(Entity {
        mousetrap: true,
        harmful: Some(Harmful { damage }),
        mesh: Some(MeshId::Trap),
        ..tile(cell)
    })
}

pub fn sniper_cat(world: &mut World, cell: GridPos, direction: Direction, settings: &Settings) -> EntityId {
    let mut motion = cell_motion(cell);
    motion.angle = direction.angle_degrees();
    world.spawn(Entity {
        motion,
        mesh: Some(MeshId::Square),
        sniper: Some(Sniper {
            timer_ms: settings.sniper_cooldown_ms,
            direction,
        }),
        harmful: Some(Harmful {
            damage: settings.harmful_damage,
        }),
        cat: true,
        ..Default::default()
    })
}

/// Patrol cat standing on the first waypoint
pub fn patrol_cat(world: &mut World, waypoints: Vec<Vec2>, settings: &Settings) -> EntityId {
    let start = waypoints.first().copied().unwrap_or_default();
    world.spawn(Entity {
        motion: Motion::at(start, Vec2::splat(CELL_SIZE)),
        mesh: Some(MeshId::Trap),
        patrol: Some(Patrol::new(waypoints)),
        harmful: Some(Harmful {
            damage: settings.harmful_damage,
        }),
        cat: true,
        animation: Some(Animation::looping(Clip::CatWest)),
        ..Default::default()
    })
}

pub fn boid(world: &mut World, position: Vec2, velocity: Vec2, damage: i32) -> EntityId {
    world.spawn(Entity {
        motion: Motion {
            velocity,
            ..Motion::at(position, Vec2::splat(BOID_SIZE))
        },
        mesh: Some(MeshId::Square),
        boid: Some(Boid::default()),
        harmful: Some(Harmful { damage }),
        cat: true,
        ..Default::default()
    })
}

/// Scatter `count` boids uniformly (by angle and radius) around `center`
pub fn flock(
    world: &mut World,
    center: Vec2,
    radius: f32,
    count: usize,
    damage: i32,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    (0..count)
        .map(|_| {
            let angle = rng.random_range(0.0..TAU);
            let r = if radius > 0.0 { rng.random_range(0.0..radius) } else { 0.0 };
            let position = center + Vec2::from_angle(angle) * r;
            let velocity = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)) * 50.0;
            boid(world, position, velocity, damage)
        })
        .collect()
}

pub fn portal_bullet(world: &mut World, position: Vec2, size: Vec2, velocity: Vec2) -> EntityId {
    world.spawn(Entity {
        motion: Motion {
            velocity,
            ..Motion::at(position, size)
        },
        mesh: Some(MeshId::Bubble),
        projectile: Some(ProjectileKind::Portal),
        ..Default::default()
    })
}

pub fn sniper_bullet(world: &mut World, position: Vec2, size: Vec2, velocity: Vec2, damage: i32) -> EntityId {
    world.spawn(Entity {
        motion: Motion {
            velocity,
            ..Motion::at(position, size)
        },
        mesh: Some(MeshId::Square),
        projectile: Some(ProjectileKind::Sniper),
        harmful: Some(Harmful { damage }),
        ..Default::default()
    })
}

/// Boomerang looping up and out of its cell: controls sit 5 cells to either
/// side and 7 cells above
pub fn boomerang(world: &mut World, cell: GridPos, settings: &Settings) -> EntityId {
    let home = cell.to_world();
    let path = Boomerang {
        start: home,
        end: home,
        start_control: home + Vec2::new(5.0, -7.0) * CELL_SIZE,
        end_control: home + Vec2::new(-5.0, -7.0) * CELL_SIZE,
        elapsed_ms: 0.0,
        duration_ms: settings.boomerang_duration_ms,
        reverse: false,
    };
    world.spawn(Entity {
        motion: Motion::at(home, Vec2::splat(BOOMERANG_SIZE)),
        mesh: Some(MeshId::Bubble),
        boomerang: Some(path),
        harmful: Some(Harmful {
            damage: settings.harmful_damage,
        }),
        ..Default::default()
    })
}

/// Portal on a wall, optionally paired with an existing one
pub fn portal(
    world: &mut World,
    position: Vec2,
    scale: Vec2,
    direction: Direction,
    pair_with: Option<EntityId>,
) -> EntityId {
    let id = world.spawn(Entity {
        motion: Motion::at(position, scale),
        mesh: Some(MeshId::Square),
        portal: Some(Portal {
            direction,
            paired: None,
        }),
        ..Default::default()
    });
    if let Some(other) = pair_with {
        world.link_portals(id, other);
    }
    id
}

pub fn explosion(world: &mut World, position: Vec2) -> EntityId {
    world.spawn(Entity {
        motion: Motion::at(position, Vec2::splat(EXPLOSION_SIZE)),
        explosion: true,
        animation: Some(Animation::once(Clip::Explosion)),
        ..Default::default()
    })
}
