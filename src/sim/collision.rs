//! Collision detection
//!
//! Runs after motion integration. Every pair of entities with a collision mesh
//! goes through a cheap AABB reject and then an exact outline test; what
//! survives becomes a [`CollisionPair`] for the resolver. Pairs are only valid
//! for the tick that produced them.
//!
//! Detection also reports whether the player is standing close enough to a
//! portal to teleport, which the next tick's input handling consumes.

use glam::Vec2;

use super::mesh::{MeshLibrary, aabb_overlap, polygons_overlap, world_outline};
use super::world::{EntityId, Facet, Motion, World};

/// Two overlapping entities, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub a: EntityId,
    pub b: EntityId,
}

/// The player is within activation range of a portal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalProximity {
    pub player: EntityId,
    pub portal: EntityId,
    /// Wall hosting the portal
    pub wall: EntityId,
}

#[derive(Debug, Clone, Default)]
pub struct DetectionReport {
    pub pairs: Vec<CollisionPair>,
    pub proximity: Option<PortalProximity>,
}

struct Collider {
    id: EntityId,
    motion: Motion,
    outline: Vec<Vec2>,
    /// Walls and traps never move; two of them never need testing
    fixed: bool,
}

/// Find every overlapping pair of collidable entities
pub fn detect_pairs(world: &World, meshes: &MeshLibrary) -> Vec<CollisionPair> {
    let colliders: Vec<Collider> = world
        .iter()
        .filter(|(_, e)| !e.indicator)
        .filter_map(|(id, e)| {
            let mesh = meshes.get(e.mesh?);
            Some(Collider {
                id,
                motion: e.motion,
                outline: world_outline(mesh, &e.motion),
                fixed: e.wall.is_some() || e.mousetrap,
            })
        })
        .collect();

    let mut pairs = Vec::new();
    for (i, first) in colliders.iter().enumerate() {
        for second in &colliders[i + 1..] {
            if first.fixed && second.fixed {
                continue;
            }
            if !aabb_overlap(&first.motion, &second.motion) {
                continue;
            }
            if polygons_overlap(&first.outline, &second.outline) {
                pairs.push(CollisionPair {
                    a: first.id,
                    b: second.id,
                });
            }
        }
    }
    pairs
}

/// First player/portal combination within `radius` of each other. Portals
/// whose wall is gone or no longer flagged are skipped.
pub fn portal_proximity(world: &World, radius: f32) -> Option<PortalProximity> {
    for player in world.ids_with(Facet::Player) {
        let Some(player_pos) = world.motion(player).map(|m| m.position) else {
            continue;
        };
        for (portal, entity) in world.iter().filter(|(_, e)| e.has(Facet::Portal)) {
            let portal_pos = entity.motion.position;
            if (player_pos - portal_pos).length() > radius {
                continue;
            }
            let hosted = world
                .wall_at(portal_pos)
                .filter(|&w| world.get(w).and_then(|e| e.wall).is_some_and(|w| w.has_portal));
            if let Some(wall) = hosted {
                return Some(PortalProximity {
                    player,
                    portal,
                    wall,
                });
            }
        }
    }
    None
}

pub fn detect(world: &World, meshes: &MeshLibrary, activation_radius: f32) -> DetectionReport {
    DetectionReport {
        pairs: detect_pairs(world, meshes),
        proximity: portal_proximity(world, activation_radius),
    }
}
