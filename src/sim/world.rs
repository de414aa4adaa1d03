//! Entity registry
//!
//! Entities are plain structs with optional facets. Handlers ask "does E have
//! facet F" rather than matching on a concrete kind, so anything tagged harmful
//! hurts the player whether it is a cat, a trap or a bullet.
//!
//! Handles are generational (`slotmap`): a handle to a despawned entity simply
//! stops resolving, which is what keeps portal pairings and mid-batch collision
//! records from dangling.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use super::animation::Animation;
use super::boids::Boid;
use super::grid::{GridPos, TileGrid};
use super::mesh::MeshId;
use super::motion::Boomerang;
use super::patrol::Patrol;
use super::sniper::Sniper;
use crate::Direction;
use crate::consts::{CELL_SIZE, GRID_HEIGHT_TILES, GRID_WIDTH_TILES};

new_key_type! {
    /// Stable handle into the [`World`]
    pub struct EntityId;
}

/// Position, orientation and size of anything in the world
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Motion {
    pub position: Vec2,
    /// Degrees
    pub angle: f32,
    /// Pixels per second
    pub velocity: Vec2,
    /// Bounding size; negative components mirror the sprite
    pub scale: Vec2,
}

impl Motion {
    pub fn at(position: Vec2, scale: Vec2) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub health: i32,
    pub keys: u32,
    /// Set by the resolver each tick, read by movement on the next
    pub on_ice: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harmful {
    pub damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Fired by the player; opens portals on walls
    Portal,
    /// Fired by sniper cats; harmful and portal-capable
    Sniper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wall {
    pub has_portal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cheese {
    pub points: u32,
}

/// One end of a portal pair. Sits on the wall cell it was shot into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    /// Face of the wall the portal opens onto
    pub direction: Direction,
    /// Always mutual when set
    pub paired: Option<EntityId>,
}

/// Everything an entity can be. Unused facets stay `None`/`false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub motion: Motion,
    /// Collision outline; entities without one never collide
    pub mesh: Option<MeshId>,

    pub player: Option<Player>,
    pub harmful: Option<Harmful>,
    pub projectile: Option<ProjectileKind>,
    pub boomerang: Option<Boomerang>,
    pub wall: Option<Wall>,
    pub door: Option<Door>,
    pub cheese: Option<Cheese>,
    pub portal: Option<Portal>,
    pub patrol: Option<Patrol>,
    pub sniper: Option<Sniper>,
    pub boid: Option<Boid>,
    pub animation: Option<Animation>,

    pub exit: bool,
    pub key: bool,
    pub ice: bool,
    pub mousetrap: bool,
    pub cat: bool,
    pub explosion: bool,
    /// Aim marker; never collides and survives culling
    pub indicator: bool,
}

/// Capability tags for [`World::has`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Player,
    Harmful,
    /// Any projectile kind
    Projectile,
    PortalShot,
    SniperShot,
    Boomerang,
    Wall,
    Door,
    Exit,
    Key,
    Cheese,
    Ice,
    Mousetrap,
    Portal,
    Patrol,
    Sniper,
    Boid,
    Cat,
    Explosion,
    Indicator,
    Animation,
}

impl Entity {
    pub fn has(&self, facet: Facet) -> bool {
        match facet {
            Facet::Player => self.player.is_some(),
            Facet::Harmful => self.harmful.is_some(),
            Facet::Projectile => self.projectile.is_some(),
            Facet::PortalShot => self.projectile == Some(ProjectileKind::Portal),
            Facet::SniperShot => self.projectile == Some(ProjectileKind::Sniper),
            Facet::Boomerang => self.boomerang.is_some(),
            Facet::Wall => self.wall.is_some(),
            Facet::Door => self.door.is_some(),
            Facet::Exit => self.exit,
            Facet::Key => self.key,
            Facet::Cheese => self.cheese.is_some(),
            Facet::Ice => self.ice,
            Facet::Mousetrap => self.mousetrap,
            Facet::Portal => self.portal.is_some(),
            Facet::Patrol => self.patrol.is_some(),
            Facet::Sniper => self.sniper.is_some(),
            Facet::Boid => self.boid.is_some(),
            Facet::Cat => self.cat,
            Facet::Explosion => self.explosion,
            Facet::Indicator => self.indicator,
            Facet::Animation => self.animation.is_some(),
        }
    }
}

/// The world store for one level: entities plus the walkability grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    entities: SlotMap<EntityId, Entity>,
    pub grid: TileGrid,
}

impl Default for World {
    fn default() -> Self {
        Self::new(TileGrid::new(GRID_WIDTH_TILES, GRID_HEIGHT_TILES))
    }
}

impl World {
    pub fn new(grid: TileGrid) -> Self {
        Self {
            entities: SlotMap::with_key(),
            grid,
        }
    }

    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        self.entities.insert(entity)
    }

    /// Remove an entity. A paired portal's partner loses its pairing.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(id)?;
        if let Some(partner) = entity.portal.and_then(|p| p.paired) {
            if let Some(portal) = self.get_mut(partner).and_then(|e| e.portal.as_mut()) {
                portal.paired = None;
            }
        }
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// False for stale handles
    pub fn has(&self, id: EntityId, facet: Facet) -> bool {
        self.get(id).is_some_and(|e| e.has(facet))
    }

    pub fn motion(&self, id: EntityId) -> Option<&Motion> {
        self.get(id).map(|e| &e.motion)
    }

    pub fn motion_mut(&mut self, id: EntityId) -> Option<&mut Motion> {
        self.get_mut(id).map(|e| &mut e.motion)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Stable slot order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.entities.iter_mut()
    }

    /// Snapshot of every id carrying a facet (safe to mutate the world while walking it)
    pub fn ids_with(&self, facet: Facet) -> Vec<EntityId> {
        self.iter()
            .filter(|(_, e)| e.has(facet))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn count(&self, facet: Facet) -> usize {
        self.iter().filter(|(_, e)| e.has(facet)).count()
    }

    pub fn first_with(&self, facet: Facet) -> Option<EntityId> {
        self.iter().find(|(_, e)| e.has(facet)).map(|(id, _)| id)
    }

    /// Pair two portals both ways
    pub fn link_portals(&mut self, a: EntityId, b: EntityId) {
        if !self.has(a, Facet::Portal) || !self.has(b, Facet::Portal) {
            log::warn!("Refusing to link non-portal entities");
            return;
        }
        for (this, other) in [(a, b), (b, a)] {
            if let Some(portal) = self.get_mut(this).and_then(|e| e.portal.as_mut()) {
                portal.paired = Some(other);
            }
        }
    }

    /// The live partner of a portal, if any
    pub fn paired_portal(&self, portal: EntityId) -> Option<EntityId> {
        self.get(portal)
            .and_then(|e| e.portal)
            .and_then(|p| p.paired)
            .filter(|&other| self.has(other, Facet::Portal))
    }

    /// Remove every portal and free the walls they occupied
    pub fn clear_portals(&mut self) -> usize {
        let portals = self.ids_with(Facet::Portal);
        for &id in &portals {
            self.entities.remove(id);
        }
        for (_, entity) in self.iter_mut() {
            if let Some(wall) = entity.wall.as_mut() {
                wall.has_portal = false;
            }
        }
        portals.len()
    }

    /// Wall whose centre is exactly `position`
    pub fn wall_at(&self, position: Vec2) -> Option<EntityId> {
        self.iter()
            .find(|(_, e)| e.wall.is_some() && e.motion.position == position)
            .map(|(id, _)| id)
    }

    pub fn wall_in_cell(&self, cell: GridPos) -> Option<EntityId> {
        self.wall_at(cell.to_world())
    }

    /// Portal sitting on the wall centred at `position`
    pub fn portal_at(&self, position: Vec2) -> Option<EntityId> {
        self.iter()
            .find(|(_, e)| e.portal.is_some() && e.motion.position == position)
            .map(|(id, _)| id)
    }

    /// Drop every entity (grid is kept)
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

/// Centre of the neighbouring cell along a facing, in world space
pub fn step_out(position: Vec2, direction: Direction) -> Vec2 {
    position + direction.normal() * CELL_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal(direction: Direction) -> Entity {
        Entity {
            portal: Some(Portal {
                direction,
                paired: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_is_mutual() {
        let mut world = World::default();
        let a = world.spawn(portal(Direction::Left));
        let b = world.spawn(portal(Direction::Top));
        world.link_portals(a, b);
        assert_eq!(world.paired_portal(a), Some(b));
        assert_eq!(world.paired_portal(b), Some(a));
    }

    #[test]
    fn test_despawn_clears_partner() {
        let mut world = World::default();
        let a = world.spawn(portal(Direction::Left));
        let b = world.spawn(portal(Direction::Top));
        world.link_portals(a, b);
        world.despawn(a);
        assert!(!world.contains(a));
        assert_eq!(world.get(b).and_then(|e| e.portal).and_then(|p| p.paired), None);
        assert_eq!(world.paired_portal(b), None);
    }

    #[test]
    fn test_stale_handle_has_nothing() {
        let mut world = World::default();
        let id = world.spawn(Entity {
            key: true,
            ..Default::default()
        });
        assert!(world.has(id, Facet::Key));
        world.despawn(id);
        assert!(!world.has(id, Facet::Key));
        // Slot reuse does not resurrect the old handle
        let other = world.spawn(Entity {
            key: true,
            ..Default::default()
        });
        assert!(world.has(other, Facet::Key));
        assert!(!world.has(id, Facet::Key));
    }

    #[test]
    fn test_clear_portals_frees_walls() {
        let mut world = World::default();
        let wall = world.spawn(Entity {
            wall: Some(Wall { has_portal: true }),
            ..Default::default()
        });
        let a = world.spawn(portal(Direction::Left));
        let b = world.spawn(portal(Direction::Right));
        world.link_portals(a, b);

        assert_eq!(world.clear_portals(), 2);
        assert_eq!(world.count(Facet::Portal), 0);
        assert_eq!(world.get(wall).and_then(|e| e.wall), Some(Wall { has_portal: false }));
    }

    #[test]
    fn test_projectile_facets() {
        let shot = Entity {
            projectile: Some(ProjectileKind::Sniper),
            ..Default::default()
        };
        assert!(shot.has(Facet::Projectile));
        assert!(shot.has(Facet::SniperShot));
        assert!(!shot.has(Facet::PortalShot));
    }

    #[test]
    fn test_step_out() {
        let p = Vec2::new(96.0, 96.0);
        assert_eq!(step_out(p, Direction::Top), Vec2::new(96.0, 32.0));
        assert_eq!(step_out(p, Direction::Right), Vec2::new(160.0, 96.0));
    }
}
