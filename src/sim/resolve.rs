//! Collision response
//!
//! Each detected pair runs through a fixed list of handlers. A handler fires
//! when the pair carries the facets it cares about, in either order, so one
//! pair can trigger several. Once the player dies or reaches the exit the rest
//! of the batch is dropped: those entities are gone or about to be replaced.

use glam::Vec2;

use super::collision::CollisionPair;
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState};
use super::world::{EntityId, Facet, ProjectileKind, World, step_out};
use crate::Direction;
use crate::consts::CELL_SIZE;

/// How a handler (or the whole batch) ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    PlayerDied,
    LevelExited,
}

/// Corner lookups may hop to a neighbouring wall at most this many times
const MAX_CORNER_REDIRECTS: u32 = 2;

/// Axis penetrations closer than this (px) count as a corner hit
const CORNER_WINDOW: i32 = 6;

/// Order the pair so the first id has `first` and the second has `second`
fn match_pair(world: &World, pair: CollisionPair, first: Facet, second: Facet) -> Option<(EntityId, EntityId)> {
    if world.has(pair.a, first) && world.has(pair.b, second) {
        Some((pair.a, pair.b))
    } else if world.has(pair.b, first) && world.has(pair.a, second) {
        Some((pair.b, pair.a))
    } else {
        None
    }
}

/// Minimum-translation push of `mover` out of `block` along one axis.
/// Ties go to X.
pub fn push_out(world: &mut World, mover: EntityId, block: EntityId) {
    let Some(block_motion) = world.motion(block).copied() else {
        return;
    };
    let Some(motion) = world.motion_mut(mover) else {
        return;
    };
    let (p, s) = (motion.position, motion.scale);
    let (bp, bs) = (block_motion.position, block_motion.scale);

    let overlap_x = (p.x + s.x / 2.0 - (bp.x - bs.x / 2.0)).min(bp.x + bs.x / 2.0 - (p.x - s.x / 2.0));
    let overlap_y = (p.y + s.y / 2.0 - (bp.y - bs.y / 2.0)).min(bp.y + bs.y / 2.0 - (p.y - s.y / 2.0));

    if overlap_x <= overlap_y {
        motion.position.x += if p.x < bp.x { -overlap_x } else { overlap_x };
    } else {
        motion.position.y += if p.y < bp.y { -overlap_y } else { overlap_y };
    }
}

/// Which face of the wall at `wall_pos` did something at `other` hit?
///
/// Near a corner the raw displacement is ambiguous, so neighbouring walls decide:
/// a wall flanked above and below can only be hit from the side, and so on.
/// Fully surrounded walls defer to the nearest neighbour.
pub fn wall_face(world: &World, wall_pos: Vec2, wall_scale: Vec2, other: Vec2) -> Direction {
    wall_face_bounded(world, wall_pos, wall_scale, other, MAX_CORNER_REDIRECTS)
}

fn wall_face_bounded(world: &World, wall_pos: Vec2, wall_scale: Vec2, other: Vec2, redirects: u32) -> Direction {
    let half = wall_scale / 2.0;
    let dx = other.x - wall_pos.x;
    let dy = other.y - wall_pos.y;
    // Whole pixels, truncated toward zero
    let abs_dx = (dx.abs() - half.x) as i32;
    let abs_dy = (dy.abs() - half.y) as i32;

    if (abs_dx - abs_dy).abs() < CORNER_WINDOW {
        let neighbours = [
            wall_pos + Vec2::new(-CELL_SIZE, 0.0),
            wall_pos + Vec2::new(CELL_SIZE, 0.0),
            wall_pos + Vec2::new(0.0, -CELL_SIZE),
            wall_pos + Vec2::new(0.0, CELL_SIZE),
        ];
        let [left, right, top, bottom] = neighbours.map(|p| world.wall_at(p).is_some());

        if left && right && top && bottom && redirects > 0 {
            let mut nearest = neighbours[0];
            for candidate in &neighbours[1..] {
                if (*candidate - other).length() < (nearest - other).length() {
                    nearest = *candidate;
                }
            }
            return wall_face_bounded(world, nearest, wall_scale, other, redirects - 1);
        }

        if top && bottom {
            return if left {
                Direction::Right
            } else if right {
                Direction::Left
            } else if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            };
        }

        if left && right {
            return if top {
                Direction::Bottom
            } else if bottom {
                Direction::Top
            } else if dy > 0.0 {
                Direction::Bottom
            } else {
                Direction::Top
            };
        }
    }

    if abs_dx > abs_dy {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Bottom
    } else {
        Direction::Top
    }
}

fn player_wall(state: &mut GameState, pair: CollisionPair) {
    if let Some((player, wall)) = match_pair(&state.world, pair, Facet::Player, Facet::Wall) {
        push_out(&mut state.world, player, wall);
    }
}

/// Projectiles hitting walls: travel through an existing portal pair, open a
/// new portal, or just stop
fn projectile_wall(state: &mut GameState, pair: CollisionPair) {
    let Some((shot, wall)) = match_pair(&state.world, pair, Facet::Projectile, Facet::Wall) else {
        return;
    };
    let (Some(shot_entity), Some(wall_entity)) = (state.world.get(shot), state.world.get(wall)) else {
        return;
    };
    let kind = shot_entity.projectile;
    let shot_motion = shot_entity.motion;
    let damage = shot_entity.harmful.map(|h| h.damage).unwrap_or(state.settings.harmful_damage);
    let wall_motion = wall_entity.motion;
    let has_portal = wall_entity.wall.is_some_and(|w| w.has_portal);

    if has_portal {
        let exit = state
            .world
            .portal_at(wall_motion.position)
            .and_then(|portal| state.world.paired_portal(portal))
            .and_then(|partner| state.world.get(partner))
            .and_then(|e| Some((e.motion.position, e.portal?.direction)));

        match (kind, exit) {
            (Some(ProjectileKind::Sniper), Some((partner_pos, facing))) => {
                let speed = state.settings.sniper_bullet_speed;
                let bullet = spawn::sniper_bullet(
                    &mut state.world,
                    step_out(partner_pos, facing),
                    shot_motion.scale,
                    facing.normal() * speed,
                    damage,
                );
                log::debug!("Sniper bullet re-emitted through portal as {bullet:?}, facing {facing:?}");
            }
            (Some(ProjectileKind::Sniper), None) => {
                log::warn!("Sniper bullet hit an unpaired portal; dropping it");
            }
            _ => {}
        }
        state.world.despawn(shot);
        return;
    }

    if kind == Some(ProjectileKind::Portal) && state.portal_charge > 0 {
        let facing = wall_face(&state.world, wall_motion.position, wall_motion.scale, shot_motion.position);
        let open = state.opening_portal.filter(|&p| state.world.has(p, Facet::Portal));
        let portal = spawn::portal(&mut state.world, wall_motion.position, wall_motion.scale, facing, open);
        // The first of a pair waits for its partner; the second closes the slot
        state.opening_portal = match open {
            Some(_) => None,
            None => Some(portal),
        };
        state.portal_charge -= 1;
        if let Some(w) = state.world.get_mut(wall).and_then(|e| e.wall.as_mut()) {
            w.has_portal = true;
        }
        log::debug!("Portal opened facing {facing:?}, {} charge(s) left", state.portal_charge);
        state.events.push(GameEvent::PortalPlaced {
            direction: facing,
            paired: open.is_some(),
        });
    }

    state.world.despawn(shot);
}

fn projectile_door(state: &mut GameState, pair: CollisionPair) {
    if let Some((shot, door)) = match_pair(&state.world, pair, Facet::Projectile, Facet::Door) {
        if state.world.get(door).and_then(|e| e.door).is_some_and(|d| d.locked) {
            state.world.despawn(shot);
        }
    }
}

fn projectile_exit(state: &mut GameState, pair: CollisionPair) {
    if let Some((shot, _)) = match_pair(&state.world, pair, Facet::Projectile, Facet::Exit) {
        state.world.despawn(shot);
    }
}

fn player_ice(state: &GameState, pair: CollisionPair, on_ice: &mut bool) {
    if match_pair(&state.world, pair, Facet::Player, Facet::Ice).is_some() {
        *on_ice = true;
    }
}

fn player_key(state: &mut GameState, pair: CollisionPair) {
    let Some((player, key)) = match_pair(&state.world, pair, Facet::Player, Facet::Key) else {
        return;
    };
    if let Some(p) = state.world.get_mut(player).and_then(|e| e.player.as_mut()) {
        p.keys += 1;
        let keys = p.keys;
        state.world.despawn(key);
        log::debug!("Key collected ({keys} held)");
        state.events.push(GameEvent::KeyCollected { keys });
    }
}

fn player_door(state: &mut GameState, pair: CollisionPair) {
    let Some((player, door)) = match_pair(&state.world, pair, Facet::Player, Facet::Door) else {
        return;
    };
    if !state.world.get(door).and_then(|e| e.door).is_some_and(|d| d.locked) {
        return;
    }
    let keys = state.world.get(player).and_then(|e| e.player).map_or(0, |p| p.keys);
    if keys > 0 {
        if let Some(p) = state.world.get_mut(player).and_then(|e| e.player.as_mut()) {
            p.keys -= 1;
        }
        if let Some(d) = state.world.get_mut(door).and_then(|e| e.door.as_mut()) {
            d.locked = false;
        }
        log::debug!("Door unlocked");
        state.events.push(GameEvent::DoorUnlocked);
    } else {
        push_out(&mut state.world, player, door);
    }
}

fn player_cheese(state: &mut GameState, pair: CollisionPair) {
    let Some((_, cheese)) = match_pair(&state.world, pair, Facet::Player, Facet::Cheese) else {
        return;
    };
    let Some(points) = state.world.get(cheese).and_then(|e| e.cheese).map(|c| c.points) else {
        return;
    };
    state.level_points += points;
    state.world.despawn(cheese);
    log::debug!("Cheese collected (+{points})");
    state.events.push(GameEvent::CheeseCollected { points });
}

fn sniper_shot_cat(state: &mut GameState, pair: CollisionPair) {
    let Some((shot, cat)) = match_pair(&state.world, pair, Facet::SniperShot, Facet::Cat) else {
        return;
    };
    if let Some(position) = state.world.motion(cat).map(|m| m.position) {
        spawn::explosion(&mut state.world, position);
    }
    state.world.despawn(shot);
    state.world.despawn(cat);
    state.events.push(GameEvent::CatKilled);
}

fn portal_shot_cat(state: &mut GameState, pair: CollisionPair) {
    if let Some((shot, _)) = match_pair(&state.world, pair, Facet::PortalShot, Facet::Cat) {
        state.world.despawn(shot);
    }
}

fn player_harmful(state: &mut GameState, pair: CollisionPair) -> Outcome {
    let Some((player, hazard)) = match_pair(&state.world, pair, Facet::Player, Facet::Harmful) else {
        return Outcome::Continue;
    };
    let damage = state.world.get(hazard).and_then(|e| e.harmful).map_or(0, |h| h.damage);
    let Some(entity) = state.world.get_mut(player) else {
        return Outcome::Continue;
    };
    let position = entity.motion.position;
    let Some(p) = entity.player.as_mut() else {
        return Outcome::Continue;
    };
    p.health -= damage;
    let health = p.health;
    state.events.push(GameEvent::DamageDealt { damage, health });

    if health > 0 {
        return Outcome::Continue;
    }

    spawn::explosion(&mut state.world, position);
    state.world.despawn(player);
    if let Some(indicator) = state.indicator.take() {
        state.world.despawn(indicator);
    }
    state.player = None;
    state.phase = GamePhase::Dead;
    log::info!("Player died on level {}", state.level_index);
    state.events.push(GameEvent::PlayerDied);
    Outcome::PlayerDied
}

fn player_exit(state: &GameState, pair: CollisionPair) -> Outcome {
    if match_pair(&state.world, pair, Facet::Player, Facet::Exit).is_some() {
        Outcome::LevelExited
    } else {
        Outcome::Continue
    }
}

/// Run every handler over every pair, in order. Updates the player's ice flag
/// unless the batch ended early.
pub fn resolve(state: &mut GameState, pairs: &[CollisionPair]) -> Outcome {
    let mut on_ice = false;

    for &pair in pairs {
        // Either side may have been removed by an earlier pair
        if !state.world.contains(pair.a) || !state.world.contains(pair.b) {
            continue;
        }

        player_wall(state, pair);
        projectile_wall(state, pair);
        projectile_door(state, pair);
        projectile_exit(state, pair);
        player_ice(state, pair, &mut on_ice);
        player_key(state, pair);
        player_door(state, pair);
        player_cheese(state, pair);
        sniper_shot_cat(state, pair);
        portal_shot_cat(state, pair);

        let outcome = player_harmful(state, pair);
        if outcome != Outcome::Continue {
            return outcome;
        }
        let outcome = player_exit(state, pair);
        if outcome != Outcome::Continue {
            return outcome;
        }
    }

    if let Some(p) = state
        .player
        .and_then(|id| state.world.get_mut(id))
        .and_then(|e| e.player.as_mut())
    {
        p.on_ice = on_ice;
    }
    Outcome::Continue
}
