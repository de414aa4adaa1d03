//! Sniper cats
//!
//! A sniper stares down one row or column. If the player is in that line, on
//! the side it faces, with no wall or locked door in between, and its reload
//! timer has run out, it fires a bullet along its facing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::GridPos;
use super::spawn;
use super::world::{EntityId, Facet, World};
use crate::Direction;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sniper {
    /// Counts down; fires only at or below zero
    pub timer_ms: f32,
    pub direction: Direction,
}

/// Is `blocker` strictly between the sniper and its target on the facing line?
fn blocks_view(blocker: GridPos, sniper: GridPos, target: GridPos, direction: Direction) -> bool {
    match direction {
        Direction::Top => blocker.col == sniper.col && blocker.row < sniper.row && blocker.row > target.row,
        Direction::Bottom => blocker.col == sniper.col && blocker.row > sniper.row && blocker.row < target.row,
        Direction::Left => blocker.row == sniper.row && blocker.col < sniper.col && blocker.col > target.col,
        Direction::Right => blocker.row == sniper.row && blocker.col > sniper.col && blocker.col < target.col,
    }
}

/// Grid-aligned visibility test (not sampled)
pub fn can_see(world: &World, sniper_pos: Vec2, direction: Direction, target_pos: Vec2) -> bool {
    let sniper = GridPos::from_world(sniper_pos);
    let target = GridPos::from_world(target_pos);

    let in_line = match direction {
        Direction::Top => target.col == sniper.col && target.row <= sniper.row,
        Direction::Bottom => target.col == sniper.col && target.row >= sniper.row,
        Direction::Left => target.row == sniper.row && target.col <= sniper.col,
        Direction::Right => target.row == sniper.row && target.col >= sniper.col,
    };
    if !in_line {
        return false;
    }

    !world.iter().any(|(_, e)| {
        let opaque = e.wall.is_some() || e.door.is_some_and(|d| d.locked);
        opaque && blocks_view(GridPos::from_world(e.motion.position), sniper, target, direction)
    })
}

/// Tick reload timers and fire at the first visible player. Returns new bullets.
pub fn update_snipers(world: &mut World, elapsed_ms: f32, settings: &Settings) -> Vec<EntityId> {
    let players: Vec<Vec2> = world
        .iter()
        .filter(|(_, e)| e.has(Facet::Player))
        .map(|(_, e)| e.motion.position)
        .collect();

    let mut shots = Vec::new();
    for id in world.ids_with(Facet::Sniper) {
        let Some(entity) = world.get_mut(id) else {
            continue;
        };
        let position = entity.motion.position;
        let Some(sniper) = entity.sniper.as_mut() else {
            continue;
        };
        sniper.timer_ms -= elapsed_ms;
        if sniper.timer_ms > 0.0 {
            continue;
        }
        let direction = sniper.direction;

        if players.iter().any(|&p| can_see(world, position, direction, p)) {
            let size = settings.sniper_bullet_size;
            let offset = if direction.is_vertical() { 2.0 * size.y } else { 2.0 * size.x };
            let bullet = spawn::sniper_bullet(
                world,
                position + direction.normal() * offset,
                size,
                direction.normal() * settings.sniper_bullet_speed,
                settings.harmful_damage,
            );
            shots.push(bullet);
            if let Some(sniper) = world.get_mut(id).and_then(|e| e.sniper.as_mut()) {
                sniper.timer_ms = settings.sniper_cooldown_ms;
            }
        }
    }
    shots
}
