//! Patrol cats
//!
//! Each patrol cat walks its A* route back and forth. When the player comes
//! within range with a clear line of sight it gives chase; once the player is
//! lost it walks back to the waypoint it left and resumes the route there.
//!
//! Behaviour only sets velocity. Position is advanced by the motion integrator.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{Facet, World};
use crate::consts::CELL_SIZE;
use crate::settings::Settings;

/// Derived view of the patrol flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolMode {
    Patrolling,
    Chasing,
    Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub waypoints: Vec<Vec2>,
    /// Always a valid index into `waypoints` (0 when empty)
    pub current_target: usize,
    /// Walking the route backwards
    pub reversing: bool,
    /// Chasing, or returning from a chase
    pub chasing: bool,
    /// Waypoint to return to after a chase
    pub last_target: usize,
    /// Where the chase started
    pub last_position: Vec2,
}

impl Patrol {
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        let start = waypoints.first().copied().unwrap_or_default();
        Self {
            waypoints,
            current_target: 0,
            reversing: false,
            chasing: false,
            last_target: 0,
            last_position: start,
        }
    }

    pub fn mode(&self, player_in_sight: bool) -> PatrolMode {
        match (self.chasing, player_in_sight) {
            (true, true) => PatrolMode::Chasing,
            (true, false) => PatrolMode::Returning,
            (false, _) => PatrolMode::Patrolling,
        }
    }

    /// Step to the next waypoint, bouncing at either end of the route
    pub fn advance_waypoint(&mut self) {
        let last = self.waypoints.len().saturating_sub(1);
        if last == 0 {
            self.current_target = 0;
            return;
        }
        if !self.reversing {
            if self.current_target < last {
                self.current_target += 1;
            } else {
                self.reversing = true;
                self.current_target -= 1;
            }
        } else if self.current_target > 0 {
            self.current_target -= 1;
        } else {
            self.reversing = false;
            self.current_target += 1;
        }
    }
}

/// Sampled ray from `from` to `to`; blocked if any sample lands inside a wall box
pub fn line_of_sight_blocked(world: &World, from: Vec2, to: Vec2, steps: u32) -> bool {
    let steps = steps.max(1);
    let step = (to - from) / steps as f32;
    let walls: Vec<(Vec2, Vec2)> = world
        .iter()
        .filter(|(_, e)| e.has(Facet::Wall))
        .map(|(_, e)| (e.motion.position, e.motion.scale / 2.0))
        .collect();

    (0..=steps).any(|i| {
        let p = from + step * i as f32;
        walls.iter().any(|&(centre, half)| {
            p.x >= centre.x - half.x
                && p.x <= centre.x + half.x
                && p.y >= centre.y - half.y
                && p.y <= centre.y + half.y
        })
    })
}

/// Update every patrol cat's chase state and velocity
pub fn update_patrols(world: &mut World, settings: &Settings) {
    let patrols = world.ids_with(Facet::Patrol);
    let players: Vec<Vec2> = world
        .iter()
        .filter(|(_, e)| e.has(Facet::Player))
        .map(|(_, e)| e.motion.position)
        .collect();

    if players.is_empty() {
        for id in patrols {
            if let Some(motion) = world.motion_mut(id) {
                motion.velocity = Vec2::ZERO;
            }
        }
        return;
    }

    let range = settings.patrol_range;
    let arrival = settings.patrol_arrival_threshold;
    let snap = settings.patrol_snap_threshold;
    let min_movement = settings.patrol_min_movement;

    for id in patrols {
        let Some(position) = world.motion(id).map(|m| m.position) else {
            continue;
        };
        let in_sight = players.iter().copied().find(|&player| {
            let tiles = (player - position).abs() / CELL_SIZE;
            tiles.x <= range
                && tiles.y <= range
                && !line_of_sight_blocked(world, position, player, settings.patrol_sight_steps)
        });

        let Some(entity) = world.get_mut(id) else {
            continue;
        };
        let motion = &mut entity.motion;
        let Some(patrol) = entity.patrol.as_mut() else {
            continue;
        };
        if patrol.waypoints.is_empty() {
            motion.velocity = Vec2::ZERO;
            continue;
        }

        let mut direction = Vec2::ZERO;
        match (patrol.mode(in_sight.is_some()), in_sight) {
            (PatrolMode::Patrolling, Some(player)) | (PatrolMode::Chasing, Some(player)) => {
                if !patrol.chasing {
                    patrol.last_position = motion.position;
                    patrol.last_target = patrol.current_target;
                    patrol.chasing = true;
                }
                let to_player = player - motion.position;
                if to_player.length() > min_movement {
                    direction = to_player.normalize();
                }
            }
            (PatrolMode::Returning, _) => {
                let home = patrol.waypoints[patrol.last_target];
                let to_home = home - motion.position;
                if to_home.length() > arrival {
                    direction = to_home.normalize();
                } else {
                    motion.position = home;
                    patrol.current_target = patrol.last_target;
                    patrol.chasing = false;
                }
            }
            _ => {
                let target = patrol.waypoints[patrol.current_target];
                let to_target = target - motion.position;
                let distance = to_target.length();
                if distance > min_movement {
                    direction = to_target.normalize();
                }
                if distance < arrival {
                    if distance < snap {
                        motion.position = target;
                    }
                    patrol.advance_waypoint();
                }
            }
        }

        motion.velocity = if direction.length() > min_movement {
            direction * settings.patrol_speed
        } else {
            Vec2::ZERO
        };
    }
}
