//! Level hand-over from the loader
//!
//! A [`LevelLayout`] is what the (external) level loader produces: a
//! walkability grid, placements, the player spawn and patrol endpoints. Building
//! it into a [`World`] is where patrol routes get computed, one A* search per
//! patrol group.
//!
//! Layouts can be written as ASCII for demos and tests:
//!
//! | glyph | meaning |
//! |---|---|
//! | `#` | wall (not walkable) |
//! | `.` | floor |
//! | `P` | player spawn |
//! | `K` `I` `D` `E` `C` `T` `B` | key, ice, door, exit, cheese, trap, boomerang |
//! | `^` `>` `v` `<` | sniper cat facing up/right/down/left |
//! | `0`-`9` | patrol group endpoint (first in reading order is the start) |

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::astar::Pathfinder;
use super::grid::{GridPos, TileGrid};
use super::spawn;
use super::world::{EntityId, World};
use crate::Direction;
use crate::error::{SimError, SimResult};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Wall,
    Key,
    Ice,
    Door,
    Exit,
    Cheese,
    Mousetrap,
    Boomerang,
    Sniper(Direction),
}

/// Boids scattered around a point at level start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlockSpec {
    pub count: usize,
    pub radius: f32,
    pub center: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub name: String,
    /// Portals the player may place on this level
    pub portal_charges: u32,
    pub grid: TileGrid,
    pub placements: Vec<(GridPos, Placement)>,
    pub player: GridPos,
    /// Group id -> (start, goal)
    pub patrol_groups: BTreeMap<u32, (GridPos, GridPos)>,
    pub flock: Option<FlockSpec>,
}

/// A freshly built level
#[derive(Debug)]
pub struct BuiltLevel {
    pub world: World,
    pub player: EntityId,
    /// Patrol groups that got a route
    pub patrols: usize,
}

impl LevelLayout {
    /// Parse an ASCII layout (see module docs for the legend)
    pub fn from_ascii(name: &str, portal_charges: u32, rows: &[&str]) -> SimResult<Self> {
        let level = || name.to_string();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(SimError::EmptyLevel { level: level() });
        }

        let mut grid = TileGrid::new(width, rows.len());
        let mut placements = Vec::new();
        let mut player = None;
        let mut endpoints: BTreeMap<u32, Vec<GridPos>> = BTreeMap::new();

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(SimError::RaggedLevel {
                    level: level(),
                    row,
                    found,
                    expected: width,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let cell = GridPos::new(col as i32, row as i32);
                let placement = match glyph {
                    '.' => None,
                    '#' => {
                        grid.set_walkable(cell, false);
                        Some(Placement::Wall)
                    }
                    'P' => {
                        player = Some(cell);
                        None
                    }
                    'K' => Some(Placement::Key),
                    'I' => Some(Placement::Ice),
                    'D' => Some(Placement::Door),
                    'E' => Some(Placement::Exit),
                    'C' => Some(Placement::Cheese),
                    'T' => Some(Placement::Mousetrap),
                    'B' => Some(Placement::Boomerang),
                    '^' => Some(Placement::Sniper(Direction::Top)),
                    '>' => Some(Placement::Sniper(Direction::Right)),
                    'v' => Some(Placement::Sniper(Direction::Bottom)),
                    '<' => Some(Placement::Sniper(Direction::Left)),
                    digit if digit.is_ascii_digit() => {
                        let group = digit.to_digit(10).unwrap_or_default();
                        endpoints.entry(group).or_default().push(cell);
                        None
                    }
                    other => {
                        return Err(SimError::UnknownTile {
                            level: level(),
                            glyph: other,
                            col,
                            row,
                        });
                    }
                };
                if let Some(p) = placement {
                    placements.push((cell, p));
                }
            }
        }

        let player = player.ok_or_else(|| SimError::MissingPlayer { level: level() })?;

        let mut patrol_groups = BTreeMap::new();
        for (group, cells) in endpoints {
            match cells.as_slice() {
                [start, goal] => {
                    patrol_groups.insert(group, (*start, *goal));
                }
                _ => {
                    return Err(SimError::PatrolGroup {
                        level: level(),
                        group,
                        found: cells.len(),
                    });
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            portal_charges,
            grid,
            placements,
            player,
            patrol_groups,
            flock: None,
        })
    }

    pub fn with_flock(mut self, flock: FlockSpec) -> Self {
        self.flock = Some(flock);
        self
    }

    /// Populate a fresh world from this layout
    pub fn build(&self, settings: &Settings, pathfinder: &mut Pathfinder, rng: &mut impl Rng) -> BuiltLevel {
        let mut world = World::new(self.grid.clone());

        for &(cell, placement) in &self.placements {
            match placement {
                Placement::Wall => spawn::wall(&mut world, cell),
                Placement::Key => spawn::key(&mut world, cell),
                Placement::Ice => spawn::ice(&mut world, cell),
                Placement::Door => spawn::door(&mut world, cell),
                Placement::Exit => spawn::exit(&mut world, cell),
                Placement::Cheese => spawn::cheese(&mut world, cell, settings.cheese_points),
                Placement::Mousetrap => spawn::mousetrap(&mut world, cell, settings.harmful_damage),
                Placement::Boomerang => spawn::boomerang(&mut world, cell, settings),
                Placement::Sniper(dir) => spawn::sniper_cat(&mut world, cell, dir, settings),
            };
        }

        let mut patrols = 0;
        for (group, &(start, goal)) in &self.patrol_groups {
            let path = pathfinder.find_path(&self.grid, start, goal);
            if path.is_empty() {
                log::warn!(
                    "Level '{}': no route for patrol group {group} ({start:?} -> {goal:?}), skipping",
                    self.name
                );
                continue;
            }
            let waypoints = path.iter().map(|c| c.to_world()).collect();
            spawn::patrol_cat(&mut world, waypoints, settings);
            patrols += 1;
        }

        if let Some(flock) = self.flock {
            spawn::flock(
                &mut world,
                flock.center,
                flock.radius,
                flock.count,
                settings.harmful_damage,
                rng,
            );
        }

        let player = spawn::player(&mut world, self.player.to_world(), settings);
        log::info!(
            "Built level '{}': {} entities, {patrols} patrol(s)",
            self.name,
            world.len()
        );

        BuiltLevel {
            world,
            player,
            patrols,
        }
    }
}
