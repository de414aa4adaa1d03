//! Per-frame simulation step
//!
//! One call runs every phase in a fixed order: input, AI, motion, detection,
//! collision response, animation. Nothing overlaps and nothing is skipped
//! except when the player dies or leaves the level mid-resolution. While the
//! player is dead only animation runs.

use glam::Vec2;

use super::animation::{advance_animations, face_cats};
use super::boids::update_boids;
use super::collision::detect;
use super::motion::{cull_offscreen, integrate};
use super::patrol::update_patrols;
use super::player::{clear_portals, fire_portal, move_player, place_indicator, teleport};
use super::resolve::{Outcome, resolve};
use super::sniper::update_snipers;
use super::state::{GamePhase, GameState};
use crate::consts::INDICATOR_SPACING;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Cursor in world coordinates, when it moved or is known
    pub cursor: Option<Vec2>,
    /// Shoot a portal projectile toward the cursor
    pub fire: bool,
    pub clear_portals: bool,
    /// Use the portal the player stood next to last tick
    pub teleport: bool,
    /// Reload the current level (also works while dead)
    pub restart: bool,
}

fn handle_input(state: &mut GameState, input: &TickInput, elapsed_ms: f32) {
    if input.cursor.is_some() {
        state.aim = input.cursor;
    }
    if input.clear_portals {
        clear_portals(state);
    }
    if input.teleport {
        teleport(state);
    }

    let Some(player) = state.player else {
        return;
    };
    move_player(&mut state.world, player, input, elapsed_ms, &state.settings);

    if let (Some(indicator), Some(aim)) = (state.indicator, state.aim) {
        place_indicator(&mut state.world, player, indicator, aim, INDICATOR_SPACING);
    }
    if input.fire {
        match state.aim {
            Some(aim) => {
                fire_portal(state, aim);
            }
            None => log::debug!("Fire ignored: no cursor position yet"),
        }
    }
}

/// Advance the game by `elapsed_ms` of wall-clock time
pub fn tick(state: &mut GameState, input: &TickInput, elapsed_ms: f32) {
    if input.restart && state.phase != GamePhase::Complete {
        log::info!("Restarting level {}", state.level_index);
        state.reload_level();
    }
    if state.phase == GamePhase::Complete {
        return;
    }
    state.time_ticks += 1;

    // A dead player freezes the world; only explosions keep animating
    if !state.is_dead() {
        handle_input(state, input, elapsed_ms);
        update_boids(&mut state.world, elapsed_ms, &state.settings.boids, &mut state.rng);
        update_snipers(&mut state.world, elapsed_ms, &state.settings);
        update_patrols(&mut state.world, &state.settings);

        integrate(&mut state.world, elapsed_ms);
        cull_offscreen(&mut state.world);

        let report = detect(&state.world, &state.meshes, state.settings.portal_activation_radius);
        state.proximity = report.proximity;

        if resolve(state, &report.pairs) == Outcome::LevelExited {
            // The world was just rebuilt; nothing left to animate this tick
            state.advance_level();
            return;
        }
    }

    let dead = state.is_dead();
    let frame_duration_ms = state.settings.frame_duration_ms;
    face_cats(&mut state.world);
    advance_animations(&mut state.world, elapsed_ms, frame_duration_ms, dead);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::grid::GridPos;
    use crate::sim::level::{FlockSpec, LevelLayout};
    use crate::sim::state::GameEvent;
    use crate::sim::world::Facet;

    const FRAME_MS: f32 = 16.0;

    fn session(levels: &[&[&str]]) -> GameState {
        let layouts = levels
            .iter()
            .enumerate()
            .map(|(i, rows)| LevelLayout::from_ascii(&format!("level {i}"), 2, rows).unwrap())
            .collect();
        GameState::new(layouts, Settings::default(), 42).unwrap()
    }

    fn hold_right() -> TickInput {
        TickInput {
            right: true,
            ..Default::default()
        }
    }

    fn run(state: &mut GameState, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            tick(state, input, FRAME_MS);
        }
    }

    #[test]
    fn test_walk_to_exit_advances_level() {
        let mut state = session(&[
            &["#######", "#P..E.#", "#######"],
            &["#######", "#.P.E.#", "#######"],
        ]);
        run(&mut state, &hold_right(), 100);
        assert_eq!(state.level_index, 1);
        assert!(state.events.contains(&GameEvent::LevelCompleted { level: 0, points: 0 }));
    }

    #[test]
    fn test_last_exit_completes() {
        let mut state = session(&[&["######", "#PCE.#", "######"]]);
        run(&mut state, &hold_right(), 100);
        assert_eq!(state.phase, GamePhase::Complete);
        assert_eq!(state.total_points(), 10);

        // Frozen once complete
        let ticks = state.time_ticks;
        run(&mut state, &hold_right(), 5);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_trap_kills_and_restart_recovers() {
        let mut state = session(&[&["######", "#PT..#", "######"]]);
        run(&mut state, &hold_right(), 60);

        assert_eq!(state.phase, GamePhase::Dead);
        assert!(state.player.is_none());
        assert_eq!(state.world.count(Facet::Player), 0);
        assert!(state.events.contains(&GameEvent::PlayerDied));

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, FRAME_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.world.count(Facet::Player), 1);
    }

    #[test]
    fn test_locked_door_blocks_without_key() {
        let mut state = session(&[&["######", "#P.D.#", "######"]]);
        run(&mut state, &hold_right(), 120);

        let player = state.player.unwrap();
        let door_left_edge = GridPos::new(3, 1).to_world().x - 32.0;
        let x = state.world.motion(player).unwrap().position.x;
        assert!(x + 27.0 <= door_left_edge + 0.01, "player at {x} went through the door");
        let door = state.world.first_with(Facet::Door).unwrap();
        assert!(state.world.get(door).unwrap().door.unwrap().locked);
    }

    #[test]
    fn test_key_opens_door() {
        let mut state = session(&[
            &["########", "#PK.D.E#", "########"],
            &["#####", "#P.E#", "#####"],
        ]);
        run(&mut state, &hold_right(), 200);

        assert_eq!(state.level_index, 1);
        assert!(state.events.contains(&GameEvent::KeyCollected { keys: 1 }));
        assert!(state.events.contains(&GameEvent::DoorUnlocked));
    }

    #[test]
    fn test_portal_pair_and_teleport() {
        let mut state = session(&[&["#######", "#.....#", "#..P..#", "#.....#", "#######"]]);
        let player = state.player.unwrap();
        let origin = state.world.motion(player).unwrap().position;
        let shoot = |cursor: Vec2| TickInput {
            cursor: Some(cursor),
            fire: true,
            ..Default::default()
        };

        tick(&mut state, &shoot(origin - Vec2::new(500.0, 0.0)), FRAME_MS);
        for _ in 0..100 {
            if state.world.count(Facet::Portal) == 1 {
                break;
            }
            tick(&mut state, &TickInput::default(), FRAME_MS);
        }
        assert_eq!(state.world.count(Facet::Portal), 1);
        assert!(state.opening_portal.is_some());

        tick(&mut state, &shoot(origin + Vec2::new(500.0, 0.0)), FRAME_MS);
        for _ in 0..100 {
            if state.world.count(Facet::Portal) == 2 {
                break;
            }
            tick(&mut state, &TickInput::default(), FRAME_MS);
        }
        assert_eq!(state.world.count(Facet::Portal), 2);
        assert_eq!(state.portal_charge, 0);
        assert!(state.opening_portal.is_none());

        let left = state.world.portal_at(GridPos::new(0, 2).to_world()).unwrap();
        let right = state.world.portal_at(GridPos::new(6, 2).to_world()).unwrap();
        assert_eq!(state.world.paired_portal(left), Some(right));

        // Out of charge: firing does nothing
        tick(&mut state, &shoot(origin), FRAME_MS);
        assert_eq!(state.world.count(Facet::PortalShot), 0);

        state.world.motion_mut(player).unwrap().position = GridPos::new(1, 2).to_world();
        state.world.motion_mut(player).unwrap().velocity = Vec2::ZERO;
        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert_eq!(state.proximity.map(|p| p.portal), Some(left));

        let jump = TickInput {
            teleport: true,
            ..Default::default()
        };
        tick(&mut state, &jump, FRAME_MS);
        assert_eq!(state.world.motion(player).unwrap().position, GridPos::new(5, 2).to_world());
    }

    #[test]
    fn test_same_seed_same_run() {
        let rows: &[&str] = &[
            "##########",
            "#P.......#",
            "#..1...1.#",
            "#........#",
            "##########",
        ];
        let make = || {
            let layout = LevelLayout::from_ascii("flock", 2, rows).unwrap().with_flock(FlockSpec {
                count: 6,
                radius: 60.0,
                center: Vec2::new(400.0, 200.0),
            });
            GameState::new(vec![layout], Settings::default(), 99).unwrap()
        };
        let mut a = make();
        let mut b = make();
        let inputs = [
            TickInput {
                down: true,
                cursor: Some(Vec2::new(300.0, 300.0)),
                ..Default::default()
            },
            hold_right(),
            TickInput::default(),
        ];
        for i in 0..90 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, FRAME_MS);
            tick(&mut b, input, FRAME_MS);
        }

        let positions = |s: &GameState| {
            s.world
                .iter()
                .map(|(_, e)| e.motion.position)
                .collect::<Vec<_>>()
        };
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.phase, b.phase);
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_world_freezes_while_dead() {
        let mut state = session(&[&[
            "##########",
            "#PT......#",
            "#..1...1.#",
            "##########",
        ]]);
        for _ in 0..100 {
            if state.is_dead() {
                break;
            }
            tick(&mut state, &hold_right(), FRAME_MS);
        }
        assert_eq!(state.phase, GamePhase::Dead);

        let frozen: Vec<_> = state
            .world
            .iter()
            .filter(|(_, e)| !e.explosion)
            .map(|(id, e)| (id, e.motion.position))
            .collect();
        assert_eq!(state.world.count(Facet::Patrol), 1);

        run(&mut state, &TickInput::default(), 500);
        for (id, position) in frozen {
            assert_eq!(state.world.motion(id).map(|m| m.position), Some(position));
        }
        // The explosion played out and was removed
        assert_eq!(state.world.count(Facet::Explosion), 0);
    }

    #[test]
    fn test_sniper_shot_kills_player() {
        let mut state = session(&[&["########", "#P...<.#", "########"]]);
        for _ in 0..300 {
            if state.is_dead() {
                break;
            }
            tick(&mut state, &TickInput::default(), FRAME_MS);
        }

        assert_eq!(state.phase, GamePhase::Dead);
        assert!(state.events.contains(&GameEvent::DamageDealt { damage: 10, health: 0 }));
        assert!(state.events.contains(&GameEvent::PlayerDied));
        // The sniper itself never touched the player
        assert_eq!(state.world.count(Facet::Sniper), 1);
    }

    #[test]
    fn test_boomerang_hits_player() {
        let mut state = session(&[&["#######", "#P..B.#", "#######"]]);
        let player = state.player.unwrap();
        let boomerang = state.world.first_with(Facet::Boomerang).unwrap();
        let at = state.world.motion(boomerang).unwrap().position;
        state.world.motion_mut(player).unwrap().position = at;

        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::Dead);
        assert!(state.events.contains(&GameEvent::DamageDealt { damage: 10, health: 0 }));
        assert!(state.events.contains(&GameEvent::PlayerDied));
    }
}
