//! Portal Maze headless runner
//!
//! Loads optional settings, builds the demo levels and drives the simulation
//! with a simple autopilot, logging every game event. Useful for eyeballing
//! tuning changes without a renderer.
//!
//! Usage: `portal-maze [settings.json] [seed]`

use glam::Vec2;

use portal_maze::Settings;
use portal_maze::error::SimResult;
use portal_maze::sim::{FlockSpec, GamePhase, GameState, LevelLayout, TickInput, tick};

/// Simulated frame time
const FRAME_MS: f32 = 16.0;
const MAX_TICKS: u64 = 3600;

const CELLAR: [&str; 14] = [
    "####################",
    "#P......#..........#",
    "#.......#....C.....#",
    "#..K....#..........#",
    "#.......D.....T....#",
    "#.......#..........#",
    "####.####....>.....#",
    "#..................#",
    "#.1.........1......#",
    "#..................#",
    "#...III.......C....#",
    "#..............B...#",
    "#.................E#",
    "####################",
];

const SEALED: [&str; 14] = [
    "####################",
    "#..........#.......#",
    "#.P........#...C...#",
    "#..........#.......#",
    "#....v.....#.......#",
    "#..........#...E...#",
    "#..........#.......#",
    "#...2......#.......#",
    "#..........#.......#",
    "#..........#...T...#",
    "#.......2..#.......#",
    "#..C.......#.......#",
    "#..........#....<..#",
    "####################",
];

fn demo_levels() -> SimResult<Vec<LevelLayout>> {
    Ok(vec![
        LevelLayout::from_ascii("Cellar", 2, &CELLAR)?,
        LevelLayout::from_ascii("Sealed", 4, &SEALED)?.with_flock(FlockSpec {
            count: 8,
            radius: 80.0,
            center: Vec2::new(320.0, 560.0),
        }),
    ])
}

/// Head for the exit, shoot portals now and then, jump when next to one
fn autopilot(state: &GameState) -> TickInput {
    let exit = state
        .world
        .iter()
        .find(|(_, e)| e.exit)
        .map(|(_, e)| e.motion.position);
    let player = state
        .player
        .and_then(|p| state.world.motion(p))
        .map(|m| m.position);

    let (Some(exit), Some(player)) = (exit, player) else {
        return TickInput {
            restart: state.phase == GamePhase::Dead,
            ..Default::default()
        };
    };
    let to_exit = exit - player;
    TickInput {
        left: to_exit.x < -8.0,
        right: to_exit.x > 8.0,
        up: to_exit.y < -8.0,
        down: to_exit.y > 8.0,
        cursor: Some(exit),
        fire: state.time_ticks % 150 == 75,
        teleport: state.proximity.is_some(),
        ..Default::default()
    }
}

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed);
    log::info!("Portal Maze starting (seed {seed})");

    let mut state = GameState::new(demo_levels()?, settings, seed)?;
    while state.phase != GamePhase::Complete && state.time_ticks < MAX_TICKS {
        let input = autopilot(&state);
        tick(&mut state, &input, FRAME_MS);
        for event in state.drain_events() {
            log::info!("[tick {}] {event:?}", state.time_ticks);
        }
    }

    log::info!(
        "Finished after {} ticks: level {}, {} points, phase {:?}",
        state.time_ticks,
        state.level_index + 1,
        state.total_points(),
        state.phase
    );
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
