//! Game session state
//!
//! Everything one play session owns: the live world, the level list and where
//! we are in it, points, portal charge and the event queue the front end
//! drains. Randomness comes from a single seeded RNG so a session replays
//! identically from the same seed and inputs.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::astar::Pathfinder;
use super::collision::PortalProximity;
use super::level::LevelLayout;
use super::mesh::MeshLibrary;
use super::spawn;
use super::world::{EntityId, World};
use crate::Direction;
use crate::error::{SimError, SimResult};
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Player destroyed; only explosions animate until restart
    Dead,
    /// Exit of the last level reached
    Complete,
}

/// Things the front end may want to react to (sounds, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    KeyCollected { keys: u32 },
    CheeseCollected { points: u32 },
    DoorUnlocked,
    DamageDealt { damage: i32, health: i32 },
    PlayerDied,
    PortalPlaced { direction: Direction, paired: bool },
    PortalShot,
    Teleported { to: Vec2 },
    LevelCompleted { level: usize, points: u32 },
    CatKilled,
}

#[derive(Debug)]
pub struct GameState {
    pub world: World,
    pub settings: Settings,
    pub levels: Vec<LevelLayout>,
    /// Index into `levels`
    pub level_index: usize,
    /// Points collected on the current attempt of the current level
    pub level_points: u32,
    /// Points banked from completed levels
    pub past_points: u32,
    pub phase: GamePhase,
    /// Portals left to place on this level
    pub portal_charge: u32,
    pub max_portals: u32,
    /// First half of a pair waiting for its partner
    pub opening_portal: Option<EntityId>,
    pub player: Option<EntityId>,
    pub indicator: Option<EntityId>,
    /// Last cursor position seen; aims the indicator and portal shots
    pub aim: Option<Vec2>,
    /// Proximity found by the last detection pass
    pub proximity: Option<PortalProximity>,
    pub events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub seed: u64,
    pub rng: Pcg32,
    pub meshes: MeshLibrary,
    pub pathfinder: Pathfinder,
}

impl GameState {
    /// Start a session on the first level
    pub fn new(levels: Vec<LevelLayout>, settings: Settings, seed: u64) -> SimResult<Self> {
        if levels.is_empty() {
            return Err(SimError::NoLevels);
        }
        settings.validate()?;
        let mut state = Self {
            world: World::default(),
            settings,
            levels,
            level_index: 0,
            level_points: 0,
            past_points: 0,
            phase: GamePhase::Playing,
            portal_charge: 0,
            max_portals: 0,
            opening_portal: None,
            player: None,
            indicator: None,
            aim: None,
            proximity: None,
            events: Vec::new(),
            time_ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            meshes: MeshLibrary::new(),
            pathfinder: Pathfinder::new(),
        };
        state.reload_level();
        Ok(state)
    }

    /// Rebuild the current level from scratch. Points from this attempt are lost.
    pub fn reload_level(&mut self) {
        let Some(layout) = self.levels.get(self.level_index) else {
            log::warn!("No level at index {}", self.level_index);
            return;
        };
        let built = layout.build(&self.settings, &mut self.pathfinder, &mut self.rng);

        self.max_portals = layout.portal_charges;
        self.portal_charge = layout.portal_charges;
        self.world = built.world;
        self.player = Some(built.player);
        let at = self.world.motion(built.player).map(|m| m.position).unwrap_or_default();
        self.indicator = Some(spawn::indicator(&mut self.world, at));
        self.opening_portal = None;
        self.proximity = None;
        self.level_points = 0;
        self.phase = GamePhase::Playing;
        log::info!("Loaded level {} '{}'", self.level_index, layout.name);
    }

    /// Bank this level's points and move on; the last exit completes the game
    pub fn advance_level(&mut self) {
        let finished = self.level_index;
        let points = self.level_points;
        self.past_points += points;
        self.level_points = 0;
        self.events.push(GameEvent::LevelCompleted { level: finished, points });

        if finished + 1 >= self.levels.len() {
            log::info!("Final level cleared with {} points", self.past_points);
            self.phase = GamePhase::Complete;
            return;
        }
        self.level_index = finished + 1;
        self.reload_level();
    }

    pub fn total_points(&self) -> u32 {
        self.past_points + self.level_points
    }

    pub fn is_dead(&self) -> bool {
        self.phase == GamePhase::Dead
    }

    /// Hand queued events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn current_level(&self) -> Option<&LevelLayout> {
        self.levels.get(self.level_index)
    }
}
