//! Simulation tuning values
//!
//! Everything a designer might want to tweak without recompiling. Loaded from JSON;
//! missing fields fall back to the defaults below.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Flocking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidSettings {
    pub max_speed: f32,
    /// Cap on every individual steering contribution
    pub max_force: f32,
    pub separation_radius: f32,
    pub neighbor_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub wander_weight: f32,
    /// Max change of the wander angle per tick (radians, uniform ±)
    pub wander_jitter: f32,
    /// Distance of the wander circle ahead of the boid
    pub wander_distance: f32,
    pub wander_radius: f32,
    /// Inset from the world edge where boids bounce
    pub edge_padding: f32,
    /// Velocity kept (per axis) after bouncing off the padding
    pub bounce_damping: f32,
}

impl Default for BoidSettings {
    fn default() -> Self {
        Self {
            max_speed: 100.0,
            max_force: 0.5,
            separation_radius: 50.0,
            neighbor_radius: 70.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            wander_weight: 0.3,
            wander_jitter: 0.3,
            wander_distance: 30.0,
            wander_radius: 10.0,
            edge_padding: 50.0,
            bounce_damping: 0.5,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Player ===
    /// Top speed per axis (px/s)
    pub player_max_speed: f32,
    /// Acceleration per elapsed millisecond on normal floor
    pub player_accel: f32,
    /// Acceleration per elapsed millisecond on ice
    pub ice_accel: f32,
    pub player_health: i32,

    // === Hazards ===
    /// Damage dealt by cats, traps and hostile projectiles
    pub harmful_damage: i32,
    pub boomerang_duration_ms: f32,

    // === Patrol cats ===
    pub patrol_speed: f32,
    /// Detection range in tiles (checked on both axes)
    pub patrol_range: f32,
    pub patrol_arrival_threshold: f32,
    pub patrol_snap_threshold: f32,
    pub patrol_min_movement: f32,
    /// Samples along the patrol line-of-sight ray
    pub patrol_sight_steps: u32,

    // === Sniper cats ===
    pub sniper_cooldown_ms: f32,
    pub sniper_bullet_speed: f32,
    pub sniper_bullet_size: Vec2,

    // === Portals ===
    pub portal_bullet_speed: f32,
    pub portal_bullet_size: Vec2,
    /// Player must be this close to a portal to teleport (px)
    pub portal_activation_radius: f32,

    // === Pickups ===
    pub cheese_points: u32,

    // === Animation ===
    pub frame_duration_ms: f32,

    // === Flocking ===
    pub boids: BoidSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_max_speed: 200.0,
            player_accel: 1.0,
            ice_accel: 0.2,
            player_health: 10,

            harmful_damage: 10,
            boomerang_duration_ms: 2000.0,

            patrol_speed: 50.0,
            patrol_range: 2.0,
            patrol_arrival_threshold: 5.0,
            patrol_snap_threshold: 1.0,
            patrol_min_movement: 0.05,
            patrol_sight_steps: 10,

            sniper_cooldown_ms: 1000.0,
            sniper_bullet_speed: 160.0,
            sniper_bullet_size: Vec2::new(25.0, 25.0),

            portal_bullet_speed: 300.0,
            portal_bullet_size: Vec2::new(30.0, 30.0),
            portal_activation_radius: 75.0,

            cheese_points: 10,

            frame_duration_ms: 200.0,

            boids: BoidSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject durations the simulation divides by or counts down against
    pub fn validate(&self) -> SimResult<()> {
        let durations = [
            ("boomerang_duration_ms", self.boomerang_duration_ms),
            ("frame_duration_ms", self.frame_duration_ms),
        ];
        for (field, value) in durations {
            if value.is_nan() || value <= 0.0 {
                return Err(SimError::InvalidSetting { field, value });
            }
        }
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON (for writing a starter file)
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
