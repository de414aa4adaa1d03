//! Startup-time error taxonomy
//!
//! Only configuration and level hand-over can fail. Everything that happens inside
//! a tick recovers locally (empty paths, dropped teleports) and never returns `Err`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] serde_json::Error),

    #[error("Setting '{field}' must be positive, got {value}")]
    InvalidSetting { field: &'static str, value: f32 },

    #[error("Level '{level}' is empty")]
    EmptyLevel { level: String },

    #[error("Level '{level}' row {row} is {found} tiles wide, expected {expected}")]
    RaggedLevel {
        level: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Level '{level}' has unknown tile '{glyph}' at column {col}, row {row}")]
    UnknownTile {
        level: String,
        glyph: char,
        col: usize,
        row: usize,
    },

    #[error("Level '{level}' patrol group {group} needs exactly 2 endpoints, found {found}")]
    PatrolGroup { level: String, group: u32, found: usize },

    #[error("Level '{level}' has no player spawn")]
    MissingPlayer { level: String },

    #[error("No levels supplied")]
    NoLevels,
}

/// Result type alias for fallible setup operations
pub type SimResult<T> = Result<T, SimError>;
