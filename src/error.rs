/// Error types.
///
/// Rejected moves are not errors; they show up as `false` from the move
/// primitive. Everything here stops the simulation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Every candidate cell was taken; the level leaves no room to respawn.
    #[error("no free cell to respawn guard {guard}")]
    NoRebornCell { guard: usize },

    #[error("level has {count} guards, at most {max} are supported")]
    TooManyGuards { count: usize, max: usize },

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("unsupported tile {ch:?} at row {row}, column {col}")]
    BadTile { ch: char, row: usize, col: usize },

    #[error("level has {found} rows, expected {expected}")]
    RowCount { found: usize, expected: usize },

    #[error("row {row} is {len} cells wide, at most {max} allowed")]
    TooWide { row: usize, len: usize, max: usize },

    #[error("level has no runner spawn")]
    MissingRunner,

    #[error("second runner spawn at row {row}, column {col}")]
    DuplicateRunner { row: usize, col: usize },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("gold hold range {min}..={max} is empty")]
    GoldHoldRange { min: i32, max: i32 },

    #[error("tick_rate_ms must be greater than zero")]
    ZeroTickRate,
}
