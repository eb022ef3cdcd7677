//! # Game Error Types
//!
//! All recoverable errors of the game crate. Broken invariants (a native
//! callback firing twice, two interstitials at once) are panics instead.

use std::path::PathBuf;

use sgp_platform::PlatformError;
use thiserror::Error;

/// Errors that can occur while running the game.
#[derive(Error, Debug)]
pub enum GameError {
    /// The configuration file exists but could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a game config.
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        /// Path of the file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// The configuration could not be turned into TOML.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The configuration file could not be written.
    #[error("failed to write config {path}: {source}")]
    ConfigWrite {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// An item field received a value it cannot hold.
    #[error("invalid field {field} on item {item}: {reason}")]
    InvalidField {
        /// Item name.
        item: &'static str,
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A level already has its callback queue item.
    #[error("level {0} already drains the call queue")]
    DuplicateCallbackQueue(String),

    /// No item with this index in the level.
    #[error("no item {0} in level")]
    UnknownItem(usize),

    /// The game ticked before any level was loaded.
    #[error("no level loaded")]
    NoLevel,

    /// The platform failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
