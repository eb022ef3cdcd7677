//! # Game Configuration
//!
//! Player settings persisted between runs, and the engine launch options.
//!
//! Settings live in a TOML file loaded once at startup:
//!
//! ```toml
//! [video]
//! fullscreen = false
//! dumb_rendering = true
//!
//! [audio]
//! sound_on = true
//! sound_volume = 1.0
//! music_on = true
//! music_volume = 0.7
//! ```
//!
//! Missing keys take their default value, and a missing file means "all
//! defaults".

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Video settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Run in fullscreen mode.
    pub fullscreen: bool,
    /// Use the cheap rendering path.
    pub dumb_rendering: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fullscreen: false,
            dumb_rendering: true,
        }
    }
}

/// Audio settings. Volumes are in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Play sound effects.
    pub sound_on: bool,
    /// Sound effects volume.
    pub sound_volume: f64,
    /// Play the music.
    pub music_on: bool,
    /// Music volume.
    pub music_volume: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sound_on: true,
            sound_volume: 1.0,
            // Players on phones usually listen to their own music.
            music_on: !cfg!(target_os = "android"),
            music_volume: 0.7,
        }
    }
}

/// Settings saved in the player's config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Video settings.
    pub video: VideoConfig,
    /// Audio settings.
    pub audio: AudioConfig,
}

impl GameConfig {
    /// Name of the config file in the player's config directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Loads the config from `path`, or the defaults if there is no file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigRead`] if the file exists but cannot be
    /// read, and [`GameError::ConfigParse`] if it is not a valid config.
    pub fn load(path: &Path) -> GameResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(GameError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: Self = toml::from_str(&text).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.sanitize();

        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    /// Writes the config to `path`, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigWrite`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> GameResult<()> {
        let text = toml::to_string_pretty(self)?;

        let write_error = |source| GameError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, text).map_err(write_error)?;

        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Turns fullscreen mode on or off.
    pub fn set_fullscreen(&mut self, on: bool) {
        self.video.fullscreen = on;
    }

    /// Turns the sound effects on or off.
    pub fn set_sound_on(&mut self, on: bool) {
        self.audio.sound_on = on;
    }

    /// Turns the music on or off.
    pub fn set_music_on(&mut self, on: bool) {
        self.audio.music_on = on;
    }

    fn sanitize(&mut self) {
        self.audio.sound_volume = clamp_volume(self.audio.sound_volume);
        self.audio.music_volume = clamp_volume(self.audio.music_volume);
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Options given to the engine when the game starts.
#[derive(Clone, Debug, PartialEq)]
pub struct LaunchOptions {
    /// Name of the game, used for the window title and the config directory.
    pub game_name: String,
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Margin around the screen where items stay active, in pixels.
    pub active_area: u32,
    /// Build tags (e.g. `android`).
    pub tags: Vec<String>,
    /// Where the game data lives.
    pub data_path: PathBuf,
    /// Load the item symbols at startup.
    pub auto_load_symbols: bool,
    /// Where anonymous statistics are sent.
    pub stats_destination: Option<String>,
    /// The first level to load.
    pub start_level: String,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            game_name: "Super Great Park".to_owned(),
            screen_width: 1280,
            screen_height: 720,
            active_area: 250,
            tags: Vec::new(),
            data_path: PathBuf::from("assets/"),
            auto_load_symbols: true,
            stats_destination: Some("http://www.stuff-o-matic.com/asgp/stats/save.php".to_owned()),
            start_level: "level/start.cl".to_owned(),
        }
    }
}

impl LaunchOptions {
    /// The options as engine command line arguments.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--game-name={}", self.game_name),
            format!("--screen-width={}", self.screen_width),
            format!("--screen-height={}", self.screen_height),
            format!("--active-area={}", self.active_area),
        ];

        args.extend(self.tags.iter().map(|tag| format!("--tag={tag}")));
        args.push(format!("--data-path={}", self.data_path.display()));

        if self.auto_load_symbols {
            args.push("--auto-load-symbols".to_owned());
        }
        if let Some(destination) = &self.stats_destination {
            args.push(format!("--stats-destination={destination}"));
        }

        args.push(format!("--start-level={}", self.start_level));
        args
    }
}
