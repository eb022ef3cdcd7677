//! # Super Great Park
//!
//! Items, levels and the game loop, on top of the deferred call layer of
//! `sgp_core` and the platform glue of `sgp_platform`.
//!
//! ## Modules
//!
//! - `config`: player settings and launch options
//! - `item`: the item contract and the game's items
//! - `level`: a level and the order its items run in
//! - `game_loop`: the game, its frames and their statistics
//!
//! ## Example
//!
//! ```rust
//! use sgp::{Game, GameConfig, LaunchOptions};
//! use sgp_platform::NativeServices;
//!
//! let mut game = Game::new(GameConfig::default(), NativeServices::desktop());
//! game.start(&LaunchOptions::default());
//!
//! game.services().queue().schedule_call(|| println!("next frame"));
//! let stats = game.tick(1.0 / 60.0).unwrap();
//! assert_eq!(stats.callbacks_run, 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod game_loop;
pub mod item;
pub mod level;

pub use config::{AudioConfig, GameConfig, LaunchOptions, VideoConfig};
pub use error::{GameError, GameResult};
pub use game_loop::{FrameStats, FrameStatsAccumulator, Game};
pub use item::{BackButtonHomeItem, CallbackQueueItem, EventTagger, Item, ItemContext, Key};
pub use level::Level;
