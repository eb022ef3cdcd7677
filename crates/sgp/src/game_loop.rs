//! # Game Loop
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────────────────────┐
//! │ 1. BEGIN FRAME                                               │
//! │    └─ Clamp delta time                                       │
//! │                                                              │
//! │ 2. LEVEL PROGRESS                                            │
//! │    ├─ Gameplay items                                         │
//! │    └─ Global items, the callback queue item last to drain    │
//! │                                                              │
//! │ 3. END FRAME                                                 │
//! │    └─ Record timing and the drained callbacks                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Native callbacks invoked from platform threads between two frames run in
//! step 2 of the next frame.

use std::time::{Duration, Instant};

use sgp_platform::{LevelInfo, NativeServices};

use crate::config::{GameConfig, LaunchOptions};
use crate::error::{GameError, GameResult};
use crate::item::Key;
use crate::level::Level;

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Maximum allowed frame time before warning.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Longest step given to the items, in seconds.
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Deferred calls run this frame.
    pub callbacks_run: usize,
    /// Deferred calls found cancelled this frame.
    pub callbacks_cancelled: usize,
}

/// The running game: its services, settings and current level.
pub struct Game {
    services: NativeServices,
    config: GameConfig,
    level: Option<Level>,
    frame_count: u64,
    stats: FrameStatsAccumulator,
}

impl Game {
    /// Creates a game without level.
    #[must_use]
    pub fn new(config: GameConfig, services: NativeServices) -> Self {
        Self {
            services,
            config,
            level: None,
            frame_count: 0,
            stats: FrameStatsAccumulator::new(),
        }
    }

    /// Loads the start level of `options`.
    pub fn start(&mut self, options: &LaunchOptions) {
        tracing::info!(
            game = %options.game_name,
            device = %self.services.activity().device_model_name(),
            "starting game"
        );
        self.load_level(&options.start_level, LevelInfo::default());
    }

    /// Replaces the current level with a fresh one.
    pub fn load_level(&mut self, name: &str, info: LevelInfo) -> &mut Level {
        if let Some(mut previous) = self.level.take() {
            previous.teardown();
        }
        self.level.insert(Level::build(name, info))
    }

    /// Runs one frame with `delta` seconds elapsed since the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoLevel`] if no level is loaded.
    pub fn tick(&mut self, delta: f32) -> GameResult<FrameStats> {
        let level = self.level.as_mut().ok_or(GameError::NoLevel)?;
        let start = Instant::now();

        // Clamp delta time so a long pause does not skip gameplay.
        let delta_time = if delta.is_finite() {
            delta.clamp(0.0, MAX_DELTA_TIME)
        } else {
            0.0
        };
        let drained = level.progress(&self.services, delta_time);

        let stats = FrameStats {
            total_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            frame: self.frame_count,
            callbacks_run: drained.executed,
            callbacks_cancelled: drained.cancelled,
        };
        self.end_frame(stats);
        Ok(stats)
    }

    /// Forwards a released key to the level.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoLevel`] if no level is loaded.
    pub fn key_released(&mut self, key: Key) -> GameResult<bool> {
        let level = self.level.as_mut().ok_or(GameError::NoLevel)?;
        Ok(level.key_released(&self.services, key))
    }

    /// Switches an item of the current level on or off.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoLevel`] if no level is loaded and
    /// [`GameError::UnknownItem`] if the level has no such item.
    pub fn toggle_item(&mut self, index: usize, on: bool) -> GameResult<()> {
        let level = self.level.as_mut().ok_or(GameError::NoLevel)?;
        level.toggle_item(&self.services, index, on)
    }

    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats.record(stats);

        if stats.total_us > MAX_FRAME_TIME.as_micros() as u64 {
            tracing::warn!(
                frame = stats.frame,
                frame_ms = stats.total_us as f64 / 1000.0,
                target_ms = TARGET_FRAME_TIME.as_micros() as f64 / 1000.0,
                "frame exceeded budget"
            );
        }
    }

    /// Returns the current frame count.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Queue, bridge and activity.
    #[must_use]
    pub fn services(&self) -> &NativeServices {
        &self.services
    }

    /// Player settings.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Player settings, to change them from a menu.
    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    /// The current level, if any.
    #[must_use]
    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    /// The current level, if any.
    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("services", &self.services)
            .field("level", &self.level)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

/// Running totals over every frame of a game.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Frames ticked so far.
    pub frames_recorded: u64,
    /// Time spent in frames, in microseconds.
    pub total_us_sum: u64,
    /// Shortest frame, `u64::MAX` before the first one.
    pub min_frame_us: u64,
    /// Longest frame.
    pub max_frame_us: u64,
    /// Frames longer than [`TARGET_FRAME_TIME`].
    pub frames_over_budget: u64,
    /// Deferred calls run.
    pub callbacks_run: u64,
    /// Deferred calls skipped because they were cancelled.
    pub callbacks_cancelled: u64,
}

impl FrameStatsAccumulator {
    /// No frame recorded yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            callbacks_run: 0,
            callbacks_cancelled: 0,
        }
    }

    /// Adds one frame to the totals.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.callbacks_run += stats.callbacks_run as u64;
        self.callbacks_cancelled += stats.callbacks_cancelled as u64;

        if stats.total_us > TARGET_FRAME_TIME.as_micros() as u64 {
            self.frames_over_budget += 1;
        }
    }

    fn per_frame(&self, total: u64) -> f64 {
        if self.frames_recorded == 0 {
            0.0
        } else {
            total as f64 / self.frames_recorded as f64
        }
    }

    /// Mean frame time in milliseconds, 0 before the first frame.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        self.per_frame(self.total_us_sum) / 1000.0
    }

    /// Frames per second matching [`Self::avg_frame_ms`].
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        match self.avg_frame_ms() {
            ms if ms > 0.0 => 1000.0 / ms,
            _ => 0.0,
        }
    }

    /// Share of frames over budget, in `[0, 1]`.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        self.per_frame(self.frames_over_budget)
    }

    /// Mean number of deferred calls run per frame.
    #[must_use]
    pub fn avg_callbacks_per_frame(&self) -> f64 {
        self.per_frame(self.callbacks_run)
    }

    /// Prints the totals to stdout.
    pub fn print_summary(&self) {
        let min_ms = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_frame_us as f64 / 1000.0
        };

        println!("┌─ TIMING ─────────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!("│ Average Frame:      {:.3} ms ({:.1} FPS)", self.avg_frame_ms(), self.avg_fps());
        println!("│ Min Frame:          {min_ms:.3} ms");
        println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BUDGET ─────────────────────────────────────────────────────────┐");
        println!(
            "│ Target:             {:.3} ms (60 FPS)",
            TARGET_FRAME_TIME.as_micros() as f64 / 1000.0
        );
        println!(
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ CALLBACKS ──────────────────────────────────────────────────────┐");
        println!(
            "│ Run:                {} ({:.2} per frame)",
            self.callbacks_run,
            self.avg_callbacks_per_frame()
        );
        println!("│ Cancelled:          {}", self.callbacks_cancelled);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
