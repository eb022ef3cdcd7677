//! # Headless Run
//!
//! Starts the game on a simulated platform thread, plays the start level,
//! shows an interstitial ad and runs frames until the ad is closed.
//!
//! ```text
//! sgp_headless [config.toml]
//! RUST_LOG=debug sgp_headless
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sgp::{BackButtonHomeItem, EventTagger, Game, GameConfig, GameResult, Key, LaunchOptions};
use sgp_platform::{show_interstitial, show_rate_dialog, NativeServices, PlatformConfig, PlatformThread};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Frames run before giving up on the ad.
const MAX_FRAMES: u64 = 600;

/// Frames the simulated player spends looking at the ad.
const AD_FRAMES: u64 = 90;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "headless run failed");
        std::process::exit(1);
    }
}

fn run() -> GameResult<()> {
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(GameConfig::FILE_NAME), PathBuf::from);
    let config = GameConfig::load(&config_path)?;

    let options = LaunchOptions {
        tags: vec!["headless".to_owned()],
        ..LaunchOptions::default()
    };
    info!(args = ?options.to_args(), "launch options");

    let (services, platform) = NativeServices::with_activity(|invoker| {
        PlatformThread::spawn(PlatformConfig::default(), invoker)
    })?;

    let mut game = Game::new(config, services);
    game.start(&options);

    if let Some(level) = game.level_mut() {
        level.add_item(Box::new(BackButtonHomeItem))?;
        let mut tagger = EventTagger::new("headless-start").with_level_info(true);
        tagger.set_properties(&["mode", "headless"])?;
        let tagger = level.add_item(Box::new(tagger))?;
        game.toggle_item(tagger, true)?;
    }

    let closed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&closed);
    // Giving up on the ad drops the connection and cancels the callback.
    let ad = show_interstitial(game.services(), move || {
        info!("interstitial closed");
        flag.store(true, Ordering::SeqCst);
    })
    .scoped();

    while !closed.load(Ordering::SeqCst) && game.frame_count() < MAX_FRAMES {
        if game.frame_count() == AD_FRAMES {
            platform.close_interstitial();
        }
        game.tick(1.0 / 60.0)?;
        platform.flush()?;
    }

    if !closed.load(Ordering::SeqCst) {
        warn!(frames = game.frame_count(), "interstitial never closed");
    }
    drop(ad);

    let consumed = game.key_released(Key::Back)?;
    let rated = show_rate_dialog(game.services().activity());
    platform.flush()?;

    let log = platform.log();
    info!(
        frames = game.frame_count(),
        events = log.events.len(),
        home_requests = log.home_requests,
        back_consumed = consumed,
        rated,
        "headless run done"
    );

    game.stats().print_summary();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
