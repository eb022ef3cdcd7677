//! # SGP Platform
//!
//! Glue between the game and the platform application hosting it.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────── NativeServices ─────────────────────────┐
//! │                                                                  │
//! │  CallQueue <──── NativeCallBridge <──── invoker ──┐              │
//! │      ▲                  ▲                         │              │
//! │      │ drain            │ register                │ invoke(id)   │
//! │      │                  │                         │              │
//! │  engine thread ─────────┴──> Activity ────> platform thread(s)   │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `activity`: the platform trait and the desktop implementation
//! - `platform_thread`: an activity answering from its own OS thread
//! - `services`: the context object owning queue, bridge and activity
//! - `ad`: interstitial ads and the rate dialog
//! - `events`: analytics event tagging

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod activity;
pub mod ad;
pub mod error;
pub mod events;
pub mod platform_thread;
pub mod services;

pub use activity::{Activity, DesktopActivity, PlatformLog, TaggedEvent};
pub use ad::{show_interstitial, show_rate_dialog};
pub use error::{PlatformError, PlatformResult};
pub use events::{
    make_event_property, tag_event, tag_level_event, EventProperties, EventProperty, LevelInfo,
};
pub use platform_thread::{PlatformConfig, PlatformThread};
pub use services::NativeServices;
