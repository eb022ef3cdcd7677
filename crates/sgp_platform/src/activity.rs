//! # Activity
//!
//! The game's view of the platform application hosting it.
//!
//! On Android this is the Java activity reached over JNI; on the desktop it is
//! [`DesktopActivity`], and in headless runs and tests it is the
//! [`PlatformThread`](crate::PlatformThread), which answers from its own OS
//! thread like the Android UI thread does.
//!
//! ## Contract
//!
//! - Calls are made from the engine thread.
//! - Nothing here touches game state. Platforms that support native
//!   callbacks report completion through
//!   [`NativeCallInvoker::invoke`](sgp_core::NativeCallInvoker::invoke), from
//!   whatever thread they like.

use parking_lot::Mutex;
use sgp_core::CallbackId;

use crate::events::EventProperties;

/// Requests the game can make to the hosting platform.
pub trait Activity: Send + Sync {
    /// Opens `url` in the system browser.
    fn open_url(&self, url: &str);

    /// Puts the application in the background and shows the home screen.
    fn show_home(&self);

    /// Tells if the platform has a home screen the game can return to.
    fn has_home_screen(&self) -> bool;

    /// Shows the banner ads.
    fn show_ads(&self);

    /// Hides the banner ads.
    fn hide_ads(&self);

    /// Model name of the device running the game.
    fn device_model_name(&self) -> String;

    /// Sends an analytics event.
    fn tag_event(&self, event_type: &str, properties: &EventProperties);

    /// Displays an interstitial ad and invokes `callback` once it is closed.
    ///
    /// Only called when [`has_native_callbacks`](Self::has_native_callbacks)
    /// is true.
    fn show_interstitial(&self, callback: CallbackId);

    /// Offers the player to rate the game. Returns true if the dialog was
    /// shown.
    fn show_rate_dialog(&self) -> bool;

    /// Tells if the platform calls back through the native call bridge.
    fn has_native_callbacks(&self) -> bool;
}

/// An analytics event as received by the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedEvent {
    /// Event type.
    pub event_type: String,
    /// Event properties.
    pub properties: EventProperties,
}

impl TaggedEvent {
    /// Builds an event without properties.
    #[must_use]
    pub fn bare(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_owned(),
            properties: EventProperties::new(),
        }
    }
}

/// What a platform was asked to do so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformLog {
    /// Analytics events, the platform's own ones included.
    pub events: Vec<TaggedEvent>,
    /// URLs opened.
    pub opened_urls: Vec<String>,
    /// Number of times the home screen was requested.
    pub home_requests: usize,
    /// Whether banner ads are currently visible.
    pub ads_visible: bool,
    /// Number of interstitials requested.
    pub interstitials: usize,
}

/// Activity of desktop builds: no native side, requests are logged.
#[derive(Debug)]
pub struct DesktopActivity {
    device_model: String,
    log: Mutex<PlatformLog>,
}

impl DesktopActivity {
    /// Creates a desktop activity reporting `device_model`.
    #[must_use]
    pub fn new(device_model: impl Into<String>) -> Self {
        Self {
            device_model: device_model.into(),
            log: Mutex::new(PlatformLog::default()),
        }
    }

    /// A copy of what the activity was asked so far.
    #[must_use]
    pub fn log(&self) -> PlatformLog {
        self.log.lock().clone()
    }
}

impl Default for DesktopActivity {
    fn default() -> Self {
        Self::new("desktop")
    }
}

impl Activity for DesktopActivity {
    fn open_url(&self, url: &str) {
        tracing::info!(url, "open url");
        self.log.lock().opened_urls.push(url.to_owned());
    }

    fn show_home(&self) {
        tracing::debug!("show home ignored on desktop");
        self.log.lock().home_requests += 1;
    }

    fn has_home_screen(&self) -> bool {
        false
    }

    fn show_ads(&self) {
        self.log.lock().ads_visible = true;
    }

    fn hide_ads(&self) {
        self.log.lock().ads_visible = false;
    }

    fn device_model_name(&self) -> String {
        self.device_model.clone()
    }

    fn tag_event(&self, event_type: &str, properties: &EventProperties) {
        let pairs: Vec<String> = properties.iter().map(ToString::to_string).collect();
        tracing::debug!(event_type, properties = ?pairs, "event");
        self.log.lock().events.push(TaggedEvent {
            event_type: event_type.to_owned(),
            properties: properties.clone(),
        });
    }

    fn show_interstitial(&self, callback: CallbackId) {
        // Desktop has no native callbacks, the caller schedules directly.
        tracing::warn!(%callback, "interstitial requested on a platform without native callbacks");
        self.log.lock().interstitials += 1;
    }

    fn show_rate_dialog(&self) -> bool {
        tracing::debug!("show rate application dialog");
        false
    }

    fn has_native_callbacks(&self) -> bool {
        false
    }
}
