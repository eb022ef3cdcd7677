//! # Interstitial Ads and Rating
//!
//! Full screen ads shown between levels, and the rate-the-game dialog.

use sgp_core::Connection;

use crate::activity::Activity;
use crate::services::NativeServices;

/// Shows an interstitial ad and runs `callback` on the engine thread once
/// it is closed.
///
/// Platforms without native callbacks have no ad to show: the callback is
/// simply scheduled for the next drain. Either way the callback never runs
/// synchronously, and disconnecting the returned connection before it runs
/// cancels it.
pub fn show_interstitial<F>(services: &NativeServices, callback: F) -> Connection
where
    F: FnOnce() + Send + 'static,
{
    let activity = services.activity();

    if activity.has_native_callbacks() {
        let handle = services.bridge().register_callback(callback);
        tracing::debug!(callback = %handle.id, "showing interstitial");
        activity.show_interstitial(handle.id);
        handle.connection
    } else {
        services.queue().schedule_call(callback)
    }
}

/// Offers the player to rate the game. Returns true if the dialog was shown.
pub fn show_rate_dialog(activity: &dyn Activity) -> bool {
    let shown = activity.show_rate_dialog();
    tracing::debug!(shown, "rate dialog");
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform_thread::{PlatformConfig, PlatformThread};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_desktop_interstitial_runs_next_drain() {
        let services = NativeServices::desktop();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        show_interstitial(&services, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(count.load(Ordering::SeqCst), 0);
        services.queue().process_pending_callbacks();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(services.bridge().pending_registrations(), 0);
    }

    #[test]
    fn test_native_interstitial_goes_through_bridge() {
        let (services, platform) = NativeServices::with_activity(|invoker| {
            PlatformThread::spawn(PlatformConfig::default(), invoker)
        })
        .unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let connection = show_interstitial(&services, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(services.bridge().pending_registrations(), 1);

        platform.close_interstitial();
        platform.flush().unwrap();
        services.queue().process_pending_callbacks();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!connection.connected());
        assert_eq!(platform.log().interstitials, 1);
    }

    #[test]
    fn test_cancelled_interstitial_callback_does_not_run() {
        let (services, platform) = NativeServices::with_activity(|invoker| {
            PlatformThread::spawn(PlatformConfig::default(), invoker)
        })
        .unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let connection = show_interstitial(&services, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        connection.disconnect();

        platform.close_interstitial();
        platform.flush().unwrap();
        services.queue().process_pending_callbacks();

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(services.bridge().pending_registrations(), 0);
    }

    #[test]
    fn test_rate_dialog_on_desktop_is_not_shown() {
        let services = NativeServices::desktop();
        assert!(!show_rate_dialog(services.activity()));
    }
}
