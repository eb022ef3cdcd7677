//! Interstitial ads shown through the services, closed from the platform
//! thread, and run on the engine thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sgp_platform::{
    show_interstitial, NativeServices, PlatformConfig, PlatformThread, TaggedEvent,
};

fn mobile_services() -> (NativeServices, Arc<PlatformThread>) {
    NativeServices::with_activity(|invoker| {
        PlatformThread::spawn(PlatformConfig::default(), invoker)
    })
    .unwrap()
}

#[test]
fn test_ads_in_a_row_call_back_in_order() {
    let (services, platform) = mobile_services();
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    for n in 0..3 {
        let order = Arc::clone(&order);
        let _connection = show_interstitial(&services, move || order.lock().push(n));
        // One interstitial at a time: close this one first.
        platform.close_interstitial();
        platform.flush().unwrap();
        services.queue().process_pending_callbacks();
    }

    assert_eq!(*order.lock(), [0, 1, 2]);
    assert_eq!(platform.log().interstitials, 3);
    assert_eq!(services.bridge().pending_registrations(), 0);
}

#[test]
fn test_disconnected_ad_callback_is_consumed() {
    let (services, platform) = mobile_services();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let connection = show_interstitial(&services, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    connection.disconnect();

    platform.close_interstitial();
    platform.flush().unwrap();
    let report = services.queue().process_pending_callbacks();

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(report.executed, 1, "the trigger itself still runs");
    assert_eq!(services.bridge().pending_registrations(), 0);
    assert_eq!(
        platform.log().events,
        [TaggedEvent::bare("ad-shown"), TaggedEvent::bare("ad-closed")]
    );
}

#[test]
fn test_desktop_runs_callback_without_bridge() {
    let services = NativeServices::desktop();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    let _connection = show_interstitial(&services, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(services.bridge().pending_registrations(), 0);
    assert_eq!(count.load(Ordering::SeqCst), 0);

    services.queue().process_pending_callbacks();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
