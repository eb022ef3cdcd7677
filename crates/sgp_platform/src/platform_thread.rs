//! # Platform Thread
//!
//! A stand-in for the Android UI thread, used by headless runs and tests.
//!
//! ## Architecture
//!
//! ```text
//!   engine thread                       "sgp-platform" thread
//!  ┌──────────────┐   PlatformRequest   ┌─────────────────────┐
//!  │ Activity API │ ──────────────────> │  PlatformWorker     │
//!  └──────────────┘  (crossbeam chan)   │  - analytics log    │
//!         ▲                             │  - interstitial     │
//!         │      invoker.invoke(id)     │                     │
//!    CallQueue <─────────────────────── │ close_interstitial()│
//!                                       └─────────────────────┘
//! ```
//!
//! A loaded interstitial stays on screen until [`PlatformThread::close_interstitial`],
//! and asking for another one meanwhile is a bug the worker panics on.
//!
//! The worker never sees game state: interstitial completion goes back to the
//! game as a bare [`CallbackId`] through the [`NativeCallInvoker`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use sgp_core::{CallbackId, NativeCallInvoker};

use crate::activity::{Activity, PlatformLog, TaggedEvent};
use crate::error::{PlatformError, PlatformResult};
use crate::events::EventProperties;

/// Behavior of the simulated platform.
#[derive(Clone, Debug)]
pub struct PlatformConfig {
    /// Whether an interstitial ad is loaded when one is requested.
    pub ad_loaded: bool,
    /// Device model reported to the game.
    pub device_model: String,
    /// Whether the rate dialog is available.
    pub rate_dialog_available: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            ad_loaded: true,
            device_model: "headless".to_owned(),
            rate_dialog_available: false,
        }
    }
}

enum PlatformRequest {
    OpenUrl(String),
    ShowHome,
    SetAdsVisible(bool),
    TagEvent(TaggedEvent),
    ShowInterstitial(CallbackId),
    CloseInterstitial,
    ShowRateDialog(Sender<bool>),
    Flush(Sender<()>),
    Shutdown,
}

/// An activity answering from its own OS thread.
pub struct PlatformThread {
    sender: Sender<PlatformRequest>,
    log: Arc<Mutex<PlatformLog>>,
    device_model: String,
    worker: Option<JoinHandle<()>>,
}

impl PlatformThread {
    /// Starts the platform thread.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Spawn`] if the OS refuses a new thread.
    pub fn spawn(config: PlatformConfig, invoker: NativeCallInvoker) -> PlatformResult<Self> {
        let (sender, receiver) = unbounded();
        let log = Arc::new(Mutex::new(PlatformLog::default()));
        let device_model = config.device_model.clone();

        let worker = PlatformWorker {
            config,
            invoker,
            log: Arc::clone(&log),
            pending_interstitial: None,
        };

        let handle = thread::Builder::new()
            .name("sgp-platform".to_owned())
            .spawn(move || worker.run(&receiver))?;

        tracing::info!("platform thread started");

        Ok(Self {
            sender,
            log,
            device_model,
            worker: Some(handle),
        })
    }

    /// Waits until every request posted so far was processed.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Disconnected`] if the thread stopped.
    pub fn flush(&self) -> PlatformResult<()> {
        let (reply, done) = bounded(1);
        self.post(PlatformRequest::Flush(reply))?;
        done.recv().map_err(|_| PlatformError::Disconnected)
    }

    /// Closes the interstitial on screen, as the player would. Its callback
    /// is then invoked from the platform thread.
    pub fn close_interstitial(&self) {
        self.post_or_log(PlatformRequest::CloseInterstitial);
    }

    /// A copy of what the platform was asked so far.
    #[must_use]
    pub fn log(&self) -> PlatformLog {
        self.log.lock().clone()
    }

    fn post(&self, request: PlatformRequest) -> PlatformResult<()> {
        self.sender
            .send(request)
            .map_err(|_| PlatformError::Disconnected)
    }

    fn post_or_log(&self, request: PlatformRequest) {
        if let Err(err) = self.post(request) {
            tracing::error!("platform request lost: {err}");
        }
    }
}

impl Activity for PlatformThread {
    fn open_url(&self, url: &str) {
        self.post_or_log(PlatformRequest::OpenUrl(url.to_owned()));
    }

    fn show_home(&self) {
        self.post_or_log(PlatformRequest::ShowHome);
    }

    fn has_home_screen(&self) -> bool {
        true
    }

    fn show_ads(&self) {
        self.post_or_log(PlatformRequest::SetAdsVisible(true));
    }

    fn hide_ads(&self) {
        self.post_or_log(PlatformRequest::SetAdsVisible(false));
    }

    fn device_model_name(&self) -> String {
        self.device_model.clone()
    }

    fn tag_event(&self, event_type: &str, properties: &EventProperties) {
        self.post_or_log(PlatformRequest::TagEvent(TaggedEvent {
            event_type: event_type.to_owned(),
            properties: properties.clone(),
        }));
    }

    fn show_interstitial(&self, callback: CallbackId) {
        self.post_or_log(PlatformRequest::ShowInterstitial(callback));
    }

    fn show_rate_dialog(&self) -> bool {
        let (reply, answer) = bounded(1);
        if let Err(err) = self.post(PlatformRequest::ShowRateDialog(reply)) {
            tracing::error!("rate dialog request lost: {err}");
            return false;
        }
        answer.recv().unwrap_or(false)
    }

    fn has_native_callbacks(&self) -> bool {
        true
    }
}

impl Drop for PlatformThread {
    fn drop(&mut self) {
        // The thread may already be gone; joining is all that matters.
        let _ = self.sender.send(PlatformRequest::Shutdown);

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!("platform thread panicked");
            }
        }
    }
}

struct PlatformWorker {
    config: PlatformConfig,
    invoker: NativeCallInvoker,
    log: Arc<Mutex<PlatformLog>>,
    pending_interstitial: Option<CallbackId>,
}

impl PlatformWorker {
    fn run(mut self, receiver: &Receiver<PlatformRequest>) {
        while let Ok(request) = receiver.recv() {
            match request {
                PlatformRequest::OpenUrl(url) => self.log.lock().opened_urls.push(url),
                PlatformRequest::ShowHome => self.log.lock().home_requests += 1,
                PlatformRequest::SetAdsVisible(visible) => self.log.lock().ads_visible = visible,
                PlatformRequest::TagEvent(event) => self.log.lock().events.push(event),
                PlatformRequest::ShowInterstitial(callback) => self.show_interstitial(callback),
                PlatformRequest::CloseInterstitial => self.close_interstitial(),
                PlatformRequest::ShowRateDialog(reply) => {
                    if self.config.rate_dialog_available {
                        self.log.lock().events.push(TaggedEvent::bare("rate-dialog-shown"));
                    }
                    // The engine may have stopped waiting.
                    let _ = reply.send(self.config.rate_dialog_available);
                }
                PlatformRequest::Flush(reply) => {
                    let _ = reply.send(());
                }
                PlatformRequest::Shutdown => break,
            }
        }

        if let Some(callback) = self.pending_interstitial {
            tracing::warn!(%callback, "platform thread stopped with an interstitial pending");
        }
        tracing::info!("platform thread stopped");
    }

    fn show_interstitial(&mut self, callback: CallbackId) {
        assert!(
            self.pending_interstitial.is_none(),
            "interstitial {callback} requested while another one is pending"
        );

        let mut log = self.log.lock();
        log.interstitials += 1;

        if self.config.ad_loaded {
            log.events.push(TaggedEvent::bare("ad-shown"));
            drop(log);
            self.pending_interstitial = Some(callback);
        } else {
            // Nothing to show: the game goes on right away.
            log.events.push(TaggedEvent::bare("ad-none"));
            drop(log);
            tracing::debug!(%callback, "no interstitial loaded");
            self.invoker.invoke(callback);
        }
    }

    fn close_interstitial(&mut self) {
        let Some(callback) = self.pending_interstitial.take() else {
            tracing::warn!("close requested without an interstitial on screen");
            return;
        };

        self.log.lock().events.push(TaggedEvent::bare("ad-closed"));
        tracing::debug!(%callback, "interstitial closed");
        self.invoker.invoke(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgp_core::{CallQueue, NativeCallBridge};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn spawn(config: PlatformConfig) -> (NativeCallBridge, PlatformThread) {
        let bridge = NativeCallBridge::new(CallQueue::new());
        let platform = PlatformThread::spawn(config, bridge.invoker()).unwrap();
        (bridge, platform)
    }

    fn worker(bridge: &NativeCallBridge) -> PlatformWorker {
        PlatformWorker {
            config: PlatformConfig::default(),
            invoker: bridge.invoker(),
            log: Arc::new(Mutex::new(PlatformLog::default())),
            pending_interstitial: None,
        }
    }

    #[test]
    #[should_panic(expected = "while another one is pending")]
    fn test_second_interstitial_while_one_is_open() {
        let bridge = NativeCallBridge::new(CallQueue::new());
        let mut worker = worker(&bridge);

        let first = bridge.register_callback(|| {});
        let second = bridge.register_callback(|| {});
        worker.show_interstitial(first.id);
        worker.show_interstitial(second.id);
    }

    #[test]
    fn test_next_interstitial_after_close() {
        let bridge = NativeCallBridge::new(CallQueue::new());
        let mut worker = worker(&bridge);

        let first = bridge.register_callback(|| {});
        let second = bridge.register_callback(|| {});
        worker.show_interstitial(first.id);
        worker.close_interstitial();
        worker.show_interstitial(second.id);

        assert_eq!(worker.pending_interstitial, Some(second.id));
        assert_eq!(worker.log.lock().interstitials, 2);

        // Only the first one was closed, so only its trigger is queued.
        bridge.queue().process_pending_callbacks();
        assert_eq!(bridge.pending_registrations(), 1);
    }

    #[test]
    fn test_close_without_interstitial_is_ignored() {
        let bridge = NativeCallBridge::new(CallQueue::new());
        let mut worker = worker(&bridge);

        worker.close_interstitial();
        assert!(worker.log.lock().events.is_empty());
        assert_eq!(bridge.queue().pending_len(), 0);
    }

    #[test]
    fn test_interstitial_calls_back_through_bridge() {
        let (bridge, platform) = spawn(PlatformConfig::default());
        let closed = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&closed);
        let handle = bridge.register_callback(move || flag.store(true, Ordering::SeqCst));
        platform.show_interstitial(handle.id);
        platform.flush().unwrap();

        // Still on screen.
        bridge.queue().process_pending_callbacks();
        assert!(!closed.load(Ordering::SeqCst));
        assert_eq!(bridge.pending_registrations(), 1);

        platform.close_interstitial();
        platform.flush().unwrap();
        assert!(!closed.load(Ordering::SeqCst), "callback waits for the drain");

        bridge.queue().process_pending_callbacks();
        assert!(closed.load(Ordering::SeqCst));

        let events: Vec<String> = platform.log().events.into_iter().map(|e| e.event_type).collect();
        assert_eq!(events, vec!["ad-shown", "ad-closed"]);
    }

    #[test]
    fn test_missing_ad_still_calls_back() {
        let (bridge, platform) = spawn(PlatformConfig {
            ad_loaded: false,
            ..PlatformConfig::default()
        });
        let closed = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&closed);
        let handle = bridge.register_callback(move || flag.store(true, Ordering::SeqCst));
        platform.show_interstitial(handle.id);
        platform.flush().unwrap();
        bridge.queue().process_pending_callbacks();

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(platform.log().events, vec![TaggedEvent::bare("ad-none")]);
    }

    #[test]
    fn test_requests_are_recorded_in_order() {
        let (_bridge, platform) = spawn(PlatformConfig::default());

        platform.open_url("https://example.org/a");
        platform.open_url("https://example.org/b");
        platform.show_ads();
        platform.show_home();
        platform.flush().unwrap();

        let log = platform.log();
        assert_eq!(log.opened_urls, vec!["https://example.org/a", "https://example.org/b"]);
        assert!(log.ads_visible);
        assert_eq!(log.home_requests, 1);
    }

    #[test]
    fn test_rate_dialog_answer() {
        let (_bridge, platform) = spawn(PlatformConfig {
            rate_dialog_available: true,
            ..PlatformConfig::default()
        });

        assert!(platform.show_rate_dialog());
        assert_eq!(platform.log().events, vec![TaggedEvent::bare("rate-dialog-shown")]);
    }
}
