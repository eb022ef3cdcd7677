//! # Native Call Bridge
//!
//! Lets platform code running on foreign OS threads (the Android UI thread,
//! ad SDK listeners) call back into game logic without touching game state
//! off the engine thread.
//!
//! ## Handshake
//!
//! ```text
//!  engine thread                         platform thread
//!  ─────────────                         ───────────────
//!  register_callback(f) ──> id ────────> showInterstitial(id)
//!                                              │ ... later ...
//!                                              ▼
//!  CallQueue  <──────── trigger(id) ──── invoker.invoke(id)
//!     │
//!     ▼ next drain
//!  remove id from table, run f
//! ```
//!
//! The registration table is only locked by engine-thread code: `invoke`
//! never looks at it, it only pushes a trigger onto the [`CallQueue`].
//!
//! ## Failure Policy
//!
//! A trigger for an id missing from the table means the id fired twice or was
//! never handed out by this bridge. There is no way to recover from a broken
//! handshake, so the trigger panics.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::call_queue::{CallQueue, DeferredCall};
use crate::connection::{Connection, Slot};

/// Identifier of a registered native callback.
///
/// Ids start at 1 and are never reused during the life of a bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    /// Rebuilds an id from the integer that crossed the native boundary.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The integer passed to native code.
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of a callback registration.
#[derive(Clone, Debug)]
pub struct NativeCallHandle {
    /// The id to hand to native code.
    pub id: CallbackId,
    /// Disconnecting it keeps the callback from running when the id fires.
    pub connection: Connection,
}

struct Registration {
    slot: Arc<Slot>,
    callback: DeferredCall,
}

#[derive(Default)]
struct Registry {
    last_id: u64,
    registrations: HashMap<CallbackId, Registration>,
}

/// Table of callbacks waiting for a native call.
///
/// Owned by the game for as long as the engine runs.
pub struct NativeCallBridge {
    queue: CallQueue,
    registry: Arc<Mutex<Registry>>,
}

impl NativeCallBridge {
    /// Creates a bridge whose triggers go through `queue`.
    #[must_use]
    pub fn new(queue: CallQueue) -> Self {
        Self {
            queue,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Stores `f` until native code calls back with the returned id.
    ///
    /// Call this from the engine thread, right before handing the id to
    /// native code.
    pub fn register_callback<F>(&self, f: F) -> NativeCallHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let slot = Slot::new();
        let connection = Connection::new(Arc::clone(&slot));

        let mut registry = self.registry.lock();
        registry.last_id += 1;
        let id = CallbackId(registry.last_id);

        registry.registrations.insert(
            id,
            Registration {
                slot,
                callback: Box::new(f),
            },
        );
        drop(registry);

        tracing::debug!(%id, "registered native callback");

        NativeCallHandle { id, connection }
    }

    /// Schedules the callback registered under `id`.
    ///
    /// See [`NativeCallInvoker::invoke`].
    pub fn invoke(&self, id: CallbackId) {
        invoke(&self.queue, &self.registry, id);
    }

    /// Returns a handle for foreign threads, able to invoke ids only.
    #[must_use]
    pub fn invoker(&self) -> NativeCallInvoker {
        NativeCallInvoker {
            queue: self.queue.clone(),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Number of registered callbacks whose id has not fired yet.
    #[must_use]
    pub fn pending_registrations(&self) -> usize {
        self.registry.lock().registrations.len()
    }

    /// The queue receiving the triggers.
    #[must_use]
    pub fn queue(&self) -> &CallQueue {
        &self.queue
    }
}

impl fmt::Debug for NativeCallBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallBridge")
            .field("pending_registrations", &self.pending_registrations())
            .finish_non_exhaustive()
    }
}

impl Drop for NativeCallBridge {
    fn drop(&mut self) {
        let pending = self.pending_registrations();
        if pending > 0 {
            tracing::warn!(pending, "native call bridge dropped with callbacks never called back");
        }
    }
}

/// The part of the bridge handed to foreign threads.
#[derive(Clone)]
pub struct NativeCallInvoker {
    queue: CallQueue,
    registry: Arc<Mutex<Registry>>,
}

impl NativeCallInvoker {
    /// Schedules the callback registered under `id` for the next drain.
    ///
    /// Safe to call from any thread. Returns immediately; the callback runs
    /// on the engine thread when the queue is drained, then the id is
    /// forgotten.
    ///
    /// # Panics
    ///
    /// Not here, but the drain panics if `id` is not registered when the
    /// trigger runs.
    pub fn invoke(&self, id: CallbackId) {
        invoke(&self.queue, &self.registry, id);
    }
}

impl fmt::Debug for NativeCallInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCallInvoker").finish_non_exhaustive()
    }
}

fn invoke(queue: &CallQueue, registry: &Arc<Mutex<Registry>>, id: CallbackId) {
    let registry = Arc::clone(registry);
    queue.schedule_call(move || trigger(&registry, id));
}

fn trigger(registry: &Mutex<Registry>, id: CallbackId) {
    let registration = registry.lock().registrations.remove(&id);

    let Some(registration) = registration else {
        panic!("native callback {id} is not registered: it already fired or was never registered");
    };

    if registration.slot.try_fire() {
        tracing::debug!(%id, "running native callback");
        (registration.callback)();
    } else {
        tracing::debug!(%id, "native callback was disconnected, dropping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bridge() -> NativeCallBridge {
        NativeCallBridge::new(CallQueue::new())
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let bridge = bridge();
        let ids: Vec<u64> = (0..16)
            .map(|_| bridge.register_callback(|| {}).id.as_raw())
            .collect();

        assert_eq!(ids[0], 1);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(bridge.pending_registrations(), 16);
    }

    #[test]
    fn test_ids_not_reused_after_firing() {
        let bridge = bridge();
        let first = bridge.register_callback(|| {});
        bridge.invoke(first.id);
        bridge.queue().process_pending_callbacks();

        let second = bridge.register_callback(|| {});
        assert_ne!(first.id, second.id);
        assert_eq!(second.id.as_raw(), 2);
    }

    #[test]
    fn test_invoke_is_deferred() {
        let bridge = bridge();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let handle = bridge.register_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bridge.invoke(handle.id);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(bridge.pending_registrations(), 1, "table untouched until drain");

        bridge.queue().process_pending_callbacks();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.pending_registrations(), 0);
        assert!(!handle.connection.connected());
    }

    #[test]
    fn test_invoke_order_wins_over_registration_order() {
        let bridge = bridge();
        let log = Arc::new(Mutex::new(Vec::new()));

        let log1 = Arc::clone(&log);
        let h1 = bridge.register_callback(move || log1.lock().push("f1"));
        let log2 = Arc::clone(&log);
        let h2 = bridge.register_callback(move || log2.lock().push("f2"));

        assert_eq!(h1.id.as_raw(), 1);
        assert_eq!(h2.id.as_raw(), 2);

        bridge.invoke(h2.id);
        bridge.invoke(h1.id);
        bridge.queue().process_pending_callbacks();

        assert_eq!(*log.lock(), vec!["f2", "f1"]);
    }

    #[test]
    fn test_disconnected_registration_is_consumed_silently() {
        let bridge = bridge();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let handle = bridge.register_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.connection.disconnect();

        bridge.invoke(handle.id);
        bridge.queue().process_pending_callbacks();

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(bridge.pending_registrations(), 0);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_second_invoke_panics() {
        let bridge = bridge();
        let handle = bridge.register_callback(|| {});

        bridge.invoke(handle.id);
        bridge.queue().process_pending_callbacks();

        bridge.invoke(handle.id);
        bridge.queue().process_pending_callbacks();
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_unknown_id_panics() {
        let bridge = bridge();
        bridge.invoke(CallbackId::from_raw(42));
        bridge.queue().process_pending_callbacks();
    }

    #[test]
    fn test_display() {
        assert_eq!(CallbackId::from_raw(7).to_string(), "#7");
    }
}
