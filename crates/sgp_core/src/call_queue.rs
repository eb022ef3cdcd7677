//! # Deferred Call Queue
//!
//! Postpones callbacks to a single, well defined point of the engine frame.
//!
//! ## Architecture
//!
//! ```text
//!   engine thread ──┐                       ┌──> callback A
//!   bridge invoke ──┼──> [ pending: Vec ] ──┼──> callback B    (drain N)
//!   foreign thread ─┘     swap on drain     └──> callback C
//!                              ▲
//!                              │ schedule_call() from A, B or C
//!                              └─────────────── runs in drain N+1
//! ```
//!
//! ## Reentrancy
//!
//! `process_pending_callbacks()` takes the whole pending list under the lock
//! and releases the lock before running anything. A callback scheduling
//! another call pushes into the fresh, empty list, which the current drain
//! never looks at.
//!
//! ## Thread Safety
//!
//! - `schedule_call`: any thread
//! - `process_pending_callbacks`: engine thread only, once per frame

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::connection::{Connection, Slot};

/// A callback waiting in the queue.
pub type DeferredCall = Box<dyn FnOnce() + Send + 'static>;

struct PendingCall {
    slot: Arc<Slot>,
    call: DeferredCall,
}

/// What one drain did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Callbacks that ran.
    pub executed: usize,
    /// Callbacks skipped because their connection was disconnected.
    pub cancelled: usize,
}

impl DrainReport {
    /// Tells if the drain found nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executed == 0 && self.cancelled == 0
    }
}

/// The queue of calls to run at the next drain.
///
/// Cloning gives another handle on the same queue.
#[derive(Clone, Default)]
pub struct CallQueue {
    pending: Arc<Mutex<Vec<PendingCall>>>,
}

impl CallQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `f` to run at the next drain.
    ///
    /// Calls scheduled before a drain run in the order they were scheduled.
    /// The returned connection cancels the call if disconnected before the
    /// drain reaches it.
    pub fn schedule_call<F>(&self, f: F) -> Connection
    where
        F: FnOnce() + Send + 'static,
    {
        let slot = Slot::new();
        let connection = Connection::new(Arc::clone(&slot));

        self.pending.lock().push(PendingCall {
            slot,
            call: Box::new(f),
        });

        connection
    }

    /// Runs every call scheduled before this drain started.
    ///
    /// Calls scheduled while draining wait for the next drain.
    ///
    /// # Panics
    ///
    /// A panicking callback propagates: the remaining calls of this drain
    /// are dropped without running.
    pub fn process_pending_callbacks(&self) -> DrainReport {
        let batch = std::mem::take(&mut *self.pending.lock());

        let mut report = DrainReport::default();

        for pending in batch {
            if pending.slot.try_fire() {
                (pending.call)();
                report.executed += 1;
            } else {
                report.cancelled += 1;
            }
        }

        if !report.is_empty() {
            tracing::trace!(
                executed = report.executed,
                cancelled = report.cancelled,
                "drained deferred calls"
            );
        }

        report
    }

    /// Number of calls waiting for the next drain, cancelled ones included.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl fmt::Debug for CallQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallQueue")
            .field("pending", &self.pending_len())
            .finish()
    }
}
