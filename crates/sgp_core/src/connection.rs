//! # Connections
//!
//! Cancellation tokens for deferred calls and native callback registrations.
//!
//! Every scheduled call owns a [`Slot`]. The slot moves exactly once out of
//! the `CONNECTED` state: either to `FIRED` when the drain claims it, or to
//! `DISCONNECTED` when the caller cancels. Whichever transition wins decides
//! whether the callback runs, so a late `disconnect()` is a harmless no-op.
//!
//! ```text
//!                 try_fire()
//!   CONNECTED ───────────────> FIRED
//!       │
//!       │ disconnect()
//!       ▼
//!   DISCONNECTED
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const CONNECTED: u8 = 0;
const DISCONNECTED: u8 = 1;
const FIRED: u8 = 2;

/// Shared state between a pending call and its [`Connection`].
#[derive(Debug)]
pub(crate) struct Slot {
    state: AtomicU8,
}

impl Slot {
    /// Creates a connected slot.
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(CONNECTED),
        })
    }

    /// Claims the slot for execution.
    ///
    /// Returns `false` when the slot was disconnected (or already fired), in
    /// which case the callback must not run.
    pub(crate) fn try_fire(&self) -> bool {
        self.state
            .compare_exchange(CONNECTED, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn disconnect(&self) -> bool {
        self.state
            .compare_exchange(CONNECTED, DISCONNECTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_connected(&self) -> bool {
        self.state.load(Ordering::Acquire) == CONNECTED
    }
}

/// Handle allowing the owner of a deferred call to cancel it.
///
/// Clones share the same slot: disconnecting any clone cancels the call.
#[derive(Clone, Debug)]
pub struct Connection {
    slot: Arc<Slot>,
}

impl Connection {
    pub(crate) fn new(slot: Arc<Slot>) -> Self {
        Self { slot }
    }

    /// Cancels the call if it has not run yet.
    ///
    /// Disconnecting twice, or after the call ran, does nothing.
    pub fn disconnect(&self) {
        if self.slot.disconnect() {
            tracing::trace!("connection disconnected before firing");
        }
    }

    /// Tells if the call is still waiting to run.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.slot.is_connected()
    }

    /// Wraps the connection so that it is disconnected when dropped.
    #[must_use]
    pub fn scoped(self) -> ScopedConnection {
        ScopedConnection { inner: Some(self) }
    }
}

/// A [`Connection`] disconnected automatically when it goes out of scope.
///
/// Whoever waits on a callback keeps one of these, so that giving up on it
/// (dropping the waiter) cancels the pending call.
#[derive(Debug)]
pub struct ScopedConnection {
    inner: Option<Connection>,
}

impl ScopedConnection {
    /// Tells if the wrapped call is still waiting to run.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.inner.as_ref().is_some_and(Connection::connected)
    }

    /// Gives back the plain connection without disconnecting it.
    #[must_use]
    pub fn release(mut self) -> Connection {
        // `inner` is only taken here and in `drop`.
        match self.inner.take() {
            Some(connection) => connection,
            None => unreachable!("scoped connection released twice"),
        }
    }
}

impl From<Connection> for ScopedConnection {
    fn from(connection: Connection) -> Self {
        connection.scoped()
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.inner.take() {
            connection.disconnect();
        }
    }
}
