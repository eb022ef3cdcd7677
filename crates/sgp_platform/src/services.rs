//! # Native Services
//!
//! The context object owning everything the game needs to reach the
//! platform: the deferred call queue, the native call bridge and the
//! activity. The game creates one at startup and keeps it for as long as the
//! engine runs.

use std::fmt;
use std::sync::Arc;

use sgp_core::{CallQueue, NativeCallBridge, NativeCallInvoker};

use crate::activity::{Activity, DesktopActivity};
use crate::error::PlatformResult;

/// Queue, bridge and activity, owned together.
pub struct NativeServices {
    bridge: NativeCallBridge,
    activity: Arc<dyn Activity>,
}

impl NativeServices {
    /// Bundles `bridge` with `activity`. The queue is the bridge's queue.
    #[must_use]
    pub fn new(bridge: NativeCallBridge, activity: Arc<dyn Activity>) -> Self {
        Self { bridge, activity }
    }

    /// Services for a desktop build.
    #[must_use]
    pub fn desktop() -> Self {
        Self::new(
            NativeCallBridge::new(CallQueue::new()),
            Arc::new(DesktopActivity::default()),
        )
    }

    /// Creates the bridge first, then the activity from its invoker.
    ///
    /// # Errors
    ///
    /// Forwards the error of `make_activity`.
    pub fn with_activity<A, F>(make_activity: F) -> PlatformResult<(Self, Arc<A>)>
    where
        A: Activity + 'static,
        F: FnOnce(NativeCallInvoker) -> PlatformResult<A>,
    {
        let bridge = NativeCallBridge::new(CallQueue::new());
        let activity = Arc::new(make_activity(bridge.invoker())?);
        let services = Self::new(bridge, Arc::clone(&activity) as Arc<dyn Activity>);
        Ok((services, activity))
    }

    /// The deferred call queue.
    #[must_use]
    pub fn queue(&self) -> &CallQueue {
        self.bridge.queue()
    }

    /// The native call bridge.
    #[must_use]
    pub fn bridge(&self) -> &NativeCallBridge {
        &self.bridge
    }

    /// The hosting platform.
    #[must_use]
    pub fn activity(&self) -> &dyn Activity {
        self.activity.as_ref()
    }
}

impl fmt::Debug for NativeServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeServices")
            .field("queue", self.queue())
            .field("bridge", &self.bridge)
            .field("native_callbacks", &self.activity.has_native_callbacks())
            .finish()
    }
}
