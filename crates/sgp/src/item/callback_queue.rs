//! The item draining the deferred call queue once per frame.

use crate::item::{Item, ItemContext};

/// Runs the deferred calls of the game.
///
/// Every level gets exactly one, installed when the level is built. It is
/// global, so the level progresses it after the gameplay items: calls they
/// schedule during a frame run at the end of that same frame.
#[derive(Debug, Default)]
pub struct CallbackQueueItem {
    drains: u64,
}

impl CallbackQueueItem {
    /// Creates the item.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames this item progressed.
    #[must_use]
    pub fn drains(&self) -> u64 {
        self.drains
    }
}

impl Item for CallbackQueueItem {
    fn name(&self) -> &'static str {
        "callback_queue"
    }

    fn is_global(&self) -> bool {
        true
    }

    fn drains_call_queue(&self) -> bool {
        true
    }

    fn progress(&mut self, ctx: &ItemContext<'_>, _elapsed: f32) {
        let report = ctx.services().queue().process_pending_callbacks();
        ctx.record_drain(report);
        self.drains += 1;
    }
}
