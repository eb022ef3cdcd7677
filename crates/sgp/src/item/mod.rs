//! # Items
//!
//! The things living in a level. The engine calls each item once per frame
//! through [`Item::progress`], forwards released keys to
//! [`Item::key_released`] and switches toggles with [`Item::toggle`].
//!
//! Items only touch game state from these entry points, which all run on the
//! engine thread.

use std::cell::Cell;

use sgp_core::DrainReport;
use sgp_platform::{LevelInfo, NativeServices};

pub mod back_button;
pub mod callback_queue;
pub mod event_tagger;

pub use back_button::BackButtonHomeItem;
pub use callback_queue::CallbackQueueItem;
pub use event_tagger::EventTagger;

/// Keys the items react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// The back button of Android devices.
    Back,
    /// Escape key.
    Escape,
    /// Enter key.
    Enter,
}

/// What an item can reach while it runs.
pub struct ItemContext<'a> {
    services: &'a NativeServices,
    level: LevelInfo,
    drained: Cell<DrainReport>,
}

impl<'a> ItemContext<'a> {
    /// Creates the context of one engine call into a level.
    #[must_use]
    pub fn new(services: &'a NativeServices, level: LevelInfo) -> Self {
        Self {
            services,
            level,
            drained: Cell::new(DrainReport::default()),
        }
    }

    /// Queue, bridge and activity.
    #[must_use]
    pub fn services(&self) -> &'a NativeServices {
        self.services
    }

    /// The level the item belongs to.
    #[must_use]
    pub fn level(&self) -> LevelInfo {
        self.level
    }

    /// Adds a drain to the frame's total.
    pub fn record_drain(&self, report: DrainReport) {
        let mut total = self.drained.get();
        total.executed += report.executed;
        total.cancelled += report.cancelled;
        self.drained.set(total);
    }

    /// Everything drained through this context.
    #[must_use]
    pub fn drained(&self) -> DrainReport {
        self.drained.get()
    }
}

/// An object of a level driven by the engine.
pub trait Item {
    /// Name of the item class, for logs.
    fn name(&self) -> &'static str;

    /// Global items keep running whatever part of the level is on screen,
    /// and progress after the other items of the frame.
    fn is_global(&self) -> bool {
        false
    }

    /// Tells if the item drains the deferred call queue. A level holds at
    /// most one such item.
    fn drains_call_queue(&self) -> bool {
        false
    }

    /// Called once per frame with the elapsed time in seconds.
    fn progress(&mut self, _ctx: &ItemContext<'_>, _elapsed: f32) {}

    /// Called when a key is released. Returns true if the item used it.
    fn key_released(&mut self, _ctx: &ItemContext<'_>, _key: Key) -> bool {
        false
    }

    /// Called when the item is switched on or off.
    fn toggle(&mut self, _ctx: &ItemContext<'_>, _on: bool) {}
}
