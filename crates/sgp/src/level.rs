//! # Levels
//!
//! A level owns its items and drives them for the engine. Each level is built
//! with a [`CallbackQueueItem`], so the deferred calls of the game are drained
//! once per frame whatever level is running.
//!
//! Frame order:
//! ```text
//! progress(elapsed)
//!   ├─ non-global items, in insertion order
//!   └─ global items, in insertion order
//!        └─ CallbackQueueItem: process_pending_callbacks()
//! ```

use sgp_core::DrainReport;
use sgp_platform::{LevelInfo, NativeServices};

use crate::error::{GameError, GameResult};
use crate::item::{CallbackQueueItem, Item, ItemContext, Key};

/// A running level.
pub struct Level {
    name: String,
    info: LevelInfo,
    items: Vec<Box<dyn Item>>,
}

impl Level {
    /// Creates the level `name`, its callback queue item already installed.
    #[must_use]
    pub fn build(name: impl Into<String>, info: LevelInfo) -> Self {
        let name = name.into();
        tracing::info!(
            level = %name,
            level_number = info.level_number,
            serial_number = info.serial_number,
            "building level"
        );

        let callback_queue: Box<dyn Item> = Box::new(CallbackQueueItem::new());
        Self {
            name,
            info,
            items: vec![callback_queue],
        }
    }

    /// Adds `item` to the level and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateCallbackQueue`] if `item` drains the
    /// call queue and the level already has such an item: the queue must be
    /// drained once per frame.
    pub fn add_item(&mut self, item: Box<dyn Item>) -> GameResult<usize> {
        if item.drains_call_queue() && self.items.iter().any(|other| other.drains_call_queue()) {
            return Err(GameError::DuplicateCallbackQueue(self.name.clone()));
        }

        tracing::trace!(level = %self.name, item = item.name(), "item added");
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Progresses every item by `elapsed` seconds. Returns what the deferred
    /// call queue ran during the frame.
    pub fn progress(&mut self, services: &NativeServices, elapsed: f32) -> DrainReport {
        let ctx = ItemContext::new(services, self.info);

        for item in self.items.iter_mut().filter(|item| !item.is_global()) {
            item.progress(&ctx, elapsed);
        }
        for item in self.items.iter_mut().filter(|item| item.is_global()) {
            item.progress(&ctx, elapsed);
        }

        ctx.drained()
    }

    /// Offers the released `key` to the items until one uses it.
    pub fn key_released(&mut self, services: &NativeServices, key: Key) -> bool {
        let ctx = ItemContext::new(services, self.info);
        self.items.iter_mut().any(|item| item.key_released(&ctx, key))
    }

    /// Switches the item at `index` on or off.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownItem`] if there is no such item.
    pub fn toggle_item(
        &mut self,
        services: &NativeServices,
        index: usize,
        on: bool,
    ) -> GameResult<()> {
        let ctx = ItemContext::new(services, self.info);
        let item = self
            .items
            .get_mut(index)
            .ok_or(GameError::UnknownItem(index))?;

        tracing::debug!(level = %self.name, item = item.name(), on, "toggle");
        item.toggle(&ctx, on);
        Ok(())
    }

    /// Removes every item. Calls already scheduled stay in the queue and run
    /// with the next level.
    pub fn teardown(&mut self) {
        tracing::info!(level = %self.name, items = self.items.len(), "tearing down level");
        self.items.clear();
    }

    /// Name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level and serial numbers.
    #[must_use]
    pub fn info(&self) -> LevelInfo {
        self.info
    }

    /// Number of items, the callback queue item included.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.items.iter().map(|item| item.name()).collect();
        f.debug_struct("Level")
            .field("name", &self.name)
            .field("info", &self.info)
            .field("items", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Schedules one call per frame and records when things happen.
    struct Scheduler {
        trace: Arc<Mutex<Vec<String>>>,
        frame: u32,
    }

    impl Item for Scheduler {
        fn name(&self) -> &'static str {
            "scheduler"
        }

        fn progress(&mut self, ctx: &ItemContext<'_>, _elapsed: f32) {
            self.frame += 1;
            let frame = self.frame;
            self.trace.lock().push(format!("progress {frame}"));

            let trace = Arc::clone(&self.trace);
            ctx.services().queue().schedule_call(move || {
                trace.lock().push(format!("deferred {frame}"));
            });
        }
    }

    #[test]
    fn test_build_installs_callback_queue() {
        let level = Level::build("empty", LevelInfo::default());
        assert_eq!(level.item_count(), 1);
    }

    #[test]
    fn test_deferred_calls_run_after_items() {
        let services = NativeServices::desktop();
        let trace = Arc::new(Mutex::new(Vec::new()));

        let mut level = Level::build("park", LevelInfo::default());
        level
            .add_item(Box::new(Scheduler {
                trace: Arc::clone(&trace),
                frame: 0,
            }))
            .unwrap();

        let report = level.progress(&services, 0.016);
        assert_eq!(report.executed, 1);
        level.progress(&services, 0.016);

        assert_eq!(
            *trace.lock(),
            ["progress 1", "deferred 1", "progress 2", "deferred 2"]
        );
    }

    #[test]
    fn test_second_callback_queue_is_rejected() {
        let services = NativeServices::desktop();
        let mut level = Level::build("park", LevelInfo::default());

        let err = level
            .add_item(Box::new(CallbackQueueItem::new()))
            .unwrap_err();
        assert!(matches!(err, GameError::DuplicateCallbackQueue(_)));
        assert_eq!(level.item_count(), 1);

        // A call scheduled while draining still waits for the next frame.
        let ran = Arc::new(Mutex::new(0));
        let queue = services.queue().clone();
        let outer = Arc::clone(&ran);
        services.queue().schedule_call(move || {
            let inner = Arc::clone(&outer);
            queue.schedule_call(move || *inner.lock() += 1);
        });
        level.progress(&services, 0.016);
        assert_eq!(*ran.lock(), 0);
    }

    #[test]
    fn test_callback_queue_allowed_again_after_teardown() {
        let mut level = Level::build("park", LevelInfo::default());
        level.teardown();
        assert_eq!(level.add_item(Box::new(CallbackQueueItem::new())).unwrap(), 0);
    }

    #[test]
    fn test_toggle_unknown_item() {
        let services = NativeServices::desktop();
        let mut level = Level::build("park", LevelInfo::default());

        let err = level.toggle_item(&services, 5, true).unwrap_err();
        assert!(matches!(err, GameError::UnknownItem(5)));
    }

    #[test]
    fn test_teardown_keeps_scheduled_calls() {
        let services = NativeServices::desktop();
        let ran = Arc::new(Mutex::new(false));

        let mut level = Level::build("first", LevelInfo::default());
        let flag = Arc::clone(&ran);
        services.queue().schedule_call(move || *flag.lock() = true);
        level.teardown();
        assert_eq!(level.item_count(), 0);

        let mut next = Level::build("second", LevelInfo::default());
        next.progress(&services, 0.016);
        assert!(*ran.lock());
    }
}
