//! The item sending the game to the background when the back button is
//! released, like the home button does.

use crate::item::{Item, ItemContext, Key};

/// Turns the back button into the home button on platforms having a home
/// screen. Elsewhere the key is left to the other items.
#[derive(Debug, Default)]
pub struct BackButtonHomeItem;

impl Item for BackButtonHomeItem {
    fn name(&self) -> &'static str {
        "back_button_home_item"
    }

    fn key_released(&mut self, ctx: &ItemContext<'_>, key: Key) -> bool {
        if key != Key::Back {
            return false;
        }

        let activity = ctx.services().activity();
        if !activity.has_home_screen() {
            return false;
        }

        activity.show_home();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgp_platform::{LevelInfo, NativeServices, PlatformConfig, PlatformThread};

    #[test]
    fn test_back_shows_home_on_mobile() {
        let (services, platform) = NativeServices::with_activity(|invoker| {
            PlatformThread::spawn(PlatformConfig::default(), invoker)
        })
        .unwrap();
        let ctx = ItemContext::new(&services, LevelInfo::default());
        let mut item = BackButtonHomeItem;

        assert!(!item.key_released(&ctx, Key::Escape));
        assert!(item.key_released(&ctx, Key::Back));

        platform.flush().unwrap();
        assert_eq!(platform.log().home_requests, 1);
    }

    #[test]
    fn test_back_ignored_on_desktop() {
        let services = NativeServices::desktop();
        let ctx = ItemContext::new(&services, LevelInfo::default());
        let mut item = BackButtonHomeItem;

        assert!(!item.key_released(&ctx, Key::Back));
    }
}
