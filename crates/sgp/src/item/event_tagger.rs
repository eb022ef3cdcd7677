//! An item tagging an analytics event each time it is toggled.

use sgp_platform::{make_event_property, tag_event, tag_level_event, EventProperties};

use crate::error::{GameError, GameResult};
use crate::item::{Item, ItemContext};

/// Tags `event_type` with its properties and `state=on|off` when toggled.
#[derive(Debug, Clone)]
pub struct EventTagger {
    event_type: String,
    properties: EventProperties,
    tag_level_info: bool,
}

impl EventTagger {
    /// Creates a tagger for `event_type`, without properties.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            properties: EventProperties::new(),
            tag_level_info: false,
        }
    }

    /// Also tags the level and serial numbers.
    #[must_use]
    pub fn with_level_info(mut self, on: bool) -> Self {
        self.tag_level_info = on;
        self
    }

    /// Sets the properties from a flat `[name, value, name, value, ...]` list.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidField`] if the list has an odd length. The
    /// previous properties are kept in that case.
    pub fn set_properties<S: AsRef<str>>(&mut self, flat: &[S]) -> GameResult<()> {
        if flat.len() % 2 != 0 {
            return Err(GameError::InvalidField {
                item: "event_tagger",
                field: "event_tagger.properties",
                reason: format!("expected name/value pairs, got {} strings", flat.len()),
            });
        }

        self.properties = flat
            .chunks_exact(2)
            .map(|pair| make_event_property(pair[0].as_ref(), pair[1].as_ref()))
            .collect();
        Ok(())
    }

    /// The configured event type.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The configured properties.
    #[must_use]
    pub fn properties(&self) -> &EventProperties {
        &self.properties
    }
}

impl Item for EventTagger {
    fn name(&self) -> &'static str {
        "event_tagger"
    }

    fn toggle(&mut self, ctx: &ItemContext<'_>, on: bool) {
        let mut properties = self.properties.clone();
        properties.push(make_event_property("state", if on { "on" } else { "off" }));

        let activity = ctx.services().activity();
        if self.tag_level_info {
            tag_level_event(activity, &self.event_type, &properties, ctx.level());
        } else {
            tag_event(activity, &self.event_type, &properties);
        }
    }
}
