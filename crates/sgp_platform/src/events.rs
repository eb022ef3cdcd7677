//! # Analytics Events
//!
//! Tags sent to the analytics service of the platform. An event is a type
//! name plus an ordered list of string properties.

use std::fmt;

use crate::activity::Activity;

/// One `name=value` pair attached to an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventProperty {
    /// Property name.
    pub name: String,
    /// Property value.
    pub value: String,
}

impl fmt::Display for EventProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The properties of an event, in insertion order.
pub type EventProperties = Vec<EventProperty>;

/// Builds a property from anything printable.
pub fn make_event_property(name: impl Into<String>, value: impl ToString) -> EventProperty {
    EventProperty {
        name: name.into(),
        value: value.to_string(),
    }
}

/// Where the player is, attached to level events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelInfo {
    /// Number of the level in its serial.
    pub level_number: u32,
    /// Number of the serial (the park area) the level belongs to.
    pub serial_number: u32,
}

/// Tags `event_type` with `properties`.
pub fn tag_event(activity: &dyn Activity, event_type: &str, properties: &EventProperties) {
    tracing::trace!(event_type, count = properties.len(), "tagging event");
    activity.tag_event(event_type, properties);
}

/// Tags `event_type` with `properties` followed by the level and serial.
pub fn tag_level_event(
    activity: &dyn Activity,
    event_type: &str,
    properties: &EventProperties,
    level: LevelInfo,
) {
    let mut properties = properties.clone();
    properties.push(make_event_property("level", level.level_number));
    properties.push(make_event_property("serial", level.serial_number));

    tag_event(activity, event_type, &properties);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::DesktopActivity;

    #[test]
    fn test_make_event_property_formats_value() {
        let property = make_event_property("score", 1200);
        assert_eq!(property.value, "1200");
        assert_eq!(property.to_string(), "score=1200");
    }

    #[test]
    fn test_tag_level_event_appends_level_and_serial() {
        let activity = DesktopActivity::default();
        let properties = vec![make_event_property("state", "on")];

        tag_level_event(
            &activity,
            "level-started",
            &properties,
            LevelInfo {
                level_number: 3,
                serial_number: 2,
            },
        );

        let events = activity.log().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "level-started");
        assert_eq!(
            events[0].properties,
            vec![
                make_event_property("state", "on"),
                make_event_property("level", 3),
                make_event_property("serial", 2),
            ]
        );
    }
}
