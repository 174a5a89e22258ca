use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::CUSTOM_EVENT_PREFIX;
use crate::errors::{BeaconError, BeaconResult};

/// Kind of a tracked event.
///
/// Built-in kinds map to fixed wire names. Anything else is a custom event,
/// always stored with the `custom_` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventType {
    SessionStart,
    Impression,
    ViewableImpression,
    Engagement,
    Click,
    Exit,
    Close,
    SessionEnd,
    Custom(String),
}

impl EventType {
    /// Every built-in kind, in declaration order.
    pub const BUILT_IN: [EventType; 8] = [
        EventType::SessionStart,
        EventType::Impression,
        EventType::ViewableImpression,
        EventType::Engagement,
        EventType::Click,
        EventType::Exit,
        EventType::Close,
        EventType::SessionEnd,
    ];

    /// Validate and normalize a caller-supplied event name.
    pub fn parse(raw: &str) -> BeaconResult<Self> {
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(BeaconError::InvalidEventType {
                event_type: raw.to_string(),
            });
        }

        if let Some(built_in) = Self::BUILT_IN.iter().find(|t| t.as_str() == raw) {
            return Ok(built_in.clone());
        }

        if raw.starts_with(CUSTOM_EVENT_PREFIX) {
            Ok(EventType::Custom(raw.to_string()))
        } else {
            Ok(EventType::Custom(format!("{CUSTOM_EVENT_PREFIX}{raw}")))
        }
    }

    /// Wire name of this event kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::SessionStart => "session_start",
            EventType::Impression => "impression",
            EventType::ViewableImpression => "viewable_impression",
            EventType::Engagement => "engagement",
            EventType::Click => "click",
            EventType::Exit => "exit",
            EventType::Close => "close",
            EventType::SessionEnd => "session_end",
            EventType::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for EventType {
    type Error = BeaconError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EventType::parse(&value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_names_round_trip() {
        for kind in EventType::BUILT_IN.iter() {
            assert_eq!(&EventType::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn custom_names_gain_prefix_once() {
        assert_eq!(
            EventType::parse("signup").unwrap(),
            EventType::Custom("custom_signup".into())
        );
        assert_eq!(
            EventType::parse("custom_signup").unwrap(),
            EventType::Custom("custom_signup".into())
        );
    }

    #[test]
    fn malformed_names_are_rejected() {
        for raw in ["", "has space", "a/b", "ünïcode"] {
            assert!(
                matches!(
                    EventType::parse(raw),
                    Err(BeaconError::InvalidEventType { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }
}
