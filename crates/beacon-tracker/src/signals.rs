//! Page signals and the events they produce.

use beacon_core::constants::MAX_ELEMENT_TEXT_CHARS;
use beacon_core::models::{EnrichedFields, EventType};
use serde::{Deserialize, Serialize};

/// The element a click landed on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickTarget {
    pub tag: String,
    pub id: String,
    pub class: String,
    pub text: String,
    /// Host of the closest enclosing link, if any.
    pub link_host: Option<String>,
}

impl ClickTarget {
    fn descriptors(&self) -> EnrichedFields {
        let mut fields = EnrichedFields::new();
        fields.insert("browser_element_tag".into(), self.tag.to_lowercase().into());
        fields.insert("browser_element_id".into(), self.id.as_str().into());
        fields.insert("browser_element_class".into(), self.class.as_str().into());
        fields.insert(
            "browser_element_text".into(),
            self.text
                .chars()
                .take(MAX_ELEMENT_TEXT_CHARS)
                .collect::<String>()
                .into(),
        );
        fields
    }
}

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageSignal {
    Click(ClickTarget),
    VisibilityChange { hidden: bool },
    Focus,
    BeforeUnload,
}

impl PageSignal {
    /// Events to emit, with their signal-specific fields.
    ///
    /// A click on a link to another host yields both `click` and `exit`.
    pub fn events(&self, page_host: &str) -> Vec<(EventType, EnrichedFields)> {
        match self {
            PageSignal::Click(target) => {
                let mut out = vec![(EventType::Click, target.descriptors())];
                let external = target
                    .link_host
                    .as_deref()
                    .is_some_and(|host| !host.is_empty() && host != page_host);
                if external {
                    out.push((EventType::Exit, EnrichedFields::new()));
                }
                out
            }
            PageSignal::VisibilityChange { hidden: true } => {
                vec![(EventType::Close, EnrichedFields::new())]
            }
            PageSignal::VisibilityChange { hidden: false } => Vec::new(),
            PageSignal::Focus => vec![(EventType::Engagement, EnrichedFields::new())],
            PageSignal::BeforeUnload => vec![(EventType::SessionEnd, EnrichedFields::new())],
        }
    }
}
