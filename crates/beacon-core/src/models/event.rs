use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EventType, Scalar};

/// Tracker-produced metadata attached to every event.
pub type EnrichedFields = BTreeMap<String, Scalar>;

/// Caller-supplied custom data. Kept apart from the reserved fields.
pub type ArbitraryData = Map<String, Value>;

/// One trackable action waiting for delivery.
///
/// The only mutation after creation is [`Event::record_failure`], so
/// `retry_count` never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    retry_count: u32,
    pub enriched_fields: EnrichedFields,
    pub arbitrary_data: ArbitraryData,
}

impl Event {
    /// Create an event stamped with the current time.
    pub fn new(event_type: EventType) -> Self {
        Self::at(event_type, Utc::now())
    }

    /// Create an event with an explicit timestamp.
    pub fn at(event_type: EventType, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_type,
            timestamp,
            retry_count: 0,
            enriched_fields: EnrichedFields::new(),
            arbitrary_data: ArbitraryData::new(),
        }
    }

    pub fn with_enriched(mut self, fields: EnrichedFields) -> Self {
        self.enriched_fields.extend(fields);
        self
    }

    pub fn with_data(mut self, data: ArbitraryData) -> Self {
        self.arbitrary_data = data;
        self
    }

    /// Insert a single enrichment field.
    pub fn enrich(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.enriched_fields.insert(key.into(), value.into());
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Count one failed delivery attempt. Returns the new count.
    pub fn record_failure(&mut self) -> u32 {
        self.retry_count = self.retry_count.saturating_add(1);
        self.retry_count
    }

    /// Whether the event may go back on the queue after its latest failure.
    pub fn can_retry(&self, max_retries: u32) -> bool {
        self.retry_count < max_retries
    }
}
