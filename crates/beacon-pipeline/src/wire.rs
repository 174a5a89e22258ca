//! Collector wire format.
//!
//! The body carries the timestamp and every enriched field at the top level.
//! `event_type` travels in the URL and `retry_count` stays local. Custom data
//! is stringified under [`ARBITRARY_DATA_FIELD`] so it can never shadow a
//! reserved field.

use beacon_core::constants::ARBITRARY_DATA_FIELD;
use beacon_core::errors::BeaconResult;
use beacon_core::models::{Event, EventType};
use chrono::SecondsFormat;
use serde_json::{Map, Value};

pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Build the JSON object posted for `event`.
pub fn encode(event: &Event) -> BeaconResult<Map<String, Value>> {
    let mut body = Map::new();
    for (key, value) in &event.enriched_fields {
        body.insert(key.clone(), serde_json::to_value(value)?);
    }
    body.insert(
        TIMESTAMP_FIELD.to_string(),
        Value::String(
            event
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
    );
    if !event.arbitrary_data.is_empty() {
        body.insert(
            ARBITRARY_DATA_FIELD.to_string(),
            Value::String(serde_json::to_string(&event.arbitrary_data)?),
        );
    }
    Ok(body)
}

/// Serialized request body for `event`.
pub fn encode_body(event: &Event) -> BeaconResult<String> {
    Ok(serde_json::to_string(&encode(event)?)?)
}

/// `{api_base}/sites/{site_id}/events/{event_type}`
pub fn event_url(api_base: &str, site_id: &str, event_type: &EventType) -> String {
    format!(
        "{}/sites/{}/events/{}",
        api_base.trim_end_matches('/'),
        site_id,
        event_type.as_str()
    )
}
