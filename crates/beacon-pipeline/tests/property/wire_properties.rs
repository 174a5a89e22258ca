//! Wire payload properties over generated events.

use beacon_core::models::{Event, EventType};
use beacon_pipeline::wire;
use proptest::prelude::*;
use serde_json::{Map, Value};

proptest! {
    #[test]
    fn arbitrary_data_survives_stringification(
        entries in proptest::collection::btree_map("[a-z_]{1,10}", ".{0,24}", 1..8),
        numbers in proptest::collection::btree_map("[A-Z]{1,6}", any::<i64>(), 0..4),
    ) {
        let mut data = Map::new();
        for (k, v) in &entries {
            data.insert(k.clone(), Value::String(v.clone()));
        }
        for (k, v) in &numbers {
            data.insert(k.clone(), Value::from(*v));
        }
        let event = Event::new(EventType::Click).with_data(data.clone());

        let body = wire::encode(&event).unwrap();
        let raw = body["arbitrary_data"].as_str().unwrap();
        let decoded: Map<String, Value> = serde_json::from_str(raw).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn enriched_fields_are_flattened(
        fields in proptest::collection::btree_map("browser_[a-z]{1,10}", ".{0,16}", 0..10),
    ) {
        let mut event = Event::new(EventType::Engagement);
        for (k, v) in &fields {
            event.enrich(k.clone(), v.clone());
        }
        let body = wire::encode(&event).unwrap();
        prop_assert_eq!(body.len(), fields.len() + 1);
        for (k, v) in &fields {
            prop_assert_eq!(&body[k], &Value::String(v.clone()));
        }
    }
}
