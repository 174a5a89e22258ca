//! Enrichment invariants over generated page states.

use beacon_core::models::{IdentityRecord, Scalar, SessionDescriptor, UserIdType};
use beacon_core::EnvironmentSnapshot;
use beacon_tracker::enrichment::browser_fields;
use proptest::prelude::*;

proptest! {
    #[test]
    fn scroll_percent_is_clamped(
        page_height in 0u32..100_000,
        viewport_height in 0u32..10_000,
        scroll_top in -5_000.0f64..200_000.0,
    ) {
        let snapshot = EnvironmentSnapshot {
            page_height,
            viewport_height,
            scroll_top,
            ..EnvironmentSnapshot::default()
        };
        let fields = browser_fields(
            &snapshot,
            &SessionDescriptor::new(),
            &IdentityRecord::new("u", UserIdType::Local),
        );
        let Some(Scalar::Float(percent)) = fields.get("browser_scroll_percent") else {
            panic!("scroll percent should be a float");
        };
        prop_assert!((0.0..=100.0).contains(percent));
    }

    #[test]
    fn every_field_is_namespaced(language in "[a-z]{2}(-[A-Z]{2})?") {
        let snapshot = EnvironmentSnapshot {
            language,
            ..EnvironmentSnapshot::default()
        };
        let fields = browser_fields(
            &snapshot,
            &SessionDescriptor::new(),
            &IdentityRecord::new("u", UserIdType::Fingerprint),
        );
        prop_assert!(fields.keys().all(|k| k.starts_with("browser_")));
    }
}
