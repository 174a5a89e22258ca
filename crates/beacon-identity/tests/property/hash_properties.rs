use beacon_core::environment::FingerprintAttributes;
use beacon_identity::local_hash::hash_segment;
use beacon_identity::{local_identifier, rolling_hash, to_base36};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn attributes(user_agent: String, language: String, width: u32, cores: u32) -> FingerprintAttributes {
    FingerprintAttributes {
        user_agent,
        language,
        screen_width: width,
        hardware_concurrency: cores,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn same_attributes_same_hash_segment(
        ua in ".{0,80}",
        lang in "[a-z]{2}(-[A-Z]{2})?",
        width in 0u32..8000,
        cores in 1u32..128,
        t1 in 0i64..4_000_000_000_000,
        t2 in 0i64..4_000_000_000_000,
    ) {
        let attrs = attributes(ua, lang, width, cores);
        let a = local_identifier(&attrs, Utc.timestamp_millis_opt(t1).unwrap());
        let b = local_identifier(&attrs, Utc.timestamp_millis_opt(t2).unwrap());
        prop_assert_eq!(hash_segment(&a.user_id), hash_segment(&b.user_id));
        prop_assert!(a.user_id.starts_with("local_"));
    }

    #[test]
    fn hash_matches_wide_reference(s in ".{0,200}") {
        let reference = s
            .encode_utf16()
            .fold(0u64, |h, unit| (h.wrapping_mul(31) + u64::from(unit)) & 0xFFFF_FFFF);
        prop_assert_eq!(u64::from(rolling_hash(&s)), reference);
    }

    #[test]
    fn base36_round_trips(v in any::<u64>()) {
        let rendered = to_base36(v);
        prop_assert_eq!(u64::from_str_radix(&rendered, 36).unwrap(), v);
    }
}
