//! Client-side identifier derivation.
//!
//! `rolling_hash` is the 31-multiplier accumulate over UTF-16 code units,
//! masked to 32 bits. Same attribute string, same hash, on every platform.

use beacon_core::constants::LOCAL_ID_PREFIX;
use beacon_core::environment::FingerprintAttributes;
use beacon_core::models::{IdentityRecord, UserIdType};
use chrono::{DateTime, Utc};

/// 32-bit rolling hash over the UTF-16 code units of `input`.
pub fn rolling_hash(input: &str) -> u32 {
    input.encode_utf16().fold(0u32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(u32::from(unit))
    })
}

/// Lower-case base-36 rendering.
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(13);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Build a `local_<hash>_<time>` identifier.
///
/// The hash makes the identifier stable per device; the timestamp separates
/// devices whose attributes collide.
pub fn local_identifier(attributes: &FingerprintAttributes, now: DateTime<Utc>) -> IdentityRecord {
    let hash = rolling_hash(&attributes.canonical_string());
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    IdentityRecord::new(
        format!(
            "{LOCAL_ID_PREFIX}{}_{}",
            to_base36(u64::from(hash)),
            to_base36(millis)
        ),
        UserIdType::Local,
    )
}

/// Extract the hash segment of a local identifier, if it is one.
pub fn hash_segment(user_id: &str) -> Option<&str> {
    user_id
        .strip_prefix(LOCAL_ID_PREFIX)
        .and_then(|rest| rest.split('_').next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hash_of_empty_string_is_zero() {
        assert_eq!(rolling_hash(""), 0);
    }

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 97 * 31 + 98);
        // Overflow wraps instead of saturating.
        let long = "z".repeat(64);
        let expected = long
            .bytes()
            .fold(0u64, |h, b| (h * 31 + u64::from(b)) & 0xFFFF_FFFF);
        assert_eq!(u64::from(rolling_hash(&long)), expected);
    }

    #[test]
    fn base36_renders_lowercase() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u64::from(u32::MAX)), "1z141z3");
    }

    #[test]
    fn local_identifier_layout() {
        let attrs = FingerprintAttributes::default();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let record = local_identifier(&attrs, now);

        assert_eq!(record.user_id_type, UserIdType::Local);
        let expected_hash = to_base36(u64::from(rolling_hash(&attrs.canonical_string())));
        assert_eq!(hash_segment(&record.user_id), Some(expected_hash.as_str()));
        assert!(record.user_id.ends_with(&to_base36(1_700_000_000_000)));
    }
}
