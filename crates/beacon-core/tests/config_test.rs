use beacon_core::config::*;
use beacon_core::errors::{BeaconError, ConfigError};
use serde_json::json;

#[test]
fn options_load_from_empty_toml_with_all_defaults() {
    let options = TrackerOptions::from_toml("").unwrap();

    assert_eq!(options.api_base, "https://events.data.platformance.io");
    assert_eq!(options.max_retries, 3);
    assert_eq!(options.batch_size, 10);
    assert_eq!(options.batch_timeout_ms, 1_000);
    assert_eq!(options.send_timeout_ms, 5_000);
    assert!(!options.debug);
    assert_eq!(options, TrackerOptions::default());
}

#[test]
fn options_load_partial_toml_with_overrides() {
    let toml = r#"
api_base = "https://collector.example.test"
batch_size = 25
debug = true
"#;
    let options = TrackerOptions::from_toml(toml).unwrap();
    assert_eq!(options.api_base, "https://collector.example.test");
    assert_eq!(options.batch_size, 25);
    assert!(options.debug);
    // Non-overridden fields keep defaults
    assert_eq!(options.max_retries, 3);
    assert_eq!(options.batch_timeout_ms, 1_000);
}

#[test]
fn options_reject_unknown_toml_keys() {
    let result = TrackerOptions::from_toml("batch_sise = 4");
    assert!(matches!(
        result,
        Err(BeaconError::ConfigError(ConfigError::ParseFailed { .. }))
    ));
}

#[test]
fn options_reject_zero_batch_size() {
    let result = TrackerOptions::from_toml("batch_size = 0");
    assert!(matches!(
        result,
        Err(BeaconError::ConfigError(ConfigError::InvalidValue { .. }))
    ));
}

#[test]
fn patch_shallow_merges_top_level_keys() {
    let mut options = TrackerOptions::default();
    let patch = json!({ "batch_size": 2, "debug": true });
    options.apply_patch(patch.as_object().unwrap()).unwrap();

    assert_eq!(options.batch_size, 2);
    assert!(options.debug);
    assert_eq!(options.max_retries, 3);
}

#[test]
fn patch_accepts_page_camel_case_names() {
    let mut options = TrackerOptions::default();
    let patch = json!({
        "batchSize": 5,
        "maxRetries": 1,
        "batchTimeout": 250,
        "apiBase": "https://collector.example.test"
    });
    options.apply_patch(patch.as_object().unwrap()).unwrap();

    assert_eq!(options.batch_size, 5);
    assert_eq!(options.max_retries, 1);
    assert_eq!(options.batch_timeout_ms, 250);
    assert_eq!(options.api_base, "https://collector.example.test");

    // Serialized back under the snake_case names only.
    let value = serde_json::to_value(&options).unwrap();
    assert_eq!(value["batch_size"], json!(5));
    assert!(value.get("batchSize").is_none());
}

#[test]
fn toml_accepts_camel_case_names() {
    let options = TrackerOptions::from_toml("batchSize = 7\nbatchTimeout = 400").unwrap();
    assert_eq!(options.batch_size, 7);
    assert_eq!(options.batch_timeout_ms, 400);
}

#[test]
fn rejected_patch_leaves_options_untouched() {
    let mut options = TrackerOptions::default();
    let before = options.clone();

    let wrong_type = json!({ "batch_size": "lots" });
    assert!(options.apply_patch(wrong_type.as_object().unwrap()).is_err());

    let unknown_key = json!({ "batch_size": 4, "colour": "blue" });
    assert!(options.apply_patch(unknown_key.as_object().unwrap()).is_err());

    let invalid_value = json!({ "batch_size": 0 });
    assert!(options.apply_patch(invalid_value.as_object().unwrap()).is_err());

    assert_eq!(options, before);
}

#[test]
fn options_serde_roundtrip_through_toml() {
    let options = TrackerOptions {
        batch_size: 7,
        ..Default::default()
    };
    let toml_str = toml::to_string(&options).unwrap();
    let roundtripped = TrackerOptions::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped, options);
}
