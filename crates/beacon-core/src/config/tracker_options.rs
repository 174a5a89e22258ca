use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::defaults;
use crate::errors::{BeaconResult, ConfigError};

/// Page-facing camelCase names accepted for the snake_case fields.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("apiBase", "api_base"),
    ("maxRetries", "max_retries"),
    ("batchSize", "batch_size"),
    ("batchTimeout", "batch_timeout_ms"),
];

fn canonical_key(key: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, field)| field)
}

/// Options for one tracker instance.
///
/// Loaded from TOML or built in code, then patched at runtime by `config`
/// commands through [`TrackerOptions::apply_patch`]. The page API's
/// camelCase names (`batchSize`, `batchTimeout`, ...) are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerOptions {
    /// Collector base URL.
    #[serde(alias = "apiBase")]
    pub api_base: String,
    /// Site-configuration service base URL.
    pub config_base: String,
    /// Delivery attempts before an event is dropped.
    #[serde(alias = "maxRetries")]
    pub max_retries: u32,
    /// Queue length that triggers an immediate flush.
    #[serde(alias = "batchSize")]
    pub batch_size: usize,
    /// Period of the recurring flush timer, in milliseconds.
    #[serde(alias = "batchTimeout")]
    pub batch_timeout_ms: u64,
    /// Upper bound on a single event delivery, in milliseconds.
    pub send_timeout_ms: u64,
    /// Upper bound on the site-configuration fetch, in milliseconds.
    pub config_timeout_ms: u64,
    /// Upper bound on each storage connect/get/set, in milliseconds.
    pub storage_timeout_ms: u64,
    /// Upper bound on fingerprint provider load plus lookup, in milliseconds.
    pub fingerprint_timeout_ms: u64,
    /// Region passed to the fingerprint provider on load.
    pub fingerprint_region: String,
    /// Verbose diagnostics.
    pub debug: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            api_base: defaults::DEFAULT_API_BASE.to_string(),
            config_base: defaults::DEFAULT_CONFIG_BASE.to_string(),
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            batch_size: defaults::DEFAULT_BATCH_SIZE,
            batch_timeout_ms: defaults::DEFAULT_BATCH_TIMEOUT_MS,
            send_timeout_ms: defaults::DEFAULT_SEND_TIMEOUT_MS,
            config_timeout_ms: defaults::DEFAULT_CONFIG_TIMEOUT_MS,
            storage_timeout_ms: defaults::DEFAULT_STORAGE_TIMEOUT_MS,
            fingerprint_timeout_ms: defaults::DEFAULT_FINGERPRINT_TIMEOUT_MS,
            fingerprint_region: defaults::DEFAULT_FINGERPRINT_REGION.to_string(),
            debug: defaults::DEFAULT_DEBUG,
        }
    }
}

impl TrackerOptions {
    /// Parse options from TOML. Missing keys take their defaults.
    pub fn from_toml(input: &str) -> BeaconResult<Self> {
        let options: Self = toml::from_str(input).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Shallow-merge a patch into these options.
    ///
    /// Top-level keys replace the current values; camelCase aliases land on
    /// their snake_case field. On any error the options are left untouched.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> BeaconResult<()> {
        let mut merged = match serde_json::to_value(&*self) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(ConfigError::InvalidPatch {
                    reason: format!("options serialized to a non-object: {other}"),
                }
                .into())
            }
            Err(e) => {
                return Err(ConfigError::InvalidPatch {
                    reason: e.to_string(),
                }
                .into())
            }
        };
        for (key, value) in patch {
            merged.insert(canonical_key(key).to_string(), value.clone());
        }
        let updated: Self =
            serde_json::from_value(Value::Object(merged)).map_err(|e| ConfigError::InvalidPatch {
                reason: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> BeaconResult<()> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size".into(),
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.batch_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_timeout_ms".into(),
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.api_base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base".into(),
                reason: "must not be empty".into(),
            }
            .into());
        }
        Ok(())
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn config_timeout(&self) -> Duration {
        Duration::from_millis(self.config_timeout_ms)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    pub fn fingerprint_timeout(&self) -> Duration {
        Duration::from_millis(self.fingerprint_timeout_ms)
    }
}
