use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::defaults;

/// Per-site settings served by the configuration service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Whether the fingerprint provider may be consulted for identity.
    #[serde(default)]
    pub enable_fingerprint: bool,
    /// Any further keys the service returns, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteConfig {
    pub fn with_fingerprint(enable_fingerprint: bool) -> Self {
        Self {
            enable_fingerprint,
            extra: Map::new(),
        }
    }

    /// Parse a configuration body. Empty bodies are treated as malformed.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(serde::de::Error::custom("empty configuration body"));
        }
        serde_json::from_str(trimmed)
    }
}

/// How a site-configuration fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteConfigFailure {
    /// The service answered but the body was empty or not a config object.
    Malformed,
    /// The service could not be reached or a non-success status came back.
    Network,
    /// The fetch did not complete within the configured timeout.
    Timeout,
}

/// Defaults substituted when the site configuration cannot be loaded.
///
/// The two failure families default differently: a malformed answer disables
/// fingerprinting, an unreachable service enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteConfigDefaults {
    pub on_parse_failure: bool,
    pub on_network_failure: bool,
}

impl Default for SiteConfigDefaults {
    fn default() -> Self {
        Self {
            on_parse_failure: defaults::DEFAULT_FINGERPRINT_ON_PARSE_FAILURE,
            on_network_failure: defaults::DEFAULT_FINGERPRINT_ON_NETWORK_FAILURE,
        }
    }
}

impl SiteConfigDefaults {
    /// The configuration to use after a failure of the given kind.
    pub fn for_failure(&self, failure: SiteConfigFailure) -> SiteConfig {
        let enable = match failure {
            SiteConfigFailure::Malformed => self.on_parse_failure,
            SiteConfigFailure::Network | SiteConfigFailure::Timeout => self.on_network_failure,
        };
        SiteConfig::with_fingerprint(enable)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::with_fingerprint(false)
    }
}
