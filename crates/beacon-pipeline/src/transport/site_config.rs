//! Site-configuration loading with timeout and failure defaults.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::config::{SiteConfig, SiteConfigDefaults, SiteConfigFailure};
use beacon_core::traits::{SiteConfigFetchError, SiteConfigSource};
use tracing::{debug, warn};

/// The configuration in effect and, if it is a default, why.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSiteConfig {
    pub config: SiteConfig,
    pub failure: Option<SiteConfigFailure>,
}

impl LoadedSiteConfig {
    pub fn is_default(&self) -> bool {
        self.failure.is_some()
    }
}

pub struct SiteConfigLoader {
    source: Arc<dyn SiteConfigSource>,
    defaults: SiteConfigDefaults,
    timeout: Duration,
}

impl SiteConfigLoader {
    pub fn new(source: Arc<dyn SiteConfigSource>, timeout: Duration) -> Self {
        Self {
            source,
            defaults: SiteConfigDefaults::default(),
            timeout,
        }
    }

    pub fn with_defaults(mut self, defaults: SiteConfigDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Fetch and parse. Never fails: every failure mode maps to its default.
    pub async fn load(&self, site_id: &str) -> LoadedSiteConfig {
        let fetched = tokio::time::timeout(self.timeout, self.source.fetch(site_id)).await;
        let failure = match fetched {
            Ok(Ok(body)) => match SiteConfig::parse(&body) {
                Ok(config) => {
                    debug!(site_id, enable_fingerprint = config.enable_fingerprint, "site config loaded");
                    return LoadedSiteConfig {
                        config,
                        failure: None,
                    };
                }
                Err(e) => {
                    warn!(site_id, error = %e, "site config malformed, using parse-failure default");
                    SiteConfigFailure::Malformed
                }
            },
            Ok(Err(SiteConfigFetchError::Network(reason))) => {
                warn!(site_id, reason = %reason, "site config unreachable, using network-failure default");
                SiteConfigFailure::Network
            }
            Ok(Err(SiteConfigFetchError::Timeout)) | Err(_) => {
                warn!(
                    site_id,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "site config timed out, using network-failure default"
                );
                SiteConfigFailure::Timeout
            }
        };
        LoadedSiteConfig {
            config: self.defaults.for_failure(failure),
            failure: Some(failure),
        }
    }
}

impl std::fmt::Debug for SiteConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfigLoader")
            .field("defaults", &self.defaults)
            .field("timeout", &self.timeout)
            .finish()
    }
}
