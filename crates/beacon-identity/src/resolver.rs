//! IdentityResolver: ordered fallback chain for the durable user identifier.
//!
//! Chain: stored identifier → fingerprint provider → local hash.
//! Each fallback is recorded as a `DegradationEvent` on the returned
//! [`Resolution`]; nothing short of a missing environment aborts the chain.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use beacon_core::constants::USER_ID_STORAGE_KEY;
use beacon_core::errors::{BeaconError, BeaconResult, IdentityError, StorageError};
use beacon_core::models::{DegradationEvent, IdentityRecord, UserIdType};
use beacon_core::traits::{CrossTabStorage, Environment, FingerprintProvider};
use beacon_core::SiteConfig;
use chrono::Utc;
use tracing::{debug, warn};

use crate::local_hash::local_identifier;

const COMPONENT: &str = "identity";

/// Result of a completed resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub record: IdentityRecord,
    /// Whether the identifier is known to be in storage.
    pub persisted: bool,
    /// Steps that failed on the way to `record`.
    pub degradations: Vec<DegradationEvent>,
}

/// Resolves the user identity for one tracker instance.
pub struct IdentityResolver {
    storage: Option<Arc<dyn CrossTabStorage>>,
    fingerprint: Option<Arc<dyn FingerprintProvider>>,
    environment: Arc<dyn Environment>,
    storage_timeout: Duration,
    fingerprint_timeout: Duration,
    fingerprint_region: String,
}

impl IdentityResolver {
    /// Create a resolver. `storage` is `None` when the storage hub never
    /// connected; identities are then returned unpersisted.
    pub fn new(environment: Arc<dyn Environment>) -> Self {
        Self {
            storage: None,
            fingerprint: None,
            environment,
            storage_timeout: Duration::from_millis(
                beacon_core::config::defaults::DEFAULT_STORAGE_TIMEOUT_MS,
            ),
            fingerprint_timeout: Duration::from_millis(
                beacon_core::config::defaults::DEFAULT_FINGERPRINT_TIMEOUT_MS,
            ),
            fingerprint_region: beacon_core::config::defaults::DEFAULT_FINGERPRINT_REGION
                .to_string(),
        }
    }

    pub fn with_storage(mut self, storage: Option<Arc<dyn CrossTabStorage>>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_fingerprint(mut self, provider: Option<Arc<dyn FingerprintProvider>>) -> Self {
        self.fingerprint = provider;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn with_fingerprint_timeout(mut self, timeout: Duration) -> Self {
        self.fingerprint_timeout = timeout;
        self
    }

    pub fn with_fingerprint_region(mut self, region: impl Into<String>) -> Self {
        self.fingerprint_region = region.into();
        self
    }

    /// Run the fallback chain.
    ///
    /// Returns an error only when no identifier could be produced at all.
    pub async fn resolve(&self, site_config: &SiteConfig) -> BeaconResult<Resolution> {
        let mut degradations = Vec::new();

        // 1. Previously stored identifier wins unchanged.
        match self.read_stored().await {
            Ok(Some(user_id)) => {
                let record = IdentityRecord::from_stored(user_id);
                debug!(
                    user_id_type = record.user_id_type.as_str(),
                    "identity: using stored identifier"
                );
                return Ok(Resolution {
                    record,
                    persisted: true,
                    degradations,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "identity: stored identifier unreadable");
                degradations.push(DegradationEvent::now(
                    COMPONENT,
                    format!("storage read failed: {e}"),
                    "fresh identifier",
                ));
            }
        }

        // 2. Fingerprint provider, when the site allows it.
        if site_config.enable_fingerprint {
            match self.fingerprint_identifier().await {
                Ok(Some(visitor_id)) => {
                    let record = IdentityRecord::new(visitor_id, UserIdType::Fingerprint);
                    let persisted = self.persist(&record, &mut degradations).await;
                    return Ok(Resolution {
                        record,
                        persisted,
                        degradations,
                    });
                }
                Ok(None) => {
                    debug!("identity: fingerprinting enabled but no provider configured");
                }
                Err(e) => {
                    warn!(error = %e, "identity: fingerprint failed, deriving local identifier");
                    degradations.push(DegradationEvent::now(
                        COMPONENT,
                        e.to_string(),
                        "local hash",
                    ));
                }
            }
        }

        // 3. Local environment hash.
        let attributes = self.environment.fingerprint_attributes().map_err(|e| {
            BeaconError::from(IdentityError::Exhausted {
                reason: e.to_string(),
            })
        })?;
        let record = local_identifier(&attributes, Utc::now());
        let persisted = self.persist(&record, &mut degradations).await;
        Ok(Resolution {
            record,
            persisted,
            degradations,
        })
    }

    async fn read_stored(&self) -> BeaconResult<Option<String>> {
        let Some(storage) = &self.storage else {
            return Ok(None);
        };
        let stored = self
            .bounded("get", storage.get(USER_ID_STORAGE_KEY))
            .await?;
        Ok(stored.filter(|id| !id.is_empty()))
    }

    /// `Ok(None)` when no provider is wired in.
    async fn fingerprint_identifier(&self) -> BeaconResult<Option<String>> {
        let Some(provider) = &self.fingerprint else {
            return Ok(None);
        };
        let lookup = async {
            let agent = provider.load(&self.fingerprint_region).await.map_err(|e| {
                BeaconError::from(IdentityError::FingerprintLoadFailed {
                    reason: e.to_string(),
                })
            })?;
            let result = agent.get().await.map_err(|e| {
                BeaconError::from(IdentityError::FingerprintFailed {
                    reason: e.to_string(),
                })
            })?;
            Ok::<_, BeaconError>(result.visitor_id)
        };
        let visitor_id = tokio::time::timeout(self.fingerprint_timeout, lookup)
            .await
            .map_err(|_| IdentityError::FingerprintFailed {
                reason: format!("timed out after {}ms", self.fingerprint_timeout.as_millis()),
            })??;
        if visitor_id.is_empty() {
            return Err(IdentityError::FingerprintFailed {
                reason: "provider returned an empty visitor id".into(),
            }
            .into());
        }
        Ok(Some(visitor_id))
    }

    /// Write the identifier; a failure leaves it usable for this page only.
    async fn persist(
        &self,
        record: &IdentityRecord,
        degradations: &mut Vec<DegradationEvent>,
    ) -> bool {
        let result = match &self.storage {
            Some(storage) => {
                self.bounded("set", storage.set(USER_ID_STORAGE_KEY, &record.user_id))
                    .await
            }
            None => Err(StorageError::NotConnected.into()),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "identity: persisting identifier failed, keeping it for this page");
                degradations.push(DegradationEvent::now(
                    COMPONENT,
                    format!("storage write failed: {e}"),
                    "unpersisted identifier",
                ));
                false
            }
        }
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = BeaconResult<T>>,
    ) -> BeaconResult<T> {
        tokio::time::timeout(self.storage_timeout, fut)
            .await
            .map_err(|_| {
                BeaconError::from(StorageError::Timeout {
                    operation: operation.to_string(),
                    timeout_ms: u64::try_from(self.storage_timeout.as_millis()).unwrap_or(u64::MAX),
                })
            })?
    }
}
