//! Delivery engine: one POST per event, never an error.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use beacon_core::config::defaults::{DEFAULT_API_BASE, DEFAULT_SEND_TIMEOUT_MS};
use beacon_core::models::Event;
use beacon_core::traits::EventTransport;
use beacon_core::TrackerOptions;
use tracing::debug;

use crate::wire;

/// Where and how long to send.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySettings {
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_millis(DEFAULT_SEND_TIMEOUT_MS),
        }
    }
}

impl DeliverySettings {
    pub fn from_options(options: &TrackerOptions) -> Self {
        Self {
            api_base: options.api_base.clone(),
            timeout: options.send_timeout(),
        }
    }
}

pub struct DeliveryEngine {
    transport: Arc<dyn EventTransport>,
    site_id: String,
    settings: RwLock<DeliverySettings>,
}

impl DeliveryEngine {
    pub fn new(
        transport: Arc<dyn EventTransport>,
        site_id: impl Into<String>,
        settings: DeliverySettings,
    ) -> Self {
        Self {
            transport,
            site_id: site_id.into(),
            settings: RwLock::new(settings),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn settings(&self) -> DeliverySettings {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_settings(&self, settings: DeliverySettings) {
        *self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
    }

    /// Send one event. `true` only for a 2xx answer within the timeout;
    /// encoding errors, network errors, timeouts and other statuses are all
    /// `false`.
    pub async fn send(&self, event: &Event) -> bool {
        let settings = self.settings();
        let url = wire::event_url(&settings.api_base, &self.site_id, &event.event_type);
        let body = match wire::encode_body(event) {
            Ok(body) => body,
            Err(e) => {
                debug!(url = %url, error = %e, "delivery: payload encoding failed");
                return false;
            }
        };

        match tokio::time::timeout(settings.timeout, self.transport.post_json(&url, body)).await {
            Ok(Ok(response)) if response.is_success() => true,
            Ok(Ok(response)) => {
                debug!(url = %url, status = response.status, "delivery: rejected by collector");
                false
            }
            Ok(Err(e)) => {
                debug!(url = %url, error = %e, "delivery: request failed");
                false
            }
            Err(_) => {
                debug!(
                    url = %url,
                    timeout_ms = u64::try_from(settings.timeout.as_millis()).unwrap_or(u64::MAX),
                    "delivery: timed out"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for DeliveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryEngine")
            .field("site_id", &self.site_id)
            .field("settings", &self.settings())
            .finish()
    }
}
