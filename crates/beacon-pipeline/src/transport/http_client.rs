//! reqwest-backed implementations of the transport traits.
//!
//! No retry loop here: event retries belong to the batcher, and a failed
//! site-config fetch falls back to defaults.

use std::time::Duration;

use async_trait::async_trait;
use beacon_core::constants::VERSION;
use beacon_core::errors::{BeaconError, BeaconResult, TransportError};
use beacon_core::traits::{EventTransport, SiteConfigFetchError, SiteConfigSource, TransportResponse};
use reqwest::header::CONTENT_TYPE;

fn build_client(timeout: Duration) -> BeaconResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("beacon/{VERSION}"))
        .gzip(true)
        .build()
        .map_err(|e| {
            TransportError::InvalidRequest {
                reason: e.to_string(),
            }
            .into()
        })
}

fn classify(error: reqwest::Error, timeout: Duration) -> BeaconError {
    if error.is_timeout() {
        TransportError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
        .into()
    } else {
        TransportError::Network {
            reason: error.to_string(),
        }
        .into()
    }
}

/// Posts event payloads to the collector.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> BeaconResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: String) -> BeaconResult<TransportResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| classify(e, self.timeout))?;
        Ok(TransportResponse {
            status: response.status().as_u16(),
        })
    }
}

/// Fetches `{config_base}/sites/{site_id}.json`.
#[derive(Debug, Clone)]
pub struct HttpSiteConfigSource {
    client: reqwest::Client,
    config_base: String,
}

impl HttpSiteConfigSource {
    pub fn new(config_base: impl Into<String>, timeout: Duration) -> BeaconResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            config_base: config_base.into(),
        })
    }

    pub fn url_for(&self, site_id: &str) -> String {
        format!(
            "{}/sites/{}.json",
            self.config_base.trim_end_matches('/'),
            site_id
        )
    }
}

#[async_trait]
impl SiteConfigSource for HttpSiteConfigSource {
    async fn fetch(&self, site_id: &str) -> Result<String, SiteConfigFetchError> {
        let to_fetch_error = |e: reqwest::Error| {
            if e.is_timeout() {
                SiteConfigFetchError::Timeout
            } else {
                SiteConfigFetchError::Network(e.to_string())
            }
        };
        let response = self
            .client
            .get(self.url_for(site_id))
            .send()
            .await
            .map_err(to_fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SiteConfigFetchError::Network(format!("HTTP {status}")));
        }
        response.text().await.map_err(to_fetch_error)
    }
}
