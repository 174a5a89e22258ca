use async_trait::async_trait;

use crate::errors::BeaconResult;

/// Outcome of an HTTP exchange that reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts JSON bodies to the collector.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: String) -> BeaconResult<TransportResponse>;
}
