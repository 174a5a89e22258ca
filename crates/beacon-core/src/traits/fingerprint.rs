use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::BeaconResult;

/// What the fingerprint provider returns for the current visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintResult {
    #[serde(rename = "visitorId")]
    pub visitor_id: String,
}

/// A loaded fingerprint agent.
#[async_trait]
pub trait FingerprintAgent: Send + Sync {
    async fn get(&self) -> BeaconResult<FingerprintResult>;
}

/// Loads fingerprint agents for a region.
#[async_trait]
pub trait FingerprintProvider: Send + Sync {
    async fn load(&self, region: &str) -> BeaconResult<Box<dyn FingerprintAgent>>;
}
