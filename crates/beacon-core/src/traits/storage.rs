use async_trait::async_trait;

use crate::errors::BeaconResult;

/// Key/value storage shared across tabs and origins.
#[async_trait]
pub trait CrossTabStorage: Send + Sync {
    /// Resolves once the storage hub is ready to serve requests.
    async fn on_connect(&self) -> BeaconResult<()>;

    async fn get(&self, key: &str) -> BeaconResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> BeaconResult<()>;
}
