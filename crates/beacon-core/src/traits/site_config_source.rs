use async_trait::async_trait;

/// Why a raw site-configuration fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteConfigFetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("timed out")]
    Timeout,
}

/// Fetches the raw configuration body for a site.
///
/// Parsing and defaulting happen in the caller so that every source shares
/// the same failure policy.
#[async_trait]
pub trait SiteConfigSource: Send + Sync {
    async fn fetch(&self, site_id: &str) -> Result<String, SiteConfigFetchError>;
}
