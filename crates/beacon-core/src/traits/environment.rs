use crate::environment::{EnvironmentSnapshot, FingerprintAttributes};
use crate::errors::BeaconResult;

/// Source of page and device metadata.
pub trait Environment: Send + Sync {
    /// Current page metadata, read fresh on every call.
    fn snapshot(&self) -> EnvironmentSnapshot;

    /// Attributes for local identifier derivation.
    fn fingerprint_attributes(&self) -> BeaconResult<FingerprintAttributes>;

    /// Whether the page is currently visible.
    fn is_visible(&self) -> bool {
        self.snapshot().visible
    }
}
