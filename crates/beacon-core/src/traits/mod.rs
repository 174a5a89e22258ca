//! Narrow interfaces to the tracker's external collaborators.
//!
//! Every collaborator is injected, so tests substitute fakes instead of
//! patching globals.

mod environment;
mod fingerprint;
mod site_config_source;
mod storage;
mod transport;

pub use environment::Environment;
pub use fingerprint::{FingerprintAgent, FingerprintProvider, FingerprintResult};
pub use site_config_source::{SiteConfigFetchError, SiteConfigSource};
pub use storage::CrossTabStorage;
pub use transport::{EventTransport, TransportResponse};
