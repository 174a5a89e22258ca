//! Error taxonomy. Each domain has its own enum; [`BeaconError`] aggregates
//! them so callers can propagate with `?` across crate boundaries.

mod bridge_error;
mod config_error;
mod identity_error;
mod storage_error;
mod transport_error;

pub use bridge_error::BridgeError;
pub use config_error::ConfigError;
pub use identity_error::IdentityError;
pub use storage_error::StorageError;
pub use transport_error::TransportError;

/// Top-level error for all Beacon operations.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("site id is required")]
    MissingSiteId,

    #[error("invalid event type: {event_type:?}")]
    InvalidEventType { event_type: String },

    #[error("tracker not ready (state: {state})")]
    NotReady { state: String },

    #[error("invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("identity error: {0}")]
    IdentityError(#[from] IdentityError),

    #[error("transport error: {0}")]
    TransportError(#[from] TransportError),

    #[error("bridge error: {0}")]
    BridgeError(#[from] BridgeError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience alias used throughout the workspace.
pub type BeaconResult<T> = Result<T, BeaconError>;
