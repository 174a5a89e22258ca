//! # beacon-core
//!
//! Foundation crate for the Beacon analytics pipeline.
//! Defines the event model, identity types, errors, config, collaborator
//! traits, and constants. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod environment;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{SiteConfig, SiteConfigDefaults, TrackerOptions};
pub use environment::{EnvironmentSnapshot, FingerprintAttributes, StaticEnvironment};
pub use errors::{BeaconError, BeaconResult};
pub use models::{
    ArbitraryData, DegradationEvent, EnrichedFields, Event, EventType, IdentityRecord, Scalar,
    SessionDescriptor, UserIdType,
};
