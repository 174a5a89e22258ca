//! # beacon-identity
//!
//! Resolves a durable user identifier through an ordered fallback chain:
//! stored identifier → fingerprint provider → local environment hash.
//! Every step degrades into the next instead of failing; only when the last
//! step cannot run does resolution return an error, and the caller then
//! substitutes a session-scoped fallback identity.

pub mod local_hash;
pub mod resolver;
pub mod storage;

pub use local_hash::{local_identifier, rolling_hash, to_base36};
pub use resolver::{IdentityResolver, Resolution};
pub use storage::MemoryStorage;
