//! # beacon-pipeline
//!
//! Moves events from the tracker to the collector.
//!
//! - [`EventQueue`]: FIFO of events waiting for delivery.
//! - [`Batcher`]: flushes the queue on a size threshold or a timer, and
//!   requeues or drops events whose delivery failed.
//! - [`DeliveryEngine`]: one POST per event, classified as delivered or not.
//! - [`wire`]: the JSON payload the collector receives.
//! - [`transport`]: reqwest-backed collector and site-config clients.

pub mod batcher;
pub mod delivery;
pub mod queue;
pub mod transport;
pub mod wire;

pub use batcher::{BatchPolicy, Batcher, DeliveryObserver};
pub use delivery::{DeliverySettings, DeliveryEngine};
pub use queue::EventQueue;
pub use transport::{HttpSiteConfigSource, HttpTransport, LoadedSiteConfig, SiteConfigLoader};
