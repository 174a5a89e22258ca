//! # beacon-observability
//!
//! Structured logging for the Beacon pipeline: subscriber setup, one event
//! function per pipeline milestone, and a tracker for degraded steps.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::DegradationTracker;
pub use tracing_setup::init_tracing;
