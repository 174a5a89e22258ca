//! Degradation tracking for initialization fallbacks.

mod tracker;

pub use tracker::DegradationTracker;
