//! # beacon-tracker
//!
//! The public face of the Beacon pipeline. A [`Tracker`] owns one site's
//! lifecycle: it loads the site configuration, connects storage, resolves
//! the user identity, then starts batching, attaches page signals, sends the
//! initial events and replays commands buffered by the bridge.

pub mod discovery;
pub mod enrichment;
pub mod impression;
pub mod lifecycle;
pub mod signals;
mod tracker;

pub use discovery::ScriptTagParams;
pub use impression::FirstImpressionLatch;
pub use lifecycle::LifecycleState;
pub use signals::{ClickTarget, PageSignal};
pub use tracker::{Tracker, TrackerBuilder};
