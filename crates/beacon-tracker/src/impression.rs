//! First-impression callbacks.
//!
//! The latch flips on the first confirmed delivery of an `impression` event.
//! Callbacks registered before that run once when it flips; callbacks
//! registered after run immediately.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard};

use beacon_bridge::ImpressionCallback;
use beacon_core::models::{Event, EventType};
use beacon_pipeline::DeliveryObserver;
use tracing::{debug, warn};

#[derive(Default)]
struct LatchState {
    fired: bool,
    waiting: Vec<ImpressionCallback>,
}

#[derive(Default)]
pub struct FirstImpressionLatch {
    state: Mutex<LatchState>,
}

impl FirstImpressionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self) -> bool {
        self.lock().fired
    }

    /// Callbacks still waiting for the first impression.
    pub fn waiting(&self) -> usize {
        self.lock().waiting.len()
    }

    pub fn register(&self, callback: ImpressionCallback) {
        {
            let mut state = self.lock();
            if !state.fired {
                state.waiting.push(callback);
                return;
            }
        }
        invoke(&callback);
    }

    /// Flip the latch. Only the first call runs callbacks.
    pub fn fire(&self) {
        let waiting = {
            let mut state = self.lock();
            if state.fired {
                return;
            }
            state.fired = true;
            std::mem::take(&mut state.waiting)
        };
        debug!(callbacks = waiting.len(), "first impression delivered");
        for callback in &waiting {
            invoke(callback);
        }
    }

    fn lock(&self) -> MutexGuard<'_, LatchState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DeliveryObserver for FirstImpressionLatch {
    fn delivered(&self, event: &Event) {
        if event.event_type == EventType::Impression {
            self.fire();
        }
    }
}

impl std::fmt::Debug for FirstImpressionLatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("FirstImpressionLatch")
            .field("fired", &state.fired)
            .field("waiting", &state.waiting.len())
            .finish()
    }
}

/// Host callbacks must not unwind into the pipeline.
fn invoke(callback: &ImpressionCallback) {
    if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
        warn!("first-impression callback panicked");
    }
}
