//! Per-instance record of every step that fell back to a degraded mode.

use beacon_core::models::DegradationEvent;

use crate::tracing_setup::events;

/// Degradations of one tracker instance, in the order they happened.
#[derive(Debug, Clone)]
pub struct DegradationTracker {
    site_id: String,
    events: Vec<DegradationEvent>,
}

impl DegradationTracker {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            events: Vec::new(),
        }
    }

    /// Log and keep a degradation.
    pub fn record(&mut self, event: DegradationEvent) {
        events::degradation_triggered(
            &self.site_id,
            &event.component,
            &event.failure,
            &event.fallback_used,
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[DegradationEvent] {
        &self.events
    }
}
