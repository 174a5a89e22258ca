//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log an event entering the queue.
pub fn event_queued(site_id: &str, event_type: &str, queue_len: usize) {
    tracing::debug!(
        event = "event_queued",
        site_id = %site_id,
        event_type = %event_type,
        queue_len = queue_len,
        "event queued"
    );
}

/// Log a successful delivery.
pub fn event_delivered(site_id: &str, event_type: &str, attempts: u32) {
    tracing::debug!(
        event = "event_delivered",
        site_id = %site_id,
        event_type = %event_type,
        attempts = attempts,
        "event delivered"
    );
}

/// Log a failed delivery that will be retried.
pub fn event_requeued(site_id: &str, event_type: &str, retry_count: u32) {
    tracing::debug!(
        event = "event_requeued",
        site_id = %site_id,
        event_type = %event_type,
        retry_count = retry_count,
        "event requeued for retry"
    );
}

/// Log an event dropped after exhausting its retries.
pub fn event_dropped(site_id: &str, event_type: &str, retry_count: u32) {
    tracing::warn!(
        event = "event_dropped",
        site_id = %site_id,
        event_type = %event_type,
        retry_count = retry_count,
        "event dropped after max retries"
    );
}

/// Log a lifecycle state change.
pub fn state_transition(site_id: &str, from: &str, to: &str) {
    tracing::info!(
        event = "state_transition",
        site_id = %site_id,
        from = %from,
        to = %to,
        "lifecycle transition"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(site_id: &str, component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        site_id = %site_id,
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// Log the replay of commands buffered before readiness.
pub fn command_replayed(site_id: &str, replayed: usize) {
    tracing::info!(
        event = "command_replayed",
        site_id = %site_id,
        replayed = replayed,
        "buffered commands replayed"
    );
}
