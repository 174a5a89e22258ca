//! FIFO of events awaiting delivery.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use beacon_core::models::Event;

#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Returns the new length.
    pub fn push(&self, event: Event) -> usize {
        let mut events = self.lock();
        events.push_back(event);
        events.len()
    }

    /// Remove up to `max` events from the head in one step.
    pub fn take(&self, max: usize) -> Vec<Event> {
        let mut events = self.lock();
        let n = max.min(events.len());
        events.drain(..n).collect()
    }

    pub fn take_all(&self) -> Vec<Event> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::models::EventType;

    #[test]
    fn take_removes_from_head_in_order() {
        let queue = EventQueue::new();
        queue.push(Event::new(EventType::SessionStart));
        queue.push(Event::new(EventType::Impression));
        queue.push(Event::new(EventType::Click));

        let batch = queue.take(2);
        assert_eq!(batch[0].event_type, EventType::SessionStart);
        assert_eq!(batch[1].event_type, EventType::Impression);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn take_never_exceeds_queue() {
        let queue = EventQueue::new();
        queue.push(Event::new(EventType::Click));
        assert_eq!(queue.take(10).len(), 1);
        assert!(queue.is_empty());
        assert!(queue.take(10).is_empty());
    }
}
