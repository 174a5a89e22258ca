//! Batcher: threshold and timer flushes, retry bookkeeping.
//!
//! A flush removes up to `batch_size` events under the queue lock and spawns
//! one delivery task per event. Flushes may overlap; each only sees what was
//! queued when it ran, so no event is taken twice.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::Duration;

use beacon_core::models::Event;
use beacon_core::TrackerOptions;
use beacon_observability::tracing_setup::events;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::delivery::{DeliveryEngine, DeliverySettings};
use crate::queue::EventQueue;

/// Size and retry limits for one batcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub max_retries: u32,
}

impl BatchPolicy {
    pub fn from_options(options: &TrackerOptions) -> Self {
        Self {
            batch_size: options.batch_size.max(1),
            batch_timeout: options.batch_timeout(),
            max_retries: options.max_retries,
        }
    }
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::from_options(&TrackerOptions::default())
    }
}

/// Told about every confirmed delivery.
pub trait DeliveryObserver: Send + Sync {
    fn delivered(&self, event: &Event);
}

pub struct Batcher {
    queue: EventQueue,
    engine: DeliveryEngine,
    policy: RwLock<BatchPolicy>,
    observer: RwLock<Option<Arc<dyn DeliveryObserver>>>,
    in_flight: AtomicUsize,
    idle: Notify,
    shutdown: watch::Sender<bool>,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Runtime that owns the timer; flushes and restarts triggered from
    /// threads outside it are spawned here.
    runtime: OnceLock<Handle>,
}

impl Batcher {
    pub fn new(engine: DeliveryEngine, policy: BatchPolicy) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            queue: EventQueue::new(),
            engine,
            policy: RwLock::new(policy),
            observer: RwLock::new(None),
            in_flight: AtomicUsize::new(0),
            idle: Notify::new(),
            shutdown,
            timer: Mutex::new(None),
            runtime: OnceLock::new(),
        })
    }

    pub fn site_id(&self) -> &str {
        self.engine.site_id()
    }

    pub fn policy(&self) -> BatchPolicy {
        *self.policy.read().unwrap_or_else(|p| p.into_inner())
    }

    /// Take new limits and delivery settings from updated options. A running
    /// timer keeps its period until restarted.
    pub fn apply_options(&self, options: &TrackerOptions) {
        *self.policy.write().unwrap_or_else(|p| p.into_inner()) = BatchPolicy::from_options(options);
        self.engine.set_settings(DeliverySettings::from_options(options));
    }

    pub fn set_observer(&self, observer: Arc<dyn DeliveryObserver>) {
        *self.observer.write().unwrap_or_else(|p| p.into_inner()) = Some(observer);
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Queue an event; flush at once when the queue reaches the batch size.
    pub fn enqueue(self: &Arc<Self>, event: Event) {
        let event_type = event.event_type.clone();
        let len = self.queue.push(event);
        events::event_queued(self.site_id(), event_type.as_str(), len);
        if len >= self.policy().batch_size {
            self.flush();
        }
    }

    /// Hand up to one batch to the delivery engine without waiting for the
    /// outcome. Returns how many events were taken.
    pub fn flush(self: &Arc<Self>) -> usize {
        let Some(runtime) = self.runtime() else {
            warn!(site_id = %self.site_id(), "batcher: no async runtime, flush deferred");
            return 0;
        };
        let batch = self.queue.take(self.policy().batch_size);
        let taken = batch.len();
        if taken > 0 {
            debug!(site_id = %self.site_id(), taken, "batcher: flushing");
        }
        for event in batch {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let this = Arc::clone(self);
            runtime.spawn(async move {
                this.deliver(event).await;
                this.finish_one();
            });
        }
        taken
    }

    /// Deliver everything queued and wait for every outstanding send.
    ///
    /// Used on page teardown. Failures are still requeued, but nothing
    /// flushes them again unless the tracker keeps running.
    pub async fn flush_and_wait(self: &Arc<Self>) -> usize {
        let batch = self.queue.take_all();
        let taken = batch.len();
        let mut sends = JoinSet::new();
        for event in batch {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let this = Arc::clone(self);
            sends.spawn(async move {
                this.deliver(event).await;
                this.finish_one();
            });
        }
        while sends.join_next().await.is_some() {}
        self.wait_idle().await;
        taken
    }

    /// Resolve once no delivery is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Start the recurring flush timer. Replaces a running timer.
    ///
    /// The first call must come from within a tokio runtime; later calls may
    /// come from any thread and reuse that runtime. Returns `false`, leaving
    /// any running timer untouched, when no runtime is reachable.
    pub fn start_timer(self: &Arc<Self>) -> bool {
        let Some(runtime) = self.runtime() else {
            warn!(site_id = %self.site_id(), "batcher: no async runtime, timer not restarted");
            return false;
        };
        let _ = self.runtime.set(runtime.clone());
        let period = self.policy().batch_timeout;
        let mut stop = self.shutdown.subscribe();
        let this = Arc::clone(self);
        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !this.queue.is_empty() {
                            this.flush();
                        }
                    }
                    _ = stop.changed() => break,
                }
            }
        });
        let previous = self
            .timer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        true
    }

    /// Stop the flush timer. Queued events stay queued.
    pub fn stop_timer(&self) {
        self.shutdown.send_replace(true);
        let handle = self.timer.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    pub fn timer_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn deliver(&self, mut event: Event) {
        let site_id = self.site_id();
        if self.engine.send(&event).await {
            events::event_delivered(site_id, event.event_type.as_str(), event.retry_count().saturating_add(1));
            let observer = self
                .observer
                .read()
                .unwrap_or_else(|p| p.into_inner())
                .clone();
            if let Some(observer) = observer {
                observer.delivered(&event);
            }
            return;
        }

        let retry_count = event.record_failure();
        if event.can_retry(self.policy().max_retries) {
            events::event_requeued(site_id, event.event_type.as_str(), retry_count);
            self.queue.push(event);
        } else {
            events::event_dropped(site_id, event.event_type.as_str(), retry_count);
        }
    }

    /// The runtime that owns the timer, else the caller's.
    fn runtime(&self) -> Option<Handle> {
        self.runtime
            .get()
            .cloned()
            .or_else(|| Handle::try_current().ok())
    }

    fn finish_one(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl std::fmt::Debug for Batcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batcher")
            .field("site_id", &self.site_id())
            .field("policy", &self.policy())
            .field("queued", &self.queue_len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
