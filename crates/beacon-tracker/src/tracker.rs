//! Tracker handle and lifecycle controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock, Weak};

use beacon_bridge::{BridgeRegistry, Command, CommandHandler, Mailbox};
use beacon_core::config::SiteConfig;
use beacon_core::errors::{BeaconError, BeaconResult, StorageError};
use beacon_core::models::{
    ArbitraryData, DegradationEvent, EnrichedFields, Event, EventType, IdentityRecord,
    SessionDescriptor,
};
use beacon_core::traits::{
    CrossTabStorage, Environment, EventTransport, FingerprintProvider, SiteConfigSource,
};
use beacon_core::{StaticEnvironment, TrackerOptions};
use beacon_identity::IdentityResolver;
use beacon_observability::tracing_setup::events;
use beacon_observability::DegradationTracker;
use beacon_pipeline::{
    BatchPolicy, Batcher, DeliveryEngine, DeliverySettings, HttpSiteConfigSource, HttpTransport,
    SiteConfigLoader,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::enrichment::browser_fields;
use crate::impression::FirstImpressionLatch;
use crate::lifecycle::LifecycleState;
use crate::signals::PageSignal;

/// Collects a tracker's collaborators. Anything not supplied gets the
/// production implementation.
pub struct TrackerBuilder {
    site_id: String,
    options: TrackerOptions,
    environment: Option<Arc<dyn Environment>>,
    storage: Option<Arc<dyn CrossTabStorage>>,
    fingerprint: Option<Arc<dyn FingerprintProvider>>,
    site_config_source: Option<Arc<dyn SiteConfigSource>>,
    transport: Option<Arc<dyn EventTransport>>,
    registry: Option<Arc<BridgeRegistry>>,
}

impl TrackerBuilder {
    pub fn options(mut self, options: TrackerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn CrossTabStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn fingerprint(mut self, provider: Arc<dyn FingerprintProvider>) -> Self {
        self.fingerprint = Some(provider);
        self
    }

    pub fn site_config_source(mut self, source: Arc<dyn SiteConfigSource>) -> Self {
        self.site_config_source = Some(source);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn EventTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a private registry instead of the process-wide one.
    pub fn registry(mut self, registry: Arc<BridgeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Validate, wire collaborators, and register with the bridge.
    ///
    /// Commands addressed to this site buffer in its mailbox from here on.
    /// No log subscriber is installed; that is left to the host.
    pub fn build(self) -> BeaconResult<Tracker> {
        if self.site_id.trim().is_empty() {
            return Err(BeaconError::MissingSiteId);
        }
        self.options.validate()?;

        let transport: Arc<dyn EventTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.options.send_timeout())?),
        };
        let site_config_source: Arc<dyn SiteConfigSource> = match self.site_config_source {
            Some(source) => source,
            None => Arc::new(HttpSiteConfigSource::new(
                self.options.config_base.clone(),
                self.options.config_timeout(),
            )?),
        };
        let environment = self
            .environment
            .unwrap_or_else(|| Arc::new(StaticEnvironment::default()));
        let registry = self.registry.unwrap_or_else(beacon_bridge::global);

        let engine = DeliveryEngine::new(
            transport,
            self.site_id.clone(),
            DeliverySettings::from_options(&self.options),
        );
        let batcher = Batcher::new(engine, BatchPolicy::from_options(&self.options));
        let latch = Arc::new(FirstImpressionLatch::new());
        batcher.set_observer(latch.clone());

        let mailbox = registry.register(&self.site_id)?;
        let session = SessionDescriptor::new();
        debug!(site_id = %self.site_id, session_id = %session.session_id, "tracker created");

        Ok(Tracker {
            inner: Arc::new(TrackerInner {
                site_id: self.site_id.clone(),
                session,
                options: RwLock::new(self.options),
                state: Mutex::new(LifecycleState::Created),
                identity: OnceLock::new(),
                site_config: OnceLock::new(),
                environment,
                storage: self.storage,
                fingerprint: self.fingerprint,
                site_config_source,
                batcher,
                latch,
                degradations: Mutex::new(DegradationTracker::new(self.site_id.clone())),
                registry,
                mailbox,
                listening: AtomicBool::new(false),
            }),
        })
    }
}

struct TrackerInner {
    site_id: String,
    session: SessionDescriptor,
    options: RwLock<TrackerOptions>,
    state: Mutex<LifecycleState>,
    identity: OnceLock<IdentityRecord>,
    site_config: OnceLock<SiteConfig>,
    environment: Arc<dyn Environment>,
    storage: Option<Arc<dyn CrossTabStorage>>,
    fingerprint: Option<Arc<dyn FingerprintProvider>>,
    site_config_source: Arc<dyn SiteConfigSource>,
    batcher: Arc<Batcher>,
    latch: Arc<FirstImpressionLatch>,
    degradations: Mutex<DegradationTracker>,
    registry: Arc<BridgeRegistry>,
    mailbox: Arc<Mailbox>,
    /// Page signals are only accepted once attached.
    listening: AtomicBool,
}

/// One site's tracker. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<TrackerInner>,
}

impl Tracker {
    pub fn builder(site_id: impl Into<String>) -> TrackerBuilder {
        TrackerBuilder {
            site_id: site_id.into(),
            options: TrackerOptions::default(),
            environment: None,
            storage: None,
            fingerprint: None,
            site_config_source: None,
            transport: None,
            registry: None,
        }
    }

    pub fn site_id(&self) -> &str {
        &self.inner.site_id
    }

    pub fn session(&self) -> &SessionDescriptor {
        &self.inner.session
    }

    pub fn state(&self) -> LifecycleState {
        *self.inner.lock_state()
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// The resolved identity, once initialization got that far.
    pub fn identity(&self) -> Option<&IdentityRecord> {
        self.inner.identity.get()
    }

    pub fn site_config(&self) -> Option<&SiteConfig> {
        self.inner.site_config.get()
    }

    pub fn options(&self) -> TrackerOptions {
        self.inner.read_options().clone()
    }

    pub fn degradations(&self) -> Vec<DegradationEvent> {
        self.inner.lock_degradations().events().to_vec()
    }

    pub fn first_impression_delivered(&self) -> bool {
        self.inner.latch.has_fired()
    }

    pub fn queue_len(&self) -> usize {
        self.inner.batcher.queue_len()
    }

    /// Run the initialization sequence.
    ///
    /// Every step degrades instead of failing; the only errors are a repeated
    /// call or an internal transition fault. Returns the final ready state.
    pub async fn initialize(&self) -> BeaconResult<LifecycleState> {
        let inner = &self.inner;
        let options = self.options();

        inner.transition(LifecycleState::LoadingConfig)?;
        let loaded = SiteConfigLoader::new(
            Arc::clone(&inner.site_config_source),
            options.config_timeout(),
        )
        .load(&inner.site_id)
        .await;
        if let Some(failure) = loaded.failure {
            inner.degrade(DegradationEvent::now(
                "site_config",
                format!("{failure:?}"),
                "default site config",
            ));
        }
        let site_config = inner.site_config.get_or_init(|| loaded.config).clone();

        inner.transition(LifecycleState::LoadingStorage)?;
        let storage = self.connect_storage(&options).await;

        inner.transition(LifecycleState::ResolvingIdentity)?;
        let resolver = IdentityResolver::new(Arc::clone(&inner.environment))
            .with_storage(storage)
            .with_fingerprint(inner.fingerprint.clone())
            .with_storage_timeout(options.storage_timeout())
            .with_fingerprint_timeout(options.fingerprint_timeout())
            .with_fingerprint_region(options.fingerprint_region.clone());

        let (record, ready_state) = match resolver.resolve(&site_config).await {
            Ok(resolution) => {
                for degradation in resolution.degradations {
                    inner.degrade(degradation);
                }
                (resolution.record, LifecycleState::Ready)
            }
            Err(e) => {
                inner.degrade(DegradationEvent::now(
                    "identity",
                    e.to_string(),
                    "session fallback identity",
                ));
                (
                    IdentityRecord::fallback(&inner.session),
                    LifecycleState::ReadyFallback,
                )
            }
        };
        info!(
            site_id = %inner.site_id,
            user_id_type = record.user_id_type.as_str(),
            "identity resolved"
        );
        let _ = inner.identity.set(record);
        inner.transition(ready_state)?;

        self.on_ready();
        Ok(ready_state)
    }

    /// `None` when storage is absent, fails to connect, or times out.
    async fn connect_storage(&self, options: &TrackerOptions) -> Option<Arc<dyn CrossTabStorage>> {
        let Some(storage) = self.inner.storage.clone() else {
            debug!(site_id = %self.inner.site_id, "no cross-tab storage configured");
            return None;
        };
        let timeout = options.storage_timeout();
        let failure = match tokio::time::timeout(timeout, storage.on_connect()).await {
            Ok(Ok(())) => return Some(storage),
            Ok(Err(e)) => e,
            Err(_) => StorageError::Timeout {
                operation: "connect".into(),
                timeout_ms: options.storage_timeout_ms,
            }
            .into(),
        };
        self.inner.degrade(DegradationEvent::now(
            "storage",
            failure.to_string(),
            "unpersisted identity",
        ));
        None
    }

    fn on_ready(&self) {
        let inner = &self.inner;
        inner.batcher.start_timer();
        inner.listening.store(true, Ordering::SeqCst);

        self.emit(EventType::SessionStart, ArbitraryData::new(), EnrichedFields::new());
        self.emit(EventType::Impression, ArbitraryData::new(), EnrichedFields::new());
        if inner.environment.is_visible() {
            self.emit(
                EventType::ViewableImpression,
                ArbitraryData::new(),
                EnrichedFields::new(),
            );
        }

        let router = Arc::new(CommandRouter {
            inner: Arc::downgrade(&self.inner),
            site_id: inner.site_id.clone(),
            registry: Arc::downgrade(&inner.registry),
        });
        match inner.mailbox.drain_and_replay(router) {
            Ok(replayed) => events::command_replayed(&inner.site_id, replayed),
            Err(e) => warn!(site_id = %inner.site_id, error = %e, "command replay skipped"),
        }

        inner.batcher.flush();
    }

    /// Track an event.
    ///
    /// Rejected with [`BeaconError::NotReady`] before initialization has
    /// finished; such calls are discarded, not buffered. Custom names gain a
    /// `custom_` prefix; malformed names are rejected.
    pub fn track(&self, event_type: &str, data: ArbitraryData) -> BeaconResult<()> {
        let state = self.state();
        if !state.is_ready() {
            info!(
                site_id = %self.inner.site_id,
                event_type,
                state = state.name(),
                "track() before ready, event discarded"
            );
            return Err(BeaconError::NotReady {
                state: state.name().to_string(),
            });
        }
        let event_type = EventType::parse(event_type).inspect_err(|e| {
            warn!(site_id = %self.inner.site_id, error = %e, "track() rejected");
        })?;
        self.emit(event_type, data, EnrichedFields::new());
        Ok(())
    }

    /// Shallow-merge `patch` into the options and apply it to the batcher.
    pub fn configure(&self, patch: &Map<String, Value>) -> BeaconResult<()> {
        let updated = {
            let mut options = self.inner.write_options();
            options.apply_patch(patch)?;
            options.clone()
        };
        let timer_period_changed =
            self.inner.batcher.policy().batch_timeout != updated.batch_timeout();
        self.inner.batcher.apply_options(&updated);
        if timer_period_changed && self.inner.batcher.timer_running() {
            self.inner.batcher.start_timer();
        }
        debug!(site_id = %self.inner.site_id, keys = patch.len(), "options patched");
        Ok(())
    }

    /// Run `callback` once the first impression is confirmed delivered, or
    /// right away if it already was.
    pub fn on_first_impression(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.inner.latch.register(Arc::new(callback));
    }

    /// Feed a page signal. Ignored with [`BeaconError::NotReady`] until the
    /// listeners are attached.
    ///
    /// `BeforeUnload` also performs the final flush and waits for it.
    pub async fn on_signal(&self, signal: PageSignal) -> BeaconResult<()> {
        if !self.inner.listening.load(Ordering::SeqCst) {
            return Err(BeaconError::NotReady {
                state: self.state().name().to_string(),
            });
        }
        let page_host = self.inner.environment.snapshot().hostname;
        for (event_type, fields) in signal.events(&page_host) {
            self.emit(event_type, ArbitraryData::new(), fields);
        }
        if signal == PageSignal::BeforeUnload {
            let flushed = self.inner.batcher.flush_and_wait().await;
            debug!(site_id = %self.inner.site_id, flushed, "final flush on unload");
        }
        Ok(())
    }

    /// Hand one batch to delivery now. Returns how many events were taken.
    pub fn flush(&self) -> usize {
        self.inner.batcher.flush()
    }

    /// Deliver everything queued and wait for the outcome.
    pub async fn flush_and_wait(&self) -> usize {
        self.inner.batcher.flush_and_wait().await
    }

    /// Stop the timer, detach signals, leave the bridge and deliver what is
    /// still queued. Commands sent to the site afterwards are held for its
    /// next tracker.
    pub async fn shutdown(&self) -> usize {
        let inner = &self.inner;
        inner.batcher.stop_timer();
        inner.listening.store(false, Ordering::SeqCst);
        inner.registry.release(&inner.mailbox);
        let flushed = inner.batcher.flush_and_wait().await;
        info!(site_id = %inner.site_id, flushed, "tracker shut down");
        flushed
    }

    /// Build, enrich and queue an event. Only called once ready.
    fn emit(&self, event_type: EventType, data: ArbitraryData, fields: EnrichedFields) {
        let inner = &self.inner;
        let Some(identity) = inner.identity.get() else {
            return;
        };
        let snapshot = inner.environment.snapshot();
        let event = Event::new(event_type)
            .with_enriched(browser_fields(&snapshot, &inner.session, identity))
            .with_enriched(fields)
            .with_data(data);
        inner.batcher.enqueue(event);
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("site_id", &self.inner.site_id)
            .field("state", &self.state())
            .field("identity", &self.identity())
            .finish()
    }
}

impl TrackerInner {
    fn transition(&self, to: LifecycleState) -> BeaconResult<()> {
        let mut state = self.lock_state();
        if !state.can_transition_to(to) {
            return Err(BeaconError::InvalidTransition {
                from: state.name().to_string(),
                to: to.name().to_string(),
            });
        }
        events::state_transition(&self.site_id, state.name(), to.name());
        *state = to;
        Ok(())
    }

    fn degrade(&self, event: DegradationEvent) {
        self.lock_degradations().record(event);
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_degradations(&self) -> MutexGuard<'_, DegradationTracker> {
        self.degradations.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn read_options(&self) -> std::sync::RwLockReadGuard<'_, TrackerOptions> {
        self.options.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_options(&self) -> std::sync::RwLockWriteGuard<'_, TrackerOptions> {
        self.options.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for TrackerInner {
    /// Last handle gone without `shutdown()`: leave the bridge so later
    /// commands are held, and end the timer task.
    fn drop(&mut self) {
        self.batcher.stop_timer();
        let returned = self.registry.release(&self.mailbox);
        debug!(site_id = %self.site_id, returned, "tracker dropped");
    }
}

/// Executes bridge commands against a ready tracker.
///
/// Holds weak references so a registered mailbox keeps neither the tracker
/// nor the registry alive.
struct CommandRouter {
    inner: Weak<TrackerInner>,
    site_id: String,
    registry: Weak<BridgeRegistry>,
}

impl CommandHandler for CommandRouter {
    fn handle(&self, command: Command) {
        let Some(inner) = self.inner.upgrade() else {
            // Raced with the tracker being dropped: hand it back to the bridge.
            match self.registry.upgrade() {
                Some(registry) => registry.hold(command, Some(&self.site_id)),
                None => warn!(
                    site_id = %self.site_id,
                    action = command.action().as_str(),
                    "bridge gone, command discarded"
                ),
            }
            return;
        };
        let tracker = Tracker { inner };
        match command {
            Command::Track { event_type, data } => {
                // Rejections are already logged by track().
                let _ = tracker.track(&event_type, data);
            }
            Command::Config { patch } => {
                if let Err(e) = tracker.configure(&patch) {
                    warn!(site_id = %tracker.site_id(), error = %e, "config command rejected");
                }
            }
            Command::OnFirstImpression(callback) => tracker.inner.latch.register(callback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_for_a_dropped_tracker_is_held_again() {
        let registry = Arc::new(BridgeRegistry::new());
        let router = CommandRouter {
            inner: Weak::new(),
            site_id: "site-1".into(),
            registry: Arc::downgrade(&registry),
        };

        router.handle(Command::track("late", Map::new()));
        assert_eq!(registry.held_count(Some("site-1")), 1);
    }

    #[test]
    fn command_without_a_bridge_is_discarded_quietly() {
        let router = CommandRouter {
            inner: Weak::new(),
            site_id: "site-1".into(),
            registry: Weak::new(),
        };
        router.handle(Command::track("late", Map::new()));
    }
}
