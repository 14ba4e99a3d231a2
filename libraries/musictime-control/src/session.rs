//! Session context shared by the control components
//!
//! Owns the track state, the adapter registry, the scheduler and the event
//! channel. Components hold a cheap clone instead of reaching for globals.

use crate::config::ControlConfig;
use crate::events::ControlEvent;
use crate::scheduler::Scheduler;
use crate::store::TrackStateStore;
use musictime_core::{AdapterSet, PlayerBackend, PlayerBackendAdapter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the control event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct SessionInner {
    store: TrackStateStore,
    adapters: AdapterSet,
    config: ControlConfig,
    scheduler: Scheduler,
    events: broadcast::Sender<ControlEvent>,
    launch_generation: AtomicU64,
}

/// Explicitly owned session state for one listener
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session with an empty store
    pub fn new(adapters: AdapterSet, config: ControlConfig) -> Self {
        Self::with_store(TrackStateStore::new(), adapters, config)
    }

    /// Create a session around an existing store
    pub fn with_store(store: TrackStateStore, adapters: AdapterSet, config: ControlConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                store,
                adapters,
                config,
                scheduler: Scheduler::new(),
                events,
                launch_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn store(&self) -> &TrackStateStore {
        &self.inner.store
    }

    pub fn adapters(&self) -> &AdapterSet {
        &self.inner.adapters
    }

    /// Adapter for a backend, if registered
    pub fn adapter(&self, backend: PlayerBackend) -> Option<Arc<dyn PlayerBackendAdapter>> {
        self.inner.adapters.get(backend)
    }

    pub fn config(&self) -> &ControlConfig {
        &self.inner.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Subscribe to control events
    pub fn subscribe(&self) -> broadcast::Receiver<ControlEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: ControlEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    /// Start a new playlist launch, superseding older ones
    pub(crate) fn begin_launch(&self) -> u64 {
        self.inner.launch_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_current_launch(&self, generation: u64) -> bool {
        self.inner.launch_generation.load(Ordering::SeqCst) == generation
    }

    /// Stop any playlist launch still waiting to retry
    pub fn supersede_launches(&self) {
        self.inner.launch_generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Cancel every pending timer and launch retry
    pub fn shutdown(&self) {
        self.supersede_launches();
        self.inner.scheduler.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_launch_supersedes_older() {
        let session = Session::new(AdapterSet::new(), ControlConfig::default());
        let first = session.begin_launch();
        assert!(session.is_current_launch(first));

        let second = session.begin_launch();
        assert!(!session.is_current_launch(first));
        assert!(session.is_current_launch(second));

        session.supersede_launches();
        assert!(!session.is_current_launch(second));
    }

    #[tokio::test]
    async fn events_reach_subscribers() {
        let session = Session::new(AdapterSet::new(), ControlConfig::default());
        let mut events = session.subscribe();

        session.emit(ControlEvent::ActiveBackendChanged {
            backend: PlayerBackend::ItunesDesktop,
        });

        assert_eq!(
            events.recv().await.unwrap(),
            ControlEvent::ActiveBackendChanged {
                backend: PlayerBackend::ItunesDesktop
            }
        );
    }
}
