//! State reconciler
//!
//! The one place where what a player reports as playing becomes what the
//! rest of the session believes is playing.

use crate::events::ControlEvent;
use crate::scheduler::TaskKey;
use crate::session::Session;
use crate::store::ReconcileOutcome;
use musictime_core::PlayerBackend;
use std::time::Duration;
use tracing::{debug, warn};

/// Re-queries the active player and writes the result into the store
#[derive(Debug, Clone)]
pub struct StateReconciler {
    session: Session,
}

impl StateReconciler {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Backend to query: the active backend, else the running track's
    async fn target(&self) -> Option<PlayerBackend> {
        let store = self.session.store();
        match store.active_backend().await {
            Some(backend) if backend.is_assigned() => Some(backend),
            _ => store.running_backend().await,
        }
    }

    /// Query the player once and update the store
    pub async fn reconcile(&self) -> ReconcileOutcome {
        let Some(backend) = self.target().await else {
            debug!("No backend to reconcile against");
            return ReconcileOutcome::Skipped;
        };
        let Some(adapter) = self.session.adapter(backend) else {
            debug!(%backend, "No adapter registered, skipping reconcile");
            return ReconcileOutcome::Skipped;
        };

        let store = self.session.store();
        let cycle = store.begin_cycle().await;

        let reported = match adapter.current_track().await {
            Ok(track) => track,
            Err(e) => {
                warn!(%backend, error = %e, "Failed to query current track");
                return ReconcileOutcome::Failed;
            }
        };

        let outcome = store
            .apply_reconciled(reported, cycle, adapter.supports_loved())
            .await;

        match &outcome {
            ReconcileOutcome::Changed { previous, current } => {
                debug!(%backend, track_id = %current.id, "Now playing changed");
                self.session.emit(ControlEvent::TrackChanged {
                    previous: previous.clone(),
                    current: current.clone(),
                });
            }
            ReconcileOutcome::Updated(track) => {
                self.session.emit(ControlEvent::TrackUpdated {
                    track: track.clone(),
                });
            }
            ReconcileOutcome::Cleared { previous } => {
                debug!(%backend, "Nothing playing");
                self.session.emit(ControlEvent::TrackCleared {
                    previous: previous.clone(),
                });
            }
            ReconcileOutcome::Unchanged | ReconcileOutcome::Skipped | ReconcileOutcome::Failed => {}
        }

        outcome
    }

    /// Reconcile after `delay`, superseding any pending scheduled reconcile
    pub fn schedule(&self, delay: Duration) {
        let reconciler = self.clone();
        self.session
            .scheduler()
            .schedule(TaskKey::Reconcile, delay, async move {
                reconciler.reconcile().await;
            });
    }
}
