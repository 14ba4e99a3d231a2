//! Track state store
//!
//! Single owner of the running track, its server mirror and the active
//! backend. Every mutation happens under one write lock, so each call is
//! atomic; sequences of calls separated by awaits are not.

use musictime_core::{PlayerBackend, ServerTrack, Track};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Locally requested loved flag the player has not confirmed yet
#[derive(Debug, Clone, PartialEq, Eq)]
struct LovedIntent {
    track_id: String,
    loved: bool,
    seq: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    running_track: Option<Track>,
    server_track: Option<ServerTrack>,
    active_backend: Option<PlayerBackend>,
    loved_intent: Option<LovedIntent>,
    intent_seq: u64,
}

/// Marker returned when a reconcile cycle begins.
///
/// Loved intents recorded after this point are newer than anything the
/// cycle's backend read can reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileCycle(u64);

/// Result of writing a reconciled track into the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// No backend to query
    Skipped,

    /// Backend could not be queried; state left as last known
    Failed,

    /// Nothing is playing any more
    Cleared { previous: Option<ServerTrack> },

    /// A different track is now playing
    Changed {
        previous: Option<ServerTrack>,
        current: Track,
    },

    /// Same track, some field changed
    Updated(Track),

    /// Same track, nothing changed
    Unchanged,
}

/// Shared handle to the session's track state
#[derive(Debug, Clone, Default)]
pub struct TrackStateStore {
    inner: Arc<RwLock<StoreState>>,
}

impl TrackStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with an initial active backend
    pub fn with_active_backend(backend: PlayerBackend) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState {
                active_backend: Some(backend),
                ..StoreState::default()
            })),
        }
    }

    pub async fn running_track(&self) -> Option<Track> {
        self.inner.read().await.running_track.clone()
    }

    pub async fn server_track(&self) -> Option<ServerTrack> {
        self.inner.read().await.server_track.clone()
    }

    /// Backend tag of the running track, if it is routable
    pub async fn running_backend(&self) -> Option<PlayerBackend> {
        self.inner
            .read()
            .await
            .running_track
            .as_ref()
            .map(|t| t.player)
            .filter(|b| b.is_assigned())
    }

    pub async fn active_backend(&self) -> Option<PlayerBackend> {
        self.inner.read().await.active_backend
    }

    /// Switch the active backend. Returns the previous one.
    pub async fn set_active_backend(&self, backend: PlayerBackend) -> Option<PlayerBackend> {
        let mut state = self.inner.write().await;
        debug!(from = ?state.active_backend, to = %backend, "Active backend changed");
        state.active_backend.replace(backend)
    }

    /// Record a local loved flag on the running track.
    ///
    /// Updates `Track.loved` and `ServerTrack.loved` together, creating the
    /// server mirror from the track if there is none. Returns `None` when no
    /// track is running or a different track than `track_id` took its place.
    pub async fn apply_loved(&self, track_id: &str, loved: bool) -> Option<Track> {
        let mut guard = self.inner.write().await;
        let state = &mut *guard;

        let track = state.running_track.as_mut().filter(|t| t.id == track_id)?;
        track.loved = loved;
        let track = track.clone();

        let server = state
            .server_track
            .get_or_insert_with(|| ServerTrack::from(&track));
        if server.id != track.id {
            *server = ServerTrack::from(&track);
        }
        server.loved = loved;

        state.intent_seq += 1;
        state.loved_intent = Some(LovedIntent {
            track_id: track.id.clone(),
            loved,
            seq: state.intent_seq,
        });

        Some(track)
    }

    /// Mark the start of a reconcile cycle
    pub async fn begin_cycle(&self) -> ReconcileCycle {
        ReconcileCycle(self.inner.read().await.intent_seq)
    }

    /// Replace the running track with what the backend reported.
    ///
    /// The new record supersedes the old one wholesale, except that a
    /// pending loved intent for the same track wins when the backend has no
    /// loved concept, or when the intent was recorded after `cycle` began.
    /// A backend value equal to the intent confirms and clears it.
    pub async fn apply_reconciled(
        &self,
        reported: Option<Track>,
        cycle: ReconcileCycle,
        backend_supports_loved: bool,
    ) -> ReconcileOutcome {
        let mut state = self.inner.write().await;

        let Some(mut track) = reported.filter(|t| t.has_id()) else {
            state.loved_intent = None;
            if state.running_track.take().is_none() {
                return ReconcileOutcome::Unchanged;
            }
            return ReconcileOutcome::Cleared {
                previous: state.server_track.take(),
            };
        };

        let intent = state
            .loved_intent
            .take()
            .filter(|intent| intent.track_id == track.id);
        if let Some(intent) = intent {
            if track.loved == intent.loved {
                debug!(track_id = %track.id, "Loved state confirmed by player");
            } else if !backend_supports_loved || intent.seq > cycle.0 {
                track.loved = intent.loved;
                state.loved_intent = Some(intent);
            } else {
                debug!(track_id = %track.id, loved = track.loved, "Player overrode local loved state");
            }
        }

        let same_track = state
            .running_track
            .as_ref()
            .is_some_and(|current| current.id == track.id);

        if same_track {
            let unchanged = state.running_track.as_ref() == Some(&track);
            state.server_track = Some(ServerTrack::from(&track));
            state.running_track = Some(track.clone());
            return if unchanged {
                ReconcileOutcome::Unchanged
            } else {
                ReconcileOutcome::Updated(track)
            };
        }

        let previous = state.server_track.replace(ServerTrack::from(&track));
        state.running_track = Some(track.clone());
        ReconcileOutcome::Changed {
            previous,
            current: track,
        }
    }

    /// Forget the running track and its mirror
    pub async fn clear(&self) {
        let mut state = self.inner.write().await;
        state.running_track = None;
        state.server_track = None;
        state.loved_intent = None;
    }
}
