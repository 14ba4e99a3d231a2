//! Player adapter trait and the registry that selects one per backend

use crate::error::Result;
use crate::types::{PlayOptions, PlayerBackend, PlayerDevice, Track};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Control surface of one external music player
///
/// Every call may change the state of an out-of-process player. The effect
/// is not observable synchronously; callers re-query `current_track` to
/// learn the result.
#[async_trait]
pub trait PlayerBackendAdapter: Send + Sync {
    /// Backend this adapter drives
    fn backend(&self) -> PlayerBackend;

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start or resume playback
    async fn play(&self, options: &PlayOptions) -> Result<()>;

    /// Pause playback
    async fn pause(&self) -> Result<()>;

    /// Skip to the next track
    async fn next(&self) -> Result<()>;

    /// Go back to the previous track
    async fn previous(&self) -> Result<()>;

    // ========================================================================
    // State
    // ========================================================================

    /// Query the now-playing track
    ///
    /// Returns `Ok(None)` when nothing is playing.
    async fn current_track(&self) -> Result<Option<Track>>;

    /// List devices the player can target
    ///
    /// Players without a device concept return an empty list.
    async fn devices(&self) -> Result<Vec<PlayerDevice>> {
        Ok(Vec::new())
    }

    // ========================================================================
    // Loved state
    // ========================================================================

    /// Whether the player stores a loved flag of its own
    fn supports_loved(&self) -> bool {
        false
    }

    /// Set the loved flag of the current track
    ///
    /// No-op on players without the concept.
    async fn set_loved(&self, liked: bool) -> Result<()> {
        let _ = liked;
        Ok(())
    }

    // ========================================================================
    // Application lifecycle
    // ========================================================================

    /// Launch the player, optionally cueing a track
    async fn launch(&self, track_id: Option<&str>) -> Result<()> {
        let _ = track_id;
        Ok(())
    }

    /// Quit the player application
    async fn quit(&self) -> Result<()> {
        Ok(())
    }
}

/// Adapters keyed by the backend they drive
#[derive(Clone, Default)]
pub struct AdapterSet {
    adapters: HashMap<PlayerBackend, Arc<dyn PlayerBackendAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own backend, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn PlayerBackendAdapter>) {
        self.adapters.insert(adapter.backend(), adapter);
    }

    /// Builder-style `register`
    #[must_use]
    pub fn with(mut self, adapter: Arc<dyn PlayerBackendAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Adapter for a backend; `None` for `Unassigned` or unregistered backends
    pub fn get(&self, backend: PlayerBackend) -> Option<Arc<dyn PlayerBackendAdapter>> {
        if !backend.is_assigned() {
            return None;
        }
        self.adapters.get(&backend).cloned()
    }

    pub fn contains(&self, backend: PlayerBackend) -> bool {
        self.adapters.contains_key(&backend)
    }

    pub fn backends(&self) -> Vec<PlayerBackend> {
        PlayerBackend::ALL
            .into_iter()
            .filter(|b| self.adapters.contains_key(b))
            .collect()
    }
}

impl fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterSet")
            .field("backends", &self.backends())
            .finish()
    }
}
