//! Playback control surface
//!
//! Routes transport commands to the player that owns the running track and
//! schedules a resync afterwards, because players apply commands
//! asynchronously and the only way to observe the result is to ask again.

use crate::events::{ControlEvent, TransportCommand};
use crate::reconciler::StateReconciler;
use crate::scheduler::TaskKey;
use crate::session::Session;
use musictime_core::{PlayOptions, PlayerBackend, PlayerBackendAdapter, Track};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when Spotify has to be opened before it can take commands
const SPOTIFY_LAUNCH_MESSAGE: &str = "After you select and play your first song in Spotify, \
standard controls (play, pause, next, etc.) will appear in your status bar.";

/// Play/pause/next/previous, loved toggling and player launching
#[derive(Debug, Clone)]
pub struct PlaybackControlSurface {
    session: Session,
    reconciler: StateReconciler,
}

impl PlaybackControlSurface {
    pub fn new(session: Session) -> Self {
        let reconciler = StateReconciler::new(session.clone());
        Self {
            session,
            reconciler,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reconciler(&self) -> &StateReconciler {
        &self.reconciler
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn play(&self, backend: Option<PlayerBackend>) -> Option<PlayerBackend> {
        self.dispatch(TransportCommand::Play, backend).await
    }

    pub async fn pause(&self, backend: Option<PlayerBackend>) -> Option<PlayerBackend> {
        self.dispatch(TransportCommand::Pause, backend).await
    }

    pub async fn next(&self, backend: Option<PlayerBackend>) -> Option<PlayerBackend> {
        self.dispatch(TransportCommand::Next, backend).await
    }

    pub async fn previous(&self, backend: Option<PlayerBackend>) -> Option<PlayerBackend> {
        self.dispatch(TransportCommand::Previous, backend).await
    }

    /// Resolve the target player and send `command` to it.
    ///
    /// Without an override the running track's player is targeted; with no
    /// running track this is a no-op. Returns the backend the command went to.
    async fn dispatch(
        &self,
        command: TransportCommand,
        backend: Option<PlayerBackend>,
    ) -> Option<PlayerBackend> {
        let backend = match backend {
            Some(backend) => backend,
            None => self.session.store().running_backend().await?,
        };
        let Some(adapter) = self.session.adapter(backend) else {
            debug!(%backend, %command, "No adapter for backend, ignoring command");
            return None;
        };

        // A manual command wins over a playlist launch still retrying
        self.session.supersede_launches();

        let result = match command {
            TransportCommand::Play => adapter.play(&PlayOptions::default()).await,
            TransportCommand::Pause => adapter.pause().await,
            TransportCommand::Next => adapter.next().await,
            TransportCommand::Previous => adapter.previous().await,
        };

        match result {
            Ok(()) => debug!(%backend, %command, "Command dispatched"),
            Err(e) => warn!(%backend, %command, error = %e, "Player command failed"),
        }

        self.session
            .emit(ControlEvent::CommandDispatched { backend, command });
        self.reconciler.schedule(self.session.config().reconcile_delay());

        Some(backend)
    }

    // ========================================================================
    // Loved state
    // ========================================================================

    /// Love or un-love the running track.
    ///
    /// Players with their own loved flag are told first; a failure there is
    /// logged and the local update still commits. Returns the updated track,
    /// or `None` when nothing is running.
    pub async fn set_loved(&self, liked: bool) -> Option<Track> {
        let track = self.session.store().running_track().await?;

        if let Some(adapter) = self.session.adapter(track.player) {
            if adapter.supports_loved() {
                if let Err(e) = adapter.set_loved(liked).await {
                    warn!(backend = %track.player, error = %e, "Failed to update player loved state");
                }
            }
        }

        let updated = self.session.store().apply_loved(&track.id, liked).await?;
        info!(track_id = %updated.id, loved = liked, "Loved state updated");
        self.session.emit(ControlEvent::LovedChanged {
            track_id: updated.id.clone(),
            loved: liked,
        });

        Some(updated)
    }

    // ========================================================================
    // Player launching
    // ========================================================================

    /// Switch to a player and open it.
    ///
    /// With `None` the player of the currently running track is reopened on
    /// that track. Returns the backend that was launched or scheduled.
    pub async fn launch_player(&self, backend: Option<PlayerBackend>) -> Option<PlayerBackend> {
        match backend {
            Some(PlayerBackend::ItunesDesktop) => Some(self.launch_itunes().await),
            Some(backend) if backend.is_spotify() => Some(self.launch_spotify(backend).await),
            _ => self.relaunch_running().await,
        }
    }

    async fn activate(&self, backend: PlayerBackend) -> Option<PlayerBackend> {
        let previous = self.session.store().set_active_backend(backend).await;
        if previous != Some(backend) {
            self.session
                .emit(ControlEvent::ActiveBackendChanged { backend });
        }
        previous
    }

    async fn launch_itunes(&self) -> PlayerBackend {
        let previous = self.activate(PlayerBackend::ItunesDesktop).await;

        let running = self.session.store().running_track().await;
        if running.is_some_and(|t| t.player.is_spotify()) {
            // End the Spotify session before handing over
            if previous == Some(PlayerBackend::SpotifyDesktop) {
                self.with_adapter(PlayerBackend::SpotifyDesktop, |a| async move { a.quit().await })
                    .await;
            } else {
                self.with_adapter(PlayerBackend::SpotifyWeb, |a| async move { a.pause().await })
                    .await;
            }
        }

        self.session.emit(ControlEvent::PlayerLaunching {
            backend: PlayerBackend::ItunesDesktop,
            message: None,
        });
        self.with_adapter(PlayerBackend::ItunesDesktop, |a| async move { a.launch(None).await })
            .await;

        PlayerBackend::ItunesDesktop
    }

    async fn launch_spotify(&self, backend: PlayerBackend) -> PlayerBackend {
        self.activate(backend).await;
        self.with_adapter(PlayerBackend::ItunesDesktop, |a| async move { a.quit().await })
            .await;

        let devices = match self.session.adapter(PlayerBackend::SpotifyWeb) {
            Some(adapter) => adapter.devices().await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to list Spotify devices");
                Vec::new()
            }),
            None => Vec::new(),
        };
        if !devices.is_empty() {
            debug!(count = devices.len(), "Spotify device available, not launching");
            return backend;
        }

        if let Some(adapter) = self.session.adapter(PlayerBackend::SpotifyWeb) {
            self.session.emit(ControlEvent::PlayerLaunching {
                backend: PlayerBackend::SpotifyWeb,
                message: Some(SPOTIFY_LAUNCH_MESSAGE.to_string()),
            });
            self.session.scheduler().schedule(
                TaskKey::PlayerLaunch,
                self.session.config().launch_delay(),
                async move {
                    if let Err(e) = adapter.launch(None).await {
                        warn!(error = %e, "Failed to open Spotify web player");
                    }
                },
            );
        } else {
            debug!("Spotify Web not registered, nothing to open");
        }

        backend
    }

    async fn relaunch_running(&self) -> Option<PlayerBackend> {
        self.reconciler.reconcile().await;
        let track = self
            .session
            .store()
            .running_track()
            .await
            .filter(|t| t.has_id())?;

        let mut backend = track.player;
        if backend == PlayerBackend::SpotifyWeb {
            // A single non-browser device means the desktop app is the player
            if let Some(adapter) = self.session.adapter(PlayerBackend::SpotifyWeb) {
                let devices = adapter.devices().await.unwrap_or_default();
                if devices.len() == 1 && !devices[0].is_web_player() {
                    backend = PlayerBackend::SpotifyDesktop;
                }
            }
        }
        if !backend.is_assigned() {
            backend = PlayerBackend::SpotifyWeb;
        }

        self.activate(backend).await;
        self.session.emit(ControlEvent::PlayerLaunching {
            backend,
            message: None,
        });

        let track_id = track.id;
        self.with_adapter(backend, move |a| async move { a.launch(Some(&track_id)).await })
            .await;

        Some(backend)
    }

    /// Run a best-effort adapter call, logging failures
    async fn with_adapter<F, Fut>(&self, backend: PlayerBackend, call: F)
    where
        F: FnOnce(Arc<dyn PlayerBackendAdapter>) -> Fut,
        Fut: std::future::Future<Output = musictime_core::Result<()>>,
    {
        let Some(adapter) = self.session.adapter(backend) else {
            debug!(%backend, "No adapter registered");
            return;
        };
        if let Err(e) = call(adapter).await {
            warn!(%backend, error = %e, "Player call failed");
        }
    }
}
