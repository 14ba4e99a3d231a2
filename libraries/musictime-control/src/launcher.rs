//! Playlist launcher
//!
//! Starts a playlist (or a single track from it) on Spotify and confirms
//! the player actually picked it up. Remote devices that are asleep often
//! drop the first play command, so an unconfirmed launch is reissued a
//! bounded number of times.
//!
//! Attempt lifecycle:
//!
//! ```text
//! Requested -> Issued -> Confirmed
//!                     -> Retrying -> Issued (bounded)
//!                     -> GaveUp
//! ```

use crate::events::ControlEvent;
use crate::reconciler::StateReconciler;
use crate::session::Session;
use musictime_core::links::spotify_id_from_uri;
use musictime_core::{
    PlayOptions, PlayerBackend, PlayerDevice, PlaylistItem, SpotifyUser, Track,
    LIKED_SONGS_PLAYLIST_ID,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Terminal state of a playlist launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchOutcome {
    /// The player reported the requested track (or any track for a context)
    Confirmed { attempts: u32 },

    /// Every attempt went unconfirmed; state is whatever was last reconciled
    GaveUp { attempts: u32 },

    /// Confirmation was not requested; a reconcile was scheduled instead
    Unconfirmed,

    /// A newer launch or control command took over while waiting to retry
    Superseded { attempts: u32 },

    /// No Spotify Web adapter is registered
    NoBackend,
}

impl LaunchOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            LaunchOutcome::Confirmed { attempts }
            | LaunchOutcome::GaveUp { attempts }
            | LaunchOutcome::Superseded { attempts } => *attempts,
            LaunchOutcome::Unconfirmed => 1,
            LaunchOutcome::NoBackend => 0,
        }
    }
}

/// Build the play request for a playlist launch.
///
/// - an item plays that single track, otherwise playback starts at offset 0
/// - the first known device is targeted
/// - the liked-songs playlist never carries a context
pub fn build_play_request(
    user: &SpotifyUser,
    playlist_id: Option<&str>,
    item: Option<&PlaylistItem>,
    devices: &[PlayerDevice],
) -> PlayOptions {
    let playlist_id = playlist_id.filter(|id| !id.is_empty() && *id != LIKED_SONGS_PLAYLIST_ID);

    let mut options = PlayOptions {
        device_id: devices.first().map(|d| d.id.clone()),
        context_uri: playlist_id.map(|id| user.playlist_uri(id)),
        ..PlayOptions::default()
    };

    match item {
        Some(item) => options.track_ids = vec![item.id.clone()],
        None => options.offset = Some(0),
    }

    options
}

/// Whether the player's now-playing track confirms the launch
fn is_confirmed(item: Option<&PlaylistItem>, track: &Track) -> bool {
    match item {
        Some(item) => spotify_id_from_uri(&track.id) == spotify_id_from_uri(&item.id),
        None => track.has_id(),
    }
}

/// Launches playlists on Spotify Web with confirmation and bounded retry
#[derive(Debug, Clone)]
pub struct PlaylistLauncher {
    session: Session,
    reconciler: StateReconciler,
}

impl PlaylistLauncher {
    pub fn new(session: Session) -> Self {
        let reconciler = StateReconciler::new(session.clone());
        Self {
            session,
            reconciler,
        }
    }

    /// Play `item` (or the playlist from the top) and confirm it started.
    ///
    /// With `max_retry_count == 0` nothing is confirmed and one reconcile is
    /// scheduled. Otherwise at most `max_retry_count + 1` play commands are
    /// issued, refreshing the device list between attempts. Giving up is not
    /// an error.
    pub async fn play_from_playlist(
        &self,
        user: &SpotifyUser,
        playlist_id: Option<&str>,
        item: Option<&PlaylistItem>,
        devices: Vec<PlayerDevice>,
        max_retry_count: u32,
    ) -> LaunchOutcome {
        let outcome = self
            .run(user, playlist_id, item, devices, max_retry_count)
            .await;
        self.session
            .emit(ControlEvent::LaunchFinished { outcome });
        outcome
    }

    async fn run(
        &self,
        user: &SpotifyUser,
        playlist_id: Option<&str>,
        item: Option<&PlaylistItem>,
        mut devices: Vec<PlayerDevice>,
        max_retry_count: u32,
    ) -> LaunchOutcome {
        let Some(adapter) = self.session.adapter(PlayerBackend::SpotifyWeb) else {
            warn!("Spotify Web adapter not registered, cannot launch playlist");
            return LaunchOutcome::NoBackend;
        };

        // Playlists live on Spotify; route follow-up reconciles there
        let store = self.session.store();
        if !store
            .active_backend()
            .await
            .is_some_and(PlayerBackend::is_spotify)
        {
            store.set_active_backend(PlayerBackend::SpotifyWeb).await;
            self.session.emit(ControlEvent::ActiveBackendChanged {
                backend: PlayerBackend::SpotifyWeb,
            });
        }

        let generation = self.session.begin_launch();
        debug!(
            playlist_id = ?playlist_id,
            item = ?item.map(|i| &i.id),
            max_retry_count,
            "Launch requested"
        );

        let mut attempts = 0;
        loop {
            let options = build_play_request(user, playlist_id, item, &devices);
            attempts += 1;
            if let Err(e) = adapter.play(&options).await {
                warn!(attempt = attempts, error = %e, "Play command failed");
            }
            debug!(attempt = attempts, device_id = ?options.device_id, "Launch issued");

            if max_retry_count == 0 {
                self.reconciler
                    .schedule(self.session.config().launch_reconcile_delay());
                return LaunchOutcome::Unconfirmed;
            }

            match adapter.current_track().await {
                Ok(Some(track)) if is_confirmed(item, &track) => {
                    info!(attempts, track_id = %track.id, "Launch confirmed");
                    self.reconciler.reconcile().await;
                    return LaunchOutcome::Confirmed { attempts };
                }
                Ok(_) => {}
                Err(e) => warn!(attempt = attempts, error = %e, "Failed to confirm launch"),
            }

            if attempts > max_retry_count {
                info!(attempts, "Launch unconfirmed, giving up");
                return LaunchOutcome::GaveUp { attempts };
            }

            match adapter.devices().await {
                Ok(refreshed) => devices = refreshed,
                Err(e) => warn!(error = %e, "Failed to refresh devices, keeping previous list"),
            }

            debug!(attempt = attempts, "Launch retrying");
            tokio::time::sleep(self.session.config().retry_delay()).await;

            if !self.session.is_current_launch(generation) {
                debug!(attempts, "Launch superseded");
                return LaunchOutcome::Superseded { attempts };
            }
        }
    }
}
