//! Domain types shared by every Music Time crate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Identifier of the synthetic "liked songs" playlist.
///
/// Launching it never carries a playlist context; the player is asked for a
/// bare track or library request instead.
pub const LIKED_SONGS_PLAYLIST_ID: &str = "Liked Songs";

/// External music player a track or command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerBackend {
    /// Spotify Web API (Spotify Connect)
    SpotifyWeb,

    /// Spotify desktop application
    SpotifyDesktop,

    /// iTunes / Music desktop application
    ItunesDesktop,

    /// No player identified yet
    #[default]
    Unassigned,
}

impl PlayerBackend {
    /// All routable backends, in registration order
    pub const ALL: [PlayerBackend; 3] = [
        PlayerBackend::SpotifyWeb,
        PlayerBackend::SpotifyDesktop,
        PlayerBackend::ItunesDesktop,
    ];

    /// Whether commands can be routed to this backend
    pub fn is_assigned(self) -> bool {
        self != PlayerBackend::Unassigned
    }

    /// Whether this is one of the Spotify backends
    pub fn is_spotify(self) -> bool {
        matches!(self, PlayerBackend::SpotifyWeb | PlayerBackend::SpotifyDesktop)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerBackend::SpotifyWeb => "spotify_web",
            PlayerBackend::SpotifyDesktop => "spotify_desktop",
            PlayerBackend::ItunesDesktop => "itunes_desktop",
            PlayerBackend::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for PlayerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerBackend::SpotifyWeb => "Spotify Web",
            PlayerBackend::SpotifyDesktop => "Spotify Desktop",
            PlayerBackend::ItunesDesktop => "iTunes Desktop",
            PlayerBackend::Unassigned => "Unassigned",
        };
        f.write_str(name)
    }
}

impl FromStr for PlayerBackend {
    type Err = crate::MusicTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "spotify_web" | "spotify" | "web" => Ok(PlayerBackend::SpotifyWeb),
            "spotify_desktop" => Ok(PlayerBackend::SpotifyDesktop),
            "itunes_desktop" | "itunes" | "music" => Ok(PlayerBackend::ItunesDesktop),
            "unassigned" | "none" => Ok(PlayerBackend::Unassigned),
            other => Err(crate::MusicTimeError::invalid_input(format!(
                "unknown player backend: {}",
                other
            ))),
        }
    }
}

/// Player-reported playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Playing,
    Paused,
    #[default]
    Stopped,
    /// Player application is not running
    NotRunning,
}

/// Now-playing track as reported by a player
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Track {
    /// Player-specific identifier (Spotify URI or iTunes persistent id)
    pub id: String,

    /// Track title
    pub name: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Player this track was read from
    pub player: PlayerBackend,

    /// Whether the listener has loved/liked the track
    pub loved: bool,

    /// Track duration
    pub duration: Duration,

    /// Playback state at the time of the query
    pub state: PlayerState,
}

impl Track {
    /// Create a track with the given id and name on a backend
    pub fn new(id: impl Into<String>, name: impl Into<String>, player: PlayerBackend) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            player,
            ..Self::default()
        }
    }

    /// Whether this record actually identifies a track
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }
}

/// Mirror of the running track kept for upload to the backend service.
///
/// Only `loved` may diverge from the running track, because it is set
/// optimistically before the service confirms it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServerTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub player: PlayerBackend,
    pub loved: bool,
    pub duration: Duration,
}

impl From<&Track> for ServerTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            player: track.player,
            loved: track.loved,
            duration: track.duration,
        }
    }
}

/// Entry of a playlist listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,

    /// Position within the parent listing
    pub position: u32,

    /// Playlist this item belongs to, if it is a track
    pub parent_id: Option<String>,
}

impl PlaylistItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            parent_id: None,
        }
    }
}

/// Spotify Connect device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDevice {
    pub id: String,
    pub name: String,
    pub is_active: bool,

    /// Device kind as reported by Spotify ("Computer", "Smartphone", ...)
    #[serde(rename = "type", default)]
    pub device_type: String,
}

impl PlayerDevice {
    /// Whether this device is a browser-hosted web player
    pub fn is_web_player(&self) -> bool {
        self.name.contains("Web Player")
    }
}

/// Spotify account the playlists belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyUser {
    pub id: String,

    /// Account URI, e.g. `spotify:user:abc`
    pub uri: String,
}

impl SpotifyUser {
    /// Context URI for one of this user's playlists
    pub fn playlist_uri(&self, playlist_id: &str) -> String {
        format!("{}:playlist:{}", self.uri, playlist_id)
    }
}

/// Options for a play command.
///
/// A request without `context_uri` is a bare track or library request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayOptions {
    /// Device to bind the request to
    pub device_id: Option<String>,

    /// Playlist or album context to play from
    pub context_uri: Option<String>,

    /// Explicit tracks to play
    pub track_ids: Vec<String>,

    /// Start position within the context
    pub offset: Option<u32>,
}

impl PlayOptions {
    pub fn has_context(&self) -> bool {
        self.context_uri.is_some()
    }

    /// Whether the request carries neither context nor tracks
    pub fn is_library_request(&self) -> bool {
        self.context_uri.is_none() && self.track_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parsing_accepts_aliases() {
        assert_eq!("spotify".parse::<PlayerBackend>().unwrap(), PlayerBackend::SpotifyWeb);
        assert_eq!(
            "spotify-desktop".parse::<PlayerBackend>().unwrap(),
            PlayerBackend::SpotifyDesktop
        );
        assert_eq!("iTunes".parse::<PlayerBackend>().unwrap(), PlayerBackend::ItunesDesktop);
        assert!("winamp".parse::<PlayerBackend>().is_err());
    }

    #[test]
    fn unassigned_is_not_routable() {
        assert!(!PlayerBackend::Unassigned.is_assigned());
        assert!(PlayerBackend::ALL.iter().all(|b| b.is_assigned()));
    }

    #[test]
    fn server_track_copies_loved_flag() {
        let mut track = Track::new("spotify:track:1", "Song", PlayerBackend::SpotifyWeb);
        track.loved = true;

        let server = ServerTrack::from(&track);
        assert_eq!(server.id, track.id);
        assert!(server.loved);
    }

    #[test]
    fn playlist_uri_uses_user_uri() {
        let user = SpotifyUser {
            id: "abc".to_string(),
            uri: "spotify:user:abc".to_string(),
        };
        assert_eq!(user.playlist_uri("xyz"), "spotify:user:abc:playlist:xyz");
    }

    #[test]
    fn device_deserializes_spotify_shape() {
        let json = r#"{"id":"d1","name":"Web Player (Chrome)","is_active":false,"type":"Computer"}"#;
        let device: PlayerDevice = serde_json::from_str(json).unwrap();
        assert!(device.is_web_player());
        assert_eq!(device.device_type, "Computer");
    }
}
