//! Spotify Web API (Spotify Connect) adapter.

use crate::script::ScriptRunner;
use async_trait::async_trait;
use musictime_core::links::spotify_track_uri;
use musictime_core::{
    MusicTimeError, PlayOptions, PlayerBackend, PlayerBackendAdapter, PlayerDevice, PlayerState,
    Result, Track,
};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default Spotify Web API base URL
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com";

/// Web player opened when no Connect device is available
pub const SPOTIFY_WEB_PLAYER_URL: &str = "https://open.spotify.com";

/// Connection settings for the Spotify Web API
#[derive(Debug, Clone)]
pub struct SpotifyWebConfig {
    /// API base URL without trailing slash
    pub api_url: String,

    /// OAuth access token
    pub access_token: String,
}

impl SpotifyWebConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            api_url: SPOTIFY_API_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Point the adapter at a different API host (used by tests)
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize, Default)]
struct PlayBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    context_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<Offset>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Offset {
    Position { position: u32 },
    Uri { uri: String },
}

impl From<&PlayOptions> for PlayBody {
    fn from(options: &PlayOptions) -> Self {
        let uris: Vec<String> = options
            .track_ids
            .iter()
            .map(|id| spotify_track_uri(id))
            .collect();

        let position = options.offset.map(|position| Offset::Position { position });

        match (&options.context_uri, uris.first().cloned()) {
            // A track inside a context starts the context at that track
            (Some(context), Some(first)) => Self {
                context_uri: Some(context.clone()),
                uris: None,
                offset: Some(Offset::Uri { uri: first }),
            },
            (Some(context), None) => Self {
                context_uri: Some(context.clone()),
                uris: None,
                offset: position,
            },
            (None, Some(_)) => Self {
                context_uri: None,
                uris: Some(uris),
                offset: position,
            },
            // Spotify rejects an offset that has nothing to index into
            (None, None) => Self::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    #[serde(default)]
    is_playing: bool,
    item: Option<WebTrack>,
}

#[derive(Debug, Deserialize)]
struct WebTrack {
    uri: String,
    name: String,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    artists: Vec<Named>,
    album: Option<Named>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<PlayerDevice>,
}

impl CurrentlyPlaying {
    fn into_track(self) -> Option<Track> {
        let item = self.item?;
        let artist = item
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Some(Track {
            id: item.uri,
            name: item.name,
            artist,
            album: item.album.map(|a| a.name).unwrap_or_default(),
            player: PlayerBackend::SpotifyWeb,
            loved: false,
            duration: Duration::from_millis(item.duration_ms),
            state: if self.is_playing {
                PlayerState::Playing
            } else {
                PlayerState::Paused
            },
        })
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Drives playback through the Spotify Web API.
pub struct SpotifyWebAdapter {
    http: Client,
    config: SpotifyWebConfig,
    runner: Arc<dyn ScriptRunner>,
}

impl SpotifyWebAdapter {
    pub fn new(config: SpotifyWebConfig, runner: Arc<dyn ScriptRunner>) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(MusicTimeError::invalid_input(
                "Spotify access token cannot be empty",
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("MusicTime/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MusicTimeError::Network(e.to_string()))?;

        Ok(Self {
            http,
            config,
            runner,
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&PlayBody>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.config.api_url, path);
        debug!(method = %method, url = %url, "Spotify Web request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.config.access_token)
            .query(query);
        request = match body {
            Some(body) => request.json(body),
            // Spotify requires a Content-Length on bodiless PUT/POST
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                MusicTimeError::unavailable(PlayerBackend::SpotifyWeb, e.to_string())
            } else {
                MusicTimeError::Network(e.to_string())
            }
        })?;

        check_status(response).await
    }

    async fn command(&self, method: Method, path: &str) -> Result<()> {
        self.send(method, path, &[], None).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    match status {
        // No active device: the player has not woken up yet
        StatusCode::NOT_FOUND | StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            Err(MusicTimeError::unavailable(PlayerBackend::SpotifyWeb, message))
        }
        _ => Err(MusicTimeError::Rejected {
            backend: PlayerBackend::SpotifyWeb,
            status: status.as_u16(),
            message,
        }),
    }
}

#[async_trait]
impl PlayerBackendAdapter for SpotifyWebAdapter {
    fn backend(&self) -> PlayerBackend {
        PlayerBackend::SpotifyWeb
    }

    async fn play(&self, options: &PlayOptions) -> Result<()> {
        let body = PlayBody::from(options);
        let query: Vec<(&str, &str)> = options
            .device_id
            .as_deref()
            .map(|id| vec![("device_id", id)])
            .unwrap_or_default();

        self.send(Method::PUT, "/v1/me/player/play", &query, Some(&body))
            .await
            .map(|_| ())
    }

    async fn pause(&self) -> Result<()> {
        self.command(Method::PUT, "/v1/me/player/pause").await
    }

    async fn next(&self) -> Result<()> {
        self.command(Method::POST, "/v1/me/player/next").await
    }

    async fn previous(&self) -> Result<()> {
        self.command(Method::POST, "/v1/me/player/previous").await
    }

    async fn current_track(&self) -> Result<Option<Track>> {
        let response = self
            .send(Method::GET, "/v1/me/player/currently-playing", &[], None)
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let playing: CurrentlyPlaying = response
            .json()
            .await
            .map_err(|e| MusicTimeError::parse(format!("currently-playing: {}", e)))?;

        Ok(playing.into_track())
    }

    async fn devices(&self) -> Result<Vec<PlayerDevice>> {
        let response = self
            .send(Method::GET, "/v1/me/player/devices", &[], None)
            .await?;

        let devices: DevicesResponse = response
            .json()
            .await
            .map_err(|e| MusicTimeError::parse(format!("devices: {}", e)))?;

        Ok(devices.devices)
    }

    async fn launch(&self, track_id: Option<&str>) -> Result<()> {
        let url = match track_id {
            Some(id) => musictime_core::links::build_spotify_link(id, false),
            None => SPOTIFY_WEB_PLAYER_URL.to_string(),
        };
        self.runner.open_url(&url).await
    }

    async fn quit(&self) -> Result<()> {
        // The web player lives in a browser tab; pausing is the closest thing to quitting
        if let Err(e) = self.pause().await {
            warn!(error = %e, "Failed to pause Spotify Web while quitting");
        }
        Ok(())
    }
}
