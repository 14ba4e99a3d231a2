//! Spotify Web adapter tests against a mock Web API.

use async_trait::async_trait;
use musictime_core::{MusicTimeError, PlayOptions, PlayerBackendAdapter, PlayerState, Result};
use musictime_players::{ScriptRunner, SpotifyWebAdapter, SpotifyWebConfig};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

#[derive(Default)]
struct RecordingRunner {
    opened: Mutex<Vec<String>>,
}

#[async_trait]
impl ScriptRunner for RecordingRunner {
    async fn run_applescript(&self, _script: &str) -> Result<String> {
        Ok(String::new())
    }

    async fn open_url(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn adapter_for(server: &MockServer, runner: Arc<RecordingRunner>) -> SpotifyWebAdapter {
    let config = SpotifyWebConfig::new("token-123").with_api_url(server.uri());
    SpotifyWebAdapter::new(config, runner).unwrap()
}

// =============================================================================
// Transport
// =============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn test_play_binds_device_and_context() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/me/player/play"))
            .and(query_param("device_id", "device-1"))
            .and(header("authorization", "Bearer token-123"))
            .and(body_json(serde_json::json!({
                "context_uri": "spotify:user:u:playlist:p",
                "offset": { "position": 0 }
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        let options = PlayOptions {
            device_id: Some("device-1".to_string()),
            context_uri: Some("spotify:user:u:playlist:p".to_string()),
            offset: Some(0),
            ..PlayOptions::default()
        };

        adapter.play(&options).await.unwrap();
    }

    #[tokio::test]
    async fn test_play_track_within_playlist_uses_uri_offset() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/me/player/play"))
            .and(body_json(serde_json::json!({
                "context_uri": "spotify:user:u:playlist:p",
                "offset": { "uri": "spotify:track:t1" }
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        let options = PlayOptions {
            context_uri: Some("spotify:user:u:playlist:p".to_string()),
            track_ids: vec!["spotify:track:t1".to_string()],
            ..PlayOptions::default()
        };

        adapter.play(&options).await.unwrap();
    }

    #[tokio::test]
    async fn test_next_and_previous_use_post() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/me/player/next"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/me/player/previous"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        adapter.next().await.unwrap();
        adapter.previous().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_active_device_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/me/player/pause"))
            .respond_with(ResponseTemplate::new(404).set_body_string("NO_ACTIVE_DEVICE"))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        let err = adapter.pause().await.unwrap_err();
        assert!(err.is_transient(), "expected transient error, got {:?}", err);
    }

    #[tokio::test]
    async fn test_forbidden_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/me/player/play"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PREMIUM_REQUIRED"))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        match adapter.play(&PlayOptions::default()).await.unwrap_err() {
            MusicTimeError::Rejected { status, message, .. } => {
                assert_eq!(status, 403);
                assert_eq!(message, "PREMIUM_REQUIRED");
            }
            e => panic!("Expected Rejected error, got: {:?}", e),
        }
    }
}

// =============================================================================
// State queries
// =============================================================================

mod state {
    use super::*;

    #[tokio::test]
    async fn test_current_track_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "is_playing": true,
                "progress_ms": 1000,
                "item": {
                    "id": "4CxFN5zON70B3VOPBYbd6P",
                    "uri": "spotify:track:4CxFN5zON70B3VOPBYbd6P",
                    "name": "you were good to me",
                    "duration_ms": 219146,
                    "artists": [{ "name": "Jeremy Zucker" }, { "name": "Chelsea Cutler" }],
                    "album": { "name": "brent" }
                }
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        let track = adapter.current_track().await.unwrap().unwrap();

        assert_eq!(track.id, "spotify:track:4CxFN5zON70B3VOPBYbd6P");
        assert_eq!(track.artist, "Jeremy Zucker, Chelsea Cutler");
        assert_eq!(track.album, "brent");
        assert_eq!(track.state, PlayerState::Playing);
        assert_eq!(track.duration.as_millis(), 219_146);
    }

    #[tokio::test]
    async fn test_nothing_playing_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        assert!(adapter.current_track().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_devices_listed_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/me/player/devices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "devices": [
                    { "id": "a", "name": "MacBook", "is_active": true, "type": "Computer" },
                    { "id": "b", "name": "Web Player (Chrome)", "is_active": false, "type": "Computer" }
                ]
            })))
            .mount(&server)
            .await;

        let adapter = adapter_for(&server, Arc::default());
        let devices = adapter.devices().await.unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "a");
        assert!(devices[1].is_web_player());
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_empty_token_rejected() {
        let result = SpotifyWebAdapter::new(SpotifyWebConfig::new(""), Arc::new(RecordingRunner::default()));
        assert!(matches!(result, Err(MusicTimeError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_launch_opens_track_link() {
        let server = MockServer::start().await;
        let runner = Arc::new(RecordingRunner::default());
        let adapter = adapter_for(&server, runner.clone());

        adapter.launch(Some("spotify:track:abc")).await.unwrap();
        adapter.launch(None).await.unwrap();

        let opened = runner.opened.lock().unwrap().clone();
        assert_eq!(
            opened,
            vec![
                "https://open.spotify.com/track/abc".to_string(),
                "https://open.spotify.com".to_string()
            ]
        );
    }
}
