//! Spotify Desktop and iTunes Desktop adapters, driven through AppleScript.

use crate::script::{quote, ScriptRunner};
use async_trait::async_trait;
use musictime_core::{
    MusicTimeError, PlayOptions, PlayerBackend, PlayerBackendAdapter, PlayerState, Result, Track,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sentinel printed by the track query when the application is closed
const NOT_RUNNING: &str = "NOT_RUNNING";

/// Field separator used by the track query (ASCII unit separator, never
/// part of track metadata)
const FIELD_SEPARATOR: char = '\u{1f}';

/// Adapter for a scriptable desktop player
pub struct DesktopAdapter {
    backend: PlayerBackend,
    app_name: String,
    runner: Arc<dyn ScriptRunner>,
}

impl DesktopAdapter {
    /// Spotify desktop application
    pub fn spotify(runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            backend: PlayerBackend::SpotifyDesktop,
            app_name: "Spotify".to_string(),
            runner,
        }
    }

    /// iTunes desktop application
    pub fn itunes(runner: Arc<dyn ScriptRunner>) -> Self {
        Self {
            backend: PlayerBackend::ItunesDesktop,
            app_name: "iTunes".to_string(),
            runner,
        }
    }

    /// Override the scripted application name (e.g. "Music" on newer macOS)
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    fn is_itunes(&self) -> bool {
        self.backend == PlayerBackend::ItunesDesktop
    }

    /// Run a script; a failing `osascript` means the player is unreachable
    async fn run(&self, script: &str) -> Result<String> {
        self.runner.run_applescript(script).await.map_err(|e| match e {
            MusicTimeError::Script(message) => MusicTimeError::unavailable(self.backend, message),
            other => other,
        })
    }

    async fn tell(&self, command: &str) -> Result<String> {
        let script = format!("tell application {} to {}", quote(&self.app_name), command);
        debug!(backend = %self.backend, command, "Sending desktop command");
        self.run(&script).await
    }

    fn track_query(&self) -> String {
        let app = quote(&self.app_name);
        let (id_expr, loved_expr) = if self.is_itunes() {
            ("persistent ID of t", "loved of t as string")
        } else {
            ("id of t", "\"false\"")
        };

        format!(
            r#"if application {app} is running then
    set sep to (ASCII character 31)
    tell application {app}
        if player state is stopped then return ""
        set t to current track
        return ({id_expr}) & sep & (name of t) & sep & (artist of t) & sep & (album of t) & sep & (duration of t as string) & sep & (player state as string) & sep & ({loved_expr})
    end tell
else
    return "{NOT_RUNNING}"
end if"#
        )
    }

    fn parse_track(&self, output: &str) -> Result<Option<Track>> {
        let output = output.trim();
        if output.is_empty() || output == NOT_RUNNING {
            return Ok(None);
        }

        let fields: Vec<&str> = output.split(FIELD_SEPARATOR).collect();
        let [id, name, artist, album, duration, state, loved] = fields.as_slice() else {
            return Err(MusicTimeError::parse(format!(
                "expected 7 track fields from {}, got {}",
                self.app_name,
                fields.len()
            )));
        };

        if id.is_empty() {
            return Ok(None);
        }

        // Spotify reports milliseconds, iTunes reports fractional seconds
        let raw: f64 = duration
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| MusicTimeError::parse(format!("invalid duration: {}", duration)))?;
        let duration = if self.is_itunes() {
            Duration::from_secs_f64(raw.max(0.0))
        } else {
            Duration::from_millis(raw.max(0.0) as u64)
        };

        let state = match state.trim() {
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            _ => PlayerState::Stopped,
        };

        Ok(Some(Track {
            id: (*id).to_string(),
            name: (*name).to_string(),
            artist: (*artist).to_string(),
            album: (*album).to_string(),
            player: self.backend,
            loved: loved.trim() == "true",
            duration,
            state,
        }))
    }

    fn play_command(&self, options: &PlayOptions) -> String {
        match (options.track_ids.first(), &options.context_uri) {
            (Some(track), Some(context)) if !self.is_itunes() => {
                format!("play track {} in context {}", quote(track), quote(context))
            }
            (Some(track), _) if !self.is_itunes() => format!("play track {}", quote(track)),
            (Some(track), _) => format!(
                "play (some track whose persistent ID is {})",
                quote(track)
            ),
            (None, Some(context)) if !self.is_itunes() => {
                format!("play track {}", quote(context))
            }
            _ => "play".to_string(),
        }
    }
}

#[async_trait]
impl PlayerBackendAdapter for DesktopAdapter {
    fn backend(&self) -> PlayerBackend {
        self.backend
    }

    async fn play(&self, options: &PlayOptions) -> Result<()> {
        let command = self.play_command(options);
        self.tell(&command).await.map(|_| ())
    }

    async fn pause(&self) -> Result<()> {
        self.tell("pause").await.map(|_| ())
    }

    async fn next(&self) -> Result<()> {
        self.tell("next track").await.map(|_| ())
    }

    async fn previous(&self) -> Result<()> {
        self.tell("previous track").await.map(|_| ())
    }

    async fn current_track(&self) -> Result<Option<Track>> {
        let output = self.run(&self.track_query()).await?;
        self.parse_track(&output)
    }

    fn supports_loved(&self) -> bool {
        self.is_itunes()
    }

    async fn set_loved(&self, liked: bool) -> Result<()> {
        if !self.is_itunes() {
            return Ok(());
        }
        self.tell(&format!("set loved of current track to {}", liked))
            .await
            .map(|_| ())
    }

    async fn launch(&self, track_id: Option<&str>) -> Result<()> {
        self.tell("activate").await?;
        if let Some(id) = track_id {
            let options = PlayOptions {
                track_ids: vec![id.to_string()],
                ..PlayOptions::default()
            };
            self.play(&options).await?;
        }
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.tell("quit").await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::MockScriptRunner;

    fn adapter_with(
        backend: PlayerBackend,
        setup: impl FnOnce(&mut MockScriptRunner),
    ) -> DesktopAdapter {
        let mut runner = MockScriptRunner::new();
        setup(&mut runner);
        let runner: Arc<dyn ScriptRunner> = Arc::new(runner);
        match backend {
            PlayerBackend::ItunesDesktop => DesktopAdapter::itunes(runner),
            _ => DesktopAdapter::spotify(runner),
        }
    }

    #[tokio::test]
    async fn next_sends_next_track_to_app() {
        let adapter = adapter_with(PlayerBackend::SpotifyDesktop, |runner| {
            runner
                .expect_run_applescript()
                .withf(|script: &str| script == "tell application \"Spotify\" to next track")
                .times(1)
                .returning(|_| Ok(String::new()));
        });

        adapter.next().await.unwrap();
    }

    #[tokio::test]
    async fn script_failure_maps_to_unavailable() {
        let adapter = adapter_with(PlayerBackend::ItunesDesktop, |runner| {
            runner
                .expect_run_applescript()
                .returning(|_| Err(MusicTimeError::script("iTunes got an error")));
        });

        let err = adapter.pause().await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn parses_spotify_track_in_milliseconds() {
        let adapter = adapter_with(PlayerBackend::SpotifyDesktop, |runner| {
            runner.expect_run_applescript().returning(|_| {
                Ok("spotify:track:1\u{1f}Song\u{1f}Artist\u{1f}Album\u{1f}215000\u{1f}playing\u{1f}false".to_string())
            });
        });

        let track = adapter.current_track().await.unwrap().unwrap();
        assert_eq!(track.id, "spotify:track:1");
        assert_eq!(track.player, PlayerBackend::SpotifyDesktop);
        assert_eq!(track.duration, Duration::from_millis(215_000));
        assert_eq!(track.state, PlayerState::Playing);
        assert!(!track.loved);
    }

    #[tokio::test]
    async fn parses_itunes_track_in_seconds_with_loved() {
        let adapter = adapter_with(PlayerBackend::ItunesDesktop, |runner| {
            runner.expect_run_applescript().returning(|_| {
                Ok("6A1B\u{1f}Song\u{1f}Artist\u{1f}Album\u{1f}200.5\u{1f}paused\u{1f}true".to_string())
            });
        });

        let track = adapter.current_track().await.unwrap().unwrap();
        assert_eq!(track.duration, Duration::from_secs_f64(200.5));
        assert_eq!(track.state, PlayerState::Paused);
        assert!(track.loved);
    }

    #[tokio::test]
    async fn failed_track_query_is_transient() {
        let adapter = adapter_with(PlayerBackend::SpotifyDesktop, |runner| {
            runner
                .expect_run_applescript()
                .returning(|_| Err(MusicTimeError::script("osascript: Spotify got an error")));
        });

        let err = adapter.current_track().await.unwrap_err();
        assert!(err.is_transient(), "expected transient error, got {:?}", err);
    }

    #[tokio::test]
    async fn tabs_in_metadata_do_not_split_fields() {
        let adapter = adapter_with(PlayerBackend::ItunesDesktop, |runner| {
            runner.expect_run_applescript().returning(|_| {
                Ok("6A1B\u{1f}Intro\tOutro\u{1f}Artist\u{1f}Live\tAlbum\u{1f}61\u{1f}playing\u{1f}false"
                    .to_string())
            });
        });

        let track = adapter.current_track().await.unwrap().unwrap();
        assert_eq!(track.name, "Intro\tOutro");
        assert_eq!(track.album, "Live\tAlbum");
    }

    #[tokio::test]
    async fn closed_app_has_no_track() {
        let adapter = adapter_with(PlayerBackend::SpotifyDesktop, |runner| {
            runner
                .expect_run_applescript()
                .returning(|_| Ok(NOT_RUNNING.to_string()));
        });

        assert!(adapter.current_track().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_track_output_is_a_parse_error() {
        let adapter = adapter_with(PlayerBackend::SpotifyDesktop, |runner| {
            runner
                .expect_run_applescript()
                .returning(|_| Ok("only\u{1f}two".to_string()));
        });

        assert!(matches!(
            adapter.current_track().await,
            Err(MusicTimeError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn loved_is_ignored_by_spotify_desktop() {
        // No expectations: any script call would panic
        let adapter = adapter_with(PlayerBackend::SpotifyDesktop, |_| {});
        assert!(!adapter.supports_loved());
        adapter.set_loved(true).await.unwrap();
    }

    #[tokio::test]
    async fn itunes_sets_loved_on_current_track() {
        let adapter = adapter_with(PlayerBackend::ItunesDesktop, |runner| {
            runner
                .expect_run_applescript()
                .withf(|script: &str| script.ends_with("set loved of current track to true"))
                .times(1)
                .returning(|_| Ok(String::new()));
        });

        assert!(adapter.supports_loved());
        adapter.set_loved(true).await.unwrap();
    }

    #[test]
    fn play_command_uses_context_on_spotify() {
        let adapter = adapter_with(PlayerBackend::SpotifyDesktop, |_| {});
        let options = PlayOptions {
            track_ids: vec!["spotify:track:1".to_string()],
            context_uri: Some("spotify:user:u:playlist:p".to_string()),
            ..PlayOptions::default()
        };
        assert_eq!(
            adapter.play_command(&options),
            r#"play track "spotify:track:1" in context "spotify:user:u:playlist:p""#
        );
        assert_eq!(adapter.play_command(&PlayOptions::default()), "play");
    }
}
