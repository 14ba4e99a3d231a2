/// CLI configuration
use anyhow::{bail, Result};
use musictime_control::ControlConfig;
use musictime_core::PlayerBackend;
use musictime_players::SPOTIFY_API_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "musictime.toml";

/// Environment variable prefix, e.g. `MUSICTIME_SPOTIFY__ACCESS_TOKEN`
const ENV_PREFIX: &str = "MUSICTIME";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default)]
    pub spotify: SpotifySettings,

    #[serde(default)]
    pub service: ServiceSettings,

    #[serde(default)]
    pub player: PlayerSettings,

    #[serde(default)]
    pub dashboard: DashboardSettings,

    #[serde(default)]
    pub account: AccountSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpotifySettings {
    #[serde(default = "default_spotify_api_url")]
    pub api_url: String,

    /// OAuth access token for the Spotify Web API
    #[serde(default)]
    pub access_token: String,

    /// Account URI, e.g. `spotify:user:abc`
    #[serde(default)]
    pub user_uri: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSettings {
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Web app used for login
    #[serde(default = "default_launch_url")]
    pub launch_url: String,

    #[serde(default)]
    pub jwt: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerSettings {
    /// Player targeted before anything has been launched
    #[serde(default)]
    pub default_backend: PlayerBackend,
}

/// Account state as last reported by the Music Time web app
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountSettings {
    #[serde(default)]
    pub slack_connected: bool,

    #[serde(default)]
    pub has_saved_playlists: bool,

    /// Whether any favorite songs exist to build a personal playlist from
    #[serde(default)]
    pub has_favorites: bool,

    /// Generated personal playlist, empty when none exists yet
    #[serde(default)]
    pub personal_playlist_id: String,
}

impl AccountSettings {
    pub fn has_personal_playlist(&self) -> bool {
        !self.personal_playlist_id.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardSettings {
    #[serde(default = "default_dashboard_file")]
    pub file: PathBuf,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        let config = settings.add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("spotify.api_url", &self.spotify.api_url),
            ("service.api_endpoint", &self.service.api_endpoint),
            ("service.launch_url", &self.service.launch_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{} must start with http:// or https:// (got {:?})", name, url);
            }
        }

        if self.player.default_backend == PlayerBackend::SpotifyWeb && !self.has_spotify_token() {
            bail!(
                "Spotify Web needs an access token (set MUSICTIME_SPOTIFY__ACCESS_TOKEN)"
            );
        }

        Ok(())
    }

    pub fn has_spotify_token(&self) -> bool {
        !self.spotify.access_token.trim().is_empty()
    }

    pub fn has_jwt(&self) -> bool {
        !self.service.jwt.trim().is_empty()
    }
}

// Default values
fn default_spotify_api_url() -> String {
    SPOTIFY_API_URL.to_string()
}

fn default_api_endpoint() -> String {
    "https://api.software.com".to_string()
}

fn default_launch_url() -> String {
    "https://app.software.com".to_string()
}

fn default_dashboard_file() -> PathBuf {
    PathBuf::from("MusicTime.txt")
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            api_url: default_spotify_api_url(),
            access_token: String::new(),
            user_uri: String::new(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            launch_url: default_launch_url(),
            jwt: String::new(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            file: default_dashboard_file(),
        }
    }
}
