/// Music Time action menu
///
/// Builds the ordered action list shown to the listener. Rendering and
/// selection are up to the caller.
use crate::config::AppConfig;
use musictime_core::PlayerBackend;

pub const GITHUB_ISSUES_URL: &str = "https://github.com/swdotcom/swdc-vscode/issues";
pub const FEEDBACK_URL: &str = "mailto:cody@software.com";

/// What the menu needs to know about the session
#[derive(Debug, Clone, Default)]
pub struct MenuContext {
    pub logged_in: bool,
    pub server_online: bool,
    pub spotify_connected: bool,
    pub slack_connected: bool,
    pub has_saved_playlists: bool,
    pub has_favorites: bool,
    pub has_personal_playlist: bool,
    pub active_backend: Option<PlayerBackend>,
}

impl MenuContext {
    /// Context for the configured account
    pub fn from_config(
        config: &AppConfig,
        server_online: bool,
        active_backend: Option<PlayerBackend>,
    ) -> Self {
        Self {
            logged_in: config.has_jwt(),
            server_online,
            spotify_connected: config.has_spotify_token(),
            slack_connected: config.account.slack_connected,
            has_saved_playlists: config.account.has_saved_playlists,
            has_favorites: config.account.has_favorites,
            has_personal_playlist: config.account.has_personal_playlist(),
            active_backend,
        }
    }
}

/// What selecting a menu item does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    ConnectSpotify,
    ConnectSlack,
    GeneratePlaylist,
    RefreshPlaylist,
    /// `available` is false when the service is offline and login cannot start
    Login { available: bool },
    Dashboard,
    OpenUrl(String),
    LaunchPlayer(PlayerBackend),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub detail: String,
    pub action: MenuAction,
}

impl MenuItem {
    fn new(label: &str, detail: &str, action: MenuAction) -> Self {
        Self {
            label: label.to_string(),
            detail: detail.to_string(),
            action,
        }
    }
}

pub fn build_menu(ctx: &MenuContext) -> Vec<MenuItem> {
    let mut items = Vec::new();

    if !ctx.spotify_connected && ctx.server_online {
        items.push(MenuItem::new(
            "Connect Spotify",
            "To see your Spotify playlists in Music Time, please connect your account",
            MenuAction::ConnectSpotify,
        ));
    }

    if !ctx.slack_connected && ctx.server_online {
        items.push(MenuItem::new(
            "Connect Slack",
            "To share a playlist or track on Slack, please connect your account",
            MenuAction::ConnectSlack,
        ));
    }

    // Offer the personal playlist once there are favorites to build it from
    if ctx.spotify_connected && !ctx.has_saved_playlists && ctx.has_favorites {
        items.push(if ctx.has_personal_playlist {
            MenuItem::new(
                "Refresh My AI Playlist",
                "Refresh your personalized playlist with your latest coding favorites",
                MenuAction::RefreshPlaylist,
            )
        } else {
            MenuItem::new(
                "Generate My AI Playlist",
                "Create a personalized playlist of your top songs while coding",
                MenuAction::GeneratePlaylist,
            )
        });
    }

    if !ctx.logged_in {
        items.push(if ctx.server_online {
            MenuItem::new(
                "Log in to see your coding data",
                "To see your music data in Music Time, please log in to your account",
                MenuAction::Login { available: true },
            )
        } else {
            MenuItem::new(
                "Log in to see your coding data",
                "Our service is temporarily unavailable. Please try again later.",
                MenuAction::Login { available: false },
            )
        });
    }

    items.push(MenuItem::new(
        "Music Time Dashboard",
        "View your latest music metrics right here in your editor",
        MenuAction::Dashboard,
    ));

    items.push(MenuItem::new(
        "Submit an issue on GitHub",
        "Encounter a bug? Submit an issue on our GitHub page",
        MenuAction::OpenUrl(GITHUB_ISSUES_URL.to_string()),
    ));

    items.push(MenuItem::new(
        "Submit Feedback",
        "Send us an email at cody@software.com.",
        MenuAction::OpenUrl(FEEDBACK_URL.to_string()),
    ));

    if ctx.active_backend == Some(PlayerBackend::SpotifyWeb) {
        items.push(MenuItem::new(
            "Switch to iTunes",
            "Launch the iTunes web player to view your playlist",
            MenuAction::LaunchPlayer(PlayerBackend::ItunesDesktop),
        ));
    } else {
        items.push(MenuItem::new(
            "Switch to Spotify",
            "Launch the Spotify web player to view your playlist",
            MenuAction::LaunchPlayer(PlayerBackend::SpotifyWeb),
        ));
    }

    items
}
