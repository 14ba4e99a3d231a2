/// Music Time - command line player control
mod config;
mod menu;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crate::config::AppConfig;
use crate::menu::{build_menu, MenuAction, MenuContext};
use musictime_control::{
    ControlEvent, PlaybackControlSurface, PlaylistLauncher, Session, TaskKey, TrackStateStore,
};
use musictime_core::links::{build_spotify_link, spotify_track_uri};
use musictime_core::{AdapterSet, PlayerBackend, PlaylistItem, SpotifyUser, Track};
use musictime_players::{
    DesktopAdapter, OsascriptRunner, ScriptRunner, SpotifyWebAdapter, SpotifyWebConfig,
};
use musictime_server_client::{DashboardCache, ServerConfig, SoftwareClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_UNAVAILABLE: &str = "Our service is temporarily unavailable.\n\nPlease try again later.";

#[derive(Parser)]
#[command(name = "musictime")]
#[command(about = "Control Spotify and iTunes from the command line", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "MUSICTIME_CONFIG")]
    config: Option<PathBuf>,

    /// Player to target (spotify, spotify-desktop, itunes)
    #[arg(short, long, global = true)]
    player: Option<PlayerBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or resume playback
    Play,
    /// Pause playback
    Pause,
    /// Skip to the next track
    Next,
    /// Go back to the previous track
    Previous,
    /// Love the current track
    Like,
    /// Un-love the current track
    Unlike,
    /// Switch to a player and open it
    Launch {
        /// Player to open; defaults to the player of the current track
        target: Option<PlayerBackend>,
    },
    /// Play a Spotify playlist, or one track from it
    PlayPlaylist {
        /// Playlist id ("Liked Songs" for the library)
        #[arg(long)]
        playlist: Option<String>,
        /// Track id or URI to start with
        #[arg(long)]
        track: Option<String>,
        /// Confirmation retries (0 skips confirmation)
        #[arg(long)]
        retries: Option<u32>,
    },
    /// List Spotify Connect devices
    Devices,
    /// Show the current track
    Status,
    /// Refresh and print the listening dashboard
    Dashboard,
    /// Connect Spotify to your Music Time account
    ConnectSpotify,
    /// Disconnect Spotify from your Music Time account
    Disconnect,
    /// Show the action menu
    Menu {
        /// Run the numbered menu entry
        #[arg(long)]
        select: Option<usize>,
    },
    /// Interactive session reading commands from stdin
    Session,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "musictime=info,musictime_control=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(player) = cli.player {
        config.player.default_backend = player;
    }
    config.validate()?;

    let app = App::start(config).await?;

    match cli.command {
        Commands::Play => {
            app.play().await;
            app.settle().await;
            app.print_status().await;
        }
        Commands::Pause => {
            app.surface.pause(None).await;
            app.settle().await;
            app.print_status().await;
        }
        Commands::Next => {
            app.surface.next(None).await;
            app.settle().await;
            app.print_status().await;
        }
        Commands::Previous => {
            app.surface.previous(None).await;
            app.settle().await;
            app.print_status().await;
        }
        Commands::Like => app.set_loved(true).await,
        Commands::Unlike => app.set_loved(false).await,
        Commands::Launch { target } => {
            app.launch(target).await;
            app.settle().await;
        }
        Commands::PlayPlaylist {
            playlist,
            track,
            retries,
        } => {
            app.play_playlist(playlist, track, retries).await?;
            app.settle().await;
            app.print_status().await;
        }
        Commands::Devices => app.print_devices().await?,
        Commands::Status => app.print_status().await,
        Commands::Dashboard => app.dashboard().await?,
        Commands::ConnectSpotify => app.connect("spotify").await?,
        Commands::Disconnect => app.disconnect().await?,
        Commands::Menu { select } => app.menu(select).await?,
        Commands::Session => app.interactive().await?,
    }

    app.session.shutdown();
    Ok(())
}

/// Register every player the configuration allows
fn build_adapters(config: &AppConfig, runner: &Arc<dyn ScriptRunner>) -> Result<AdapterSet> {
    let mut adapters = AdapterSet::new()
        .with(Arc::new(DesktopAdapter::spotify(runner.clone())))
        .with(Arc::new(DesktopAdapter::itunes(runner.clone())));

    if config.has_spotify_token() {
        let web_config = SpotifyWebConfig::new(config.spotify.access_token.trim())
            .with_api_url(&config.spotify.api_url);
        adapters.register(Arc::new(SpotifyWebAdapter::new(web_config, runner.clone())?));
    } else {
        debug!("No Spotify access token, Spotify Web disabled");
    }

    Ok(adapters)
}

struct App {
    config: AppConfig,
    runner: Arc<dyn ScriptRunner>,
    session: Session,
    surface: PlaybackControlSurface,
    launcher: PlaylistLauncher,
}

impl App {
    async fn start(config: AppConfig) -> Result<Self> {
        let runner: Arc<dyn ScriptRunner> = Arc::new(OsascriptRunner::new());
        let adapters = build_adapters(&config, &runner)?;
        info!(backends = ?adapters.backends(), "Players registered");

        let backend = config.player.default_backend;
        let store = if backend.is_assigned() {
            TrackStateStore::with_active_backend(backend)
        } else {
            TrackStateStore::new()
        };
        let session = Session::with_store(store, adapters, config.control.clone());
        let surface = PlaybackControlSurface::new(session.clone());
        let launcher = PlaylistLauncher::new(session.clone());

        // Pick up whatever is already playing
        surface.reconciler().reconcile().await;

        Ok(Self {
            config,
            runner,
            session,
            surface,
            launcher,
        })
    }

    /// Wait for scheduled reconciles and launches to run
    async fn settle(&self) {
        let scheduler = self.session.scheduler();
        while scheduler.is_pending(TaskKey::Reconcile) || scheduler.is_pending(TaskKey::PlayerLaunch)
        {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    fn client(&self) -> Result<SoftwareClient> {
        let mut server = ServerConfig::new(&self.config.service.api_endpoint);
        if self.config.has_jwt() {
            server.jwt = Some(self.config.service.jwt.trim().to_string());
        }
        Ok(SoftwareClient::new(server)?)
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Play on the current track's player, or the selected one when idle
    async fn play(&self) {
        if self.surface.play(None).await.is_none() {
            let active = self.session.store().active_backend().await;
            if self.surface.play(active).await.is_none() {
                println!("No player selected. Pass --player or set player.default_backend.");
            }
        }
    }

    async fn set_loved(&self, liked: bool) {
        match self.surface.set_loved(liked).await {
            Some(track) => println!("{} {}", if liked { "Loved" } else { "Unloved" }, describe(&track)),
            None => println!("Nothing is playing."),
        }
    }

    async fn launch(&self, target: Option<PlayerBackend>) {
        let mut events = self.session.subscribe();
        match self.surface.launch_player(target).await {
            Some(backend) => println!("Launching {}", backend),
            None => println!("Nothing is playing; name a player to launch."),
        }
        while let Ok(event) = events.try_recv() {
            if let ControlEvent::PlayerLaunching {
                message: Some(message),
                ..
            } = event
            {
                println!("{}", message);
            }
        }
    }

    async fn play_playlist(
        &self,
        playlist: Option<String>,
        track: Option<String>,
        retries: Option<u32>,
    ) -> Result<()> {
        let user_uri = self.config.spotify.user_uri.trim();
        if user_uri.is_empty() {
            bail!("Spotify user is not configured (set MUSICTIME_SPOTIFY__USER_URI)");
        }
        let user = SpotifyUser {
            id: user_uri.rsplit(':').next().unwrap_or(user_uri).to_string(),
            uri: user_uri.to_string(),
        };

        let Some(web) = self.session.adapter(PlayerBackend::SpotifyWeb) else {
            bail!("Spotify Web is not configured (set MUSICTIME_SPOTIFY__ACCESS_TOKEN)");
        };
        let devices = web.devices().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list Spotify devices");
            Vec::new()
        });

        let item = track.map(|id| PlaylistItem {
            parent_id: playlist.clone(),
            ..PlaylistItem::new(spotify_track_uri(&id), "", 0)
        });
        let retries = retries.unwrap_or(self.config.control.max_retry_count);

        let outcome = self
            .launcher
            .play_from_playlist(&user, playlist.as_deref(), item.as_ref(), devices, retries)
            .await;
        info!(?outcome, "Playlist launch finished");
        Ok(())
    }

    async fn print_status(&self) {
        let store = self.session.store();
        match store.running_track().await {
            Some(track) => println!("{}", describe(&track)),
            None => println!("Nothing is playing."),
        }
        if let Some(backend) = store.active_backend().await {
            println!("Player: {}", backend);
        }
    }

    async fn print_devices(&self) -> Result<()> {
        let Some(web) = self.session.adapter(PlayerBackend::SpotifyWeb) else {
            bail!("Spotify Web is not configured (set MUSICTIME_SPOTIFY__ACCESS_TOKEN)");
        };
        let devices = web.devices().await?;
        if devices.is_empty() {
            println!("No Spotify devices found.");
        }
        for device in devices {
            let marker = if device.is_active { "*" } else { " " };
            println!("{} {} ({}) [{}]", marker, device.name, device.device_type, device.id);
        }
        Ok(())
    }

    // ========================================================================
    // Service
    // ========================================================================

    async fn dashboard(&self) -> Result<()> {
        let cache = DashboardCache::new(self.client()?, &self.config.dashboard.file);
        cache.refresh().await?;
        let content = tokio::fs::read_to_string(cache.path())
            .await
            .with_context(|| format!("Failed to read {}", cache.path().display()))?;
        println!("{}", content);
        Ok(())
    }

    async fn connect(&self, integration: &str) -> Result<()> {
        let url = self.client()?.connect_url(integration).await?;
        self.runner.open_url(url.as_str()).await?;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let client = self.client()?;
        if !client.is_server_available().await {
            println!("{}", SERVICE_UNAVAILABLE);
            return Ok(());
        }
        client.disconnect_spotify().await?;
        println!("Spotify disconnected.");
        Ok(())
    }

    // ========================================================================
    // Menu
    // ========================================================================

    async fn menu(&self, select: Option<usize>) -> Result<()> {
        let server_online = match self.client() {
            Ok(client) => client.is_server_available().await,
            Err(_) => false,
        };
        let ctx = MenuContext::from_config(
            &self.config,
            server_online,
            self.session.store().active_backend().await,
        );
        let items = build_menu(&ctx);

        let Some(index) = select else {
            for (n, item) in items.iter().enumerate() {
                println!("{:>2}. {}\n    {}", n + 1, item.label, item.detail);
            }
            return Ok(());
        };

        let Some(item) = index.checked_sub(1).and_then(|i| items.get(i)) else {
            bail!("No menu entry {} (1-{})", index, items.len());
        };
        debug!(label = %item.label, "Menu entry selected");

        match &item.action {
            MenuAction::ConnectSpotify => self.connect("spotify").await?,
            MenuAction::ConnectSlack => self.connect("slack").await?,
            MenuAction::GeneratePlaylist | MenuAction::RefreshPlaylist => {
                bail!("Personal playlists are managed in the Music Time web app")
            }
            MenuAction::Login { available: true } => {
                let url = format!("{}/login", self.config.service.launch_url.trim_end_matches('/'));
                self.runner.open_url(&url).await?;
            }
            MenuAction::Login { available: false } => println!("{}", SERVICE_UNAVAILABLE),
            MenuAction::Dashboard => self.dashboard().await?,
            MenuAction::OpenUrl(url) => self.runner.open_url(url).await?,
            MenuAction::LaunchPlayer(backend) => {
                self.launch(Some(*backend)).await;
                self.settle().await;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Interactive session
    // ========================================================================

    async fn interactive(&self) -> Result<()> {
        let mut events = self.session.subscribe();
        let logger = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => log_event(&event),
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event log lagging"),
                    Err(RecvError::Closed) => break,
                }
            }
        });

        println!("Commands: play, pause, next, prev, like, unlike, launch [player], status, devices, quit");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let mut words = line.split_whitespace();
            let Some(command) = words.next() else {
                continue;
            };

            match command {
                "play" => self.play().await,
                "pause" => {
                    self.surface.pause(None).await;
                }
                "next" => {
                    self.surface.next(None).await;
                }
                "prev" | "previous" => {
                    self.surface.previous(None).await;
                }
                "like" => self.set_loved(true).await,
                "unlike" => self.set_loved(false).await,
                "launch" => match words.next().map(str::parse::<PlayerBackend>).transpose() {
                    Ok(target) => self.launch(target).await,
                    Err(e) => println!("{}", e),
                },
                "status" => {
                    self.surface.reconciler().reconcile().await;
                    self.print_status().await;
                }
                "devices" => {
                    if let Err(e) = self.print_devices().await {
                        println!("{}", e);
                    }
                }
                "quit" | "exit" => break,
                other => println!("Unknown command: {}", other),
            }
        }

        logger.abort();
        Ok(())
    }
}

fn describe(track: &Track) -> String {
    let mut line = track.name.clone();
    if !track.artist.is_empty() {
        line.push_str(&format!(" - {}", track.artist));
    }
    if track.loved {
        line.push_str(" (loved)");
    }
    line.push_str(&format!(" [{}]", track.player));
    if track.player.is_spotify() && track.has_id() {
        line.push_str(&format!("\n{}", build_spotify_link(&track.id, false)));
    }
    line
}

fn log_event(event: &ControlEvent) {
    match event {
        ControlEvent::TrackChanged { current, .. } => {
            info!(track_id = %current.id, "Now playing: {}", describe(current));
        }
        ControlEvent::TrackCleared { .. } => info!("Nothing playing"),
        ControlEvent::PlayerLaunching {
            backend,
            message: Some(message),
        } => info!(%backend, "{}", message),
        ControlEvent::LaunchFinished { outcome } => info!(?outcome, "Playlist launch finished"),
        other => debug!(event = ?other, "Control event"),
    }
}
