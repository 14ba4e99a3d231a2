//! Music Time Players
//!
//! Concrete `PlayerBackendAdapter` implementations:
//!
//! - **Spotify Web**: Spotify Connect through the Web API (`reqwest`)
//! - **Spotify Desktop** / **iTunes Desktop**: the macOS applications,
//!   scripted with AppleScript through a `ScriptRunner`
//!
//! # Example
//!
//! ```ignore
//! use musictime_core::AdapterSet;
//! use musictime_players::{DesktopAdapter, OsascriptRunner, SpotifyWebAdapter, SpotifyWebConfig};
//! use std::sync::Arc;
//!
//! let runner = Arc::new(OsascriptRunner::new());
//! let adapters = AdapterSet::new()
//!     .with(Arc::new(SpotifyWebAdapter::new(SpotifyWebConfig::new(token), runner.clone())?))
//!     .with(Arc::new(DesktopAdapter::spotify(runner.clone())))
//!     .with(Arc::new(DesktopAdapter::itunes(runner)));
//! ```

mod desktop;
mod script;
mod spotify_web;

pub use desktop::DesktopAdapter;
pub use script::{quote, OsascriptRunner, ScriptRunner};
pub use spotify_web::{SpotifyWebAdapter, SpotifyWebConfig, SPOTIFY_API_URL, SPOTIFY_WEB_PLAYER_URL};
