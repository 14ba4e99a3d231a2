//! Music Time Core
//!
//! Player-agnostic types, traits, and error handling for Music Time.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `ServerTrack`, `PlaylistItem`, `PlayerDevice`
//! - **Core Traits**: `PlayerBackendAdapter`, implemented once per player
//! - **Error Handling**: Unified `MusicTimeError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use musictime_core::{PlayerBackend, Track, ServerTrack};
//!
//! let mut track = Track::new("spotify:track:1", "Song", PlayerBackend::SpotifyWeb);
//! track.loved = true;
//!
//! let mirror = ServerTrack::from(&track);
//! assert!(mirror.loved);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod links;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{MusicTimeError, Result};
pub use traits::{AdapterSet, PlayerBackendAdapter};
pub use types::{
    PlayOptions, PlayerBackend, PlayerDevice, PlayerState, PlaylistItem, ServerTrack, SpotifyUser,
    Track, LIKED_SONGS_PLAYLIST_ID,
};
