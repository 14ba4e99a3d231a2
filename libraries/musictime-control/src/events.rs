//! Control Events
//!
//! Event stream for UI and telemetry consumers. Events are emitted at key
//! points:
//! - Control commands dispatched to a player
//! - Track changes detected by reconciliation
//! - Loved flag changes
//! - Player launches and playlist launch results

use crate::launcher::LaunchOutcome;
use musictime_core::{PlayerBackend, ServerTrack, Track};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport command sent to a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportCommand {
    Play,
    Pause,
    Next,
    Previous,
}

impl fmt::Display for TransportCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportCommand::Play => "play",
            TransportCommand::Pause => "pause",
            TransportCommand::Next => "next",
            TransportCommand::Previous => "previous",
        };
        f.write_str(name)
    }
}

/// Events emitted by the control layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlEvent {
    /// A transport command was sent to a player
    CommandDispatched {
        backend: PlayerBackend,
        command: TransportCommand,
    },

    /// A different track is now playing
    ///
    /// `previous` is the server mirror of the track that ended, ready for
    /// upload by a telemetry consumer.
    TrackChanged {
        previous: Option<ServerTrack>,
        current: Track,
    },

    /// The running track's fields changed (state, loved, ...)
    TrackUpdated { track: Track },

    /// Nothing is playing any more
    TrackCleared { previous: Option<ServerTrack> },

    /// The listener loved or un-loved the running track
    LovedChanged { track_id: String, loved: bool },

    /// Routing switched to another player
    ActiveBackendChanged { backend: PlayerBackend },

    /// A player application is being opened
    PlayerLaunching {
        backend: PlayerBackend,
        /// Informational message for the listener
        message: Option<String>,
    },

    /// A playlist launch reached a terminal state
    LaunchFinished { outcome: LaunchOutcome },
}
