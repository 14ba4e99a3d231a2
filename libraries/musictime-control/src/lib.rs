//! Music Time - Playback Control
//!
//! Drives external music players and keeps the session's notion of "what is
//! playing" in step with what the players report.
//!
//! This crate provides:
//! - Transport commands routed to the player that owns the running track
//! - Delayed, cancellable resync after every command
//! - Optimistic loved/liked state that survives stale player reads
//! - Playlist launching with confirmation and bounded retry
//! - An event stream for UI and telemetry consumers
//!
//! # Architecture
//!
//! Everything hangs off a [`Session`]: the [`TrackStateStore`], the
//! registered adapters, the [`Scheduler`] and the event channel. Components
//! are cheap clones around it and never touch global state.
//!
//! Players are reached only through `PlayerBackendAdapter` trait objects, so
//! tests and embedders can register their own.
//!
//! # Example
//!
//! ```rust,no_run
//! use musictime_control::{ControlConfig, PlaybackControlSurface, Session};
//! use musictime_core::AdapterSet;
//!
//! # async fn run(adapters: AdapterSet) {
//! let session = Session::new(adapters, ControlConfig::default());
//! let surface = PlaybackControlSurface::new(session.clone());
//!
//! // Sync with whatever the player is doing, then skip ahead
//! surface.reconciler().reconcile().await;
//! surface.next(None).await;
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod events;
pub mod launcher;
pub mod reconciler;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod surface;

pub use config::ControlConfig;
pub use events::{ControlEvent, TransportCommand};
pub use launcher::{build_play_request, LaunchOutcome, PlaylistLauncher};
pub use reconciler::StateReconciler;
pub use scheduler::{Scheduler, TaskKey};
pub use session::Session;
pub use store::{ReconcileCycle, ReconcileOutcome, TrackStateStore};
pub use surface::PlaybackControlSurface;
