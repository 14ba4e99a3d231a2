//! Shared test helpers: a recording fake player and session builders

#![allow(dead_code)]

use async_trait::async_trait;
use musictime_control::{ControlConfig, Session, TrackStateStore};
use musictime_core::{
    AdapterSet, MusicTimeError, PlayOptions, PlayerBackend, PlayerBackendAdapter, PlayerDevice,
    Result, Track,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One call received by a fake player
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play(PlayOptions),
    Pause,
    Next,
    Previous,
    CurrentTrack,
    Devices,
    SetLoved(bool),
    Launch(Option<String>),
    Quit,
}

/// Player that records every call and reports a scripted now-playing track
pub struct FakePlayer {
    backend: PlayerBackend,
    supports_loved: bool,
    failing: AtomicBool,
    calls: Mutex<Vec<Call>>,
    current: Mutex<Option<Track>>,
    devices: Mutex<Vec<PlayerDevice>>,
    /// Track that becomes current once this many play calls arrived
    confirm_after: Mutex<Option<(usize, Track)>>,
}

impl FakePlayer {
    pub fn new(backend: PlayerBackend) -> Arc<Self> {
        Arc::new(Self::build(backend, backend == PlayerBackend::ItunesDesktop))
    }

    fn build(backend: PlayerBackend, supports_loved: bool) -> Self {
        Self {
            backend,
            supports_loved,
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            devices: Mutex::new(Vec::new()),
            confirm_after: Mutex::new(None),
        }
    }

    pub fn set_current(&self, track: Option<Track>) {
        *self.current.lock().unwrap() = track;
    }

    pub fn set_devices(&self, devices: Vec<PlayerDevice>) {
        *self.devices.lock().unwrap() = devices;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn confirm_after_plays(&self, plays: usize, track: Track) {
        *self.confirm_after.lock().unwrap() = Some((plays, track));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than now-playing queries and device listings
    pub fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::CurrentTrack | Call::Devices))
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    pub fn plays(&self) -> Vec<PlayOptions> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Play(options) => Some(options),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MusicTimeError::unavailable(self.backend, "player offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl PlayerBackendAdapter for FakePlayer {
    fn backend(&self) -> PlayerBackend {
        self.backend
    }

    async fn play(&self, options: &PlayOptions) -> Result<()> {
        self.record(Call::Play(options.clone()))?;
        let plays = self.count(|c| matches!(c, Call::Play(_)));
        let mut confirm = self.confirm_after.lock().unwrap();
        if confirm.as_ref().is_some_and(|(after, _)| plays >= *after) {
            if let Some((_, track)) = confirm.take() {
                *self.current.lock().unwrap() = Some(track);
            }
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause)
    }

    async fn next(&self) -> Result<()> {
        self.record(Call::Next)
    }

    async fn previous(&self) -> Result<()> {
        self.record(Call::Previous)
    }

    async fn current_track(&self) -> Result<Option<Track>> {
        self.record(Call::CurrentTrack)?;
        Ok(self.current.lock().unwrap().clone())
    }

    async fn devices(&self) -> Result<Vec<PlayerDevice>> {
        self.record(Call::Devices)?;
        Ok(self.devices.lock().unwrap().clone())
    }

    fn supports_loved(&self) -> bool {
        self.supports_loved
    }

    async fn set_loved(&self, liked: bool) -> Result<()> {
        self.record(Call::SetLoved(liked))?;
        if let Some(track) = self.current.lock().unwrap().as_mut() {
            track.loved = liked;
        }
        Ok(())
    }

    async fn launch(&self, track_id: Option<&str>) -> Result<()> {
        self.record(Call::Launch(track_id.map(str::to_string)))
    }

    async fn quit(&self) -> Result<()> {
        self.record(Call::Quit)
    }
}

/// The three players, registered in one adapter set
pub struct Players {
    pub web: Arc<FakePlayer>,
    pub desktop: Arc<FakePlayer>,
    pub itunes: Arc<FakePlayer>,
}

impl Players {
    pub fn new() -> Self {
        Self {
            web: FakePlayer::new(PlayerBackend::SpotifyWeb),
            desktop: FakePlayer::new(PlayerBackend::SpotifyDesktop),
            itunes: FakePlayer::new(PlayerBackend::ItunesDesktop),
        }
    }

    pub fn adapters(&self) -> AdapterSet {
        AdapterSet::new()
            .with(self.web.clone())
            .with(self.desktop.clone())
            .with(self.itunes.clone())
    }

    pub fn session(&self) -> Session {
        Session::new(self.adapters(), ControlConfig::default())
    }

    pub fn session_with_active(&self, backend: PlayerBackend) -> Session {
        Session::with_store(
            TrackStateStore::with_active_backend(backend),
            self.adapters(),
            ControlConfig::default(),
        )
    }

    pub fn total_calls(&self) -> usize {
        self.web.calls().len() + self.desktop.calls().len() + self.itunes.calls().len()
    }
}

pub fn track(id: &str, player: PlayerBackend) -> Track {
    Track::new(id, format!("Track {}", id), player)
}

pub fn device(id: &str, name: &str) -> PlayerDevice {
    PlayerDevice {
        id: id.to_string(),
        name: name.to_string(),
        is_active: false,
        device_type: "Computer".to_string(),
    }
}

/// Put `track` into the store as if a reconcile had just reported it
pub async fn seed(session: &Session, track: Track) {
    let store = session.store();
    let cycle = store.begin_cycle().await;
    store.apply_reconciled(Some(track), cycle, false).await;
}
