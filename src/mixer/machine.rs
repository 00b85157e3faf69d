//! The mixer state machine.
//!
//! Owns every track's lifecycle and play/gain state, forwards play-state
//! changes to the [`PlaybackEngine`] and persists the results. All methods
//! run to completion on the caller's thread; loads are the only operations
//! that finish later, and they are collected by [`Mixer::settle`].

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{LoadRequest, PendingLoad, PlaybackEngine};
use crate::catalog::Catalog;
use crate::store::{Preferences, SoundPreference};

use super::state::{
    DEFAULT_TITLE, Lifecycle, NowPlaying, PlaybackStatus, TrackState, clamp_gain,
};

pub struct Mixer {
    catalog: Catalog,
    tracks: Vec<TrackState>,
    engine: Box<dyn PlaybackEngine>,
    prefs: Preferences,
    pending: HashMap<String, PendingLoad>,
    ever_played: bool,
}

impl Mixer {
    pub fn new(
        catalog: Catalog,
        engine: Box<dyn PlaybackEngine>,
        prefs: Preferences,
        default_gain: f32,
    ) -> Self {
        let gain = clamp_gain(default_gain).unwrap_or(0.0);
        let tracks = catalog
            .tracks()
            .iter()
            .map(|t| TrackState {
                id: t.id.clone(),
                name: t.name.clone(),
                lifecycle: Lifecycle::Unloaded,
                is_playing: false,
                gain,
                last_error: None,
            })
            .collect();

        Self {
            catalog,
            tracks,
            engine,
            prefs,
            pending: HashMap::new(),
            ever_played: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tracks(&self) -> &[TrackState] {
        &self.tracks
    }

    pub fn track(&self, id: &str) -> Option<&TrackState> {
        self.tracks.iter().find(|t| t.id == id)
    }

    fn track_mut(&mut self, id: &str) -> Option<&mut TrackState> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Flip one loaded track between playing and paused. Returns whether
    /// anything changed.
    pub fn toggle_track(&mut self, id: &str) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle for unknown track");
            return false;
        };
        if !track.is_loaded() {
            debug!(id, lifecycle = ?track.lifecycle, "toggle ignored");
            return false;
        }

        track.is_playing = !track.is_playing;
        if track.is_playing {
            self.engine.play(&track.id, track.gain);
            self.ever_played = true;
        } else {
            self.engine.pause(&track.id, track.gain);
        }
        info!(id, playing = track.is_playing, "track toggled");

        self.save_preferences();
        true
    }

    /// Store a new gain, clamped to `[0, 1]`. A playing track hears it at
    /// once; a paused one fades in to it next time.
    pub fn set_gain(&mut self, id: &str, value: f32) {
        let Some(gain) = clamp_gain(value) else {
            warn!(id, "ignoring NaN gain");
            return;
        };
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        track.gain = gain;
        if track.is_playing {
            self.engine.set_gain(&track.id, gain);
        }
        self.save_preferences();
    }

    /// Begin loading a track that is unloaded or failed. Returns whether a
    /// load was started.
    pub fn load_track(&mut self, id: &str) -> bool {
        let Some(source) = self.catalog.get(id).map(|t| self.catalog.resolve_source(t)) else {
            debug!(id, "load for unknown track");
            return false;
        };
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if !track.can_load() {
            return false;
        }

        track.lifecycle = Lifecycle::Loading;
        track.last_error = None;
        let request = LoadRequest {
            id: track.id.clone(),
            path: source,
            gain: track.gain,
        };
        debug!(id, path = %request.path.display(), "loading track");
        let pending = self.engine.load(request);
        self.pending.insert(id.to_string(), pending);
        true
    }

    /// Collect finished loads. Returns the ids whose loads completed, in
    /// either direction, during this call.
    pub fn settle(&mut self) -> Vec<String> {
        let finished: Vec<_> = self
            .pending
            .iter()
            .filter_map(|(id, p)| p.try_result().map(|r| (id.clone(), r)))
            .collect();

        for (id, result) in &finished {
            self.pending.remove(id);
            let Some(track) = self.track_mut(id) else {
                continue;
            };
            match result {
                Ok(()) => {
                    track.lifecycle = Lifecycle::Loaded;
                    info!(%id, "track ready");
                    self.prefs.record_loaded(id);
                }
                Err(e) => {
                    track.lifecycle = Lifecycle::LoadError;
                    track.last_error = Some(e.clone());
                    warn!(%id, "track failed to load: {e}");
                }
            }
        }

        finished.into_iter().map(|(id, _)| id).collect()
    }

    pub fn has_pending_loads(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Pause every playing track. Returns the ids that were playing.
    pub fn stop_all(&mut self) -> Vec<String> {
        let mut stopped = Vec::new();
        for track in self.tracks.iter_mut().filter(|t| t.is_playing) {
            track.is_playing = false;
            self.engine.pause(&track.id, track.gain);
            stopped.push(track.id.clone());
        }
        if !stopped.is_empty() {
            info!(count = stopped.len(), "stopped all tracks");
            self.save_preferences();
        }
        stopped
    }

    /// Start every listed track that is loaded and paused.
    pub fn resume(&mut self, ids: &[String]) {
        for id in ids {
            if self.track(id).is_some_and(|t| t.is_loaded() && !t.is_playing) {
                self.toggle_track(id);
            }
        }
    }

    /// Reload every track that loaded in a previous session.
    pub fn restore_loaded(&mut self) {
        for id in self.prefs.loaded_sounds() {
            if self.catalog.get(&id).is_none() {
                debug!(%id, "skipping stored track missing from catalog");
                continue;
            }
            self.load_track(&id);
        }
    }

    /// Re-apply stored per-track gains. Play state is not restored.
    pub fn apply_saved_gains(&mut self) {
        for pref in self.prefs.sound_preferences() {
            let Some(gain) = clamp_gain(pref.volume) else {
                continue;
            };
            if let Some(track) = self.track_mut(&pref.id) {
                track.gain = gain;
            }
        }
    }

    pub fn playing_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_playing).count()
    }

    pub fn playing_names(&self) -> Vec<&str> {
        self.tracks
            .iter()
            .filter(|t| t.is_playing)
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Whether the engine still produces sound for `id`, e.g. mid fade-out.
    pub fn is_audible(&self, id: &str) -> bool {
        self.engine.is_playing(id)
    }

    pub fn now_playing(&self) -> NowPlaying {
        let names = self.playing_names();
        let title = if names.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            format!("Playing: {}", names.join(", "))
        };
        let status = match (self.ever_played, names.is_empty()) {
            (false, _) => PlaybackStatus::None,
            (true, false) => PlaybackStatus::Playing,
            (true, true) => PlaybackStatus::Paused,
        };
        NowPlaying { title, status }
    }

    pub fn preference_snapshot(&self) -> Vec<SoundPreference> {
        self.tracks
            .iter()
            .map(|t| SoundPreference {
                id: t.id.clone(),
                volume: t.gain,
                is_playing: t.is_playing,
            })
            .collect()
    }

    fn save_preferences(&self) {
        self.prefs.save_sound_preferences(&self.preference_snapshot());
    }

    /// Fade everything out and release every handle.
    pub fn shutdown(&mut self, fade_out: Duration) {
        self.engine.fade_out_all(fade_out);
        for track in self.tracks.iter_mut() {
            track.is_playing = false;
            if track.is_loaded() {
                self.engine.unload(&track.id);
            }
        }
        self.pending.clear();
    }
}
