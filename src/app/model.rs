//! Application model types: `App` and `TimerSheet`.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::ValidationError;
use crate::mixer::{Lifecycle, Mixer, NowPlaying, TrackState};
use crate::store::Preferences;
use crate::timer::{TickOutcome, Timer, parse_minutes};

/// State of the timer settings popup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSheet {
    pub open: bool,
    /// Index into the presets; one past the last preset is the custom entry.
    pub selected: usize,
    /// Text typed into the custom entry.
    pub input: String,
    /// Why the last custom entry was rejected.
    pub error: Option<ValidationError>,
}

/// The main application model.
pub struct App {
    mixer: Mixer,
    timer: Timer,
    prefs: Preferences,
    pub selected: usize,
    pub sheet: TimerSheet,
    presets: Vec<u32>,
    default_gain: f32,
    gain_step: f32,
    /// Tracks asked for by a shortcut that are still loading.
    pending_presets: Vec<String>,
    /// Tracks silenced by the most recent stop-all, for media-key resume.
    last_stopped: Vec<String>,
}

impl App {
    pub fn new(mixer: Mixer, prefs: Preferences, settings: &Settings) -> Self {
        Self {
            mixer,
            timer: Timer::new(),
            prefs,
            selected: 0,
            sheet: TimerSheet::default(),
            presets: settings.timer.presets.clone(),
            default_gain: settings.audio.default_gain,
            gain_step: settings.controls.gain_step,
            pending_presets: Vec::new(),
            last_stopped: Vec::new(),
        }
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut Mixer {
        &mut self.mixer
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn presets(&self) -> &[u32] {
        &self.presets
    }

    pub fn selected_track(&self) -> Option<&TrackState> {
        self.mixer.tracks().get(self.selected)
    }

    /// Move the cursor down, wrapping to the top.
    pub fn select_next(&mut self) {
        let len = self.mixer.tracks().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn select_prev(&mut self) {
        let len = self.mixer.tracks().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Load the selected track if it is not ready yet, otherwise toggle it.
    pub fn activate_selected(&mut self) {
        let Some(track) = self.selected_track() else {
            return;
        };
        let (id, lifecycle) = (track.id.clone(), track.lifecycle);
        match lifecycle {
            Lifecycle::Unloaded | Lifecycle::LoadError => {
                self.mixer.load_track(&id);
            }
            Lifecycle::Loaded => {
                self.mixer.toggle_track(&id);
            }
            Lifecycle::Loading => {}
        }
    }

    /// Nudge the selected track's gain by `steps` gain steps.
    pub fn adjust_gain(&mut self, steps: f32) {
        let Some(track) = self.selected_track() else {
            return;
        };
        let id = track.id.clone();
        let gain = track.gain + steps * self.gain_step;
        self.mixer.set_gain(&id, gain);
    }

    /// Silence the selected track, or bring it back to the default gain.
    pub fn toggle_mute(&mut self) {
        let Some(track) = self.selected_track() else {
            return;
        };
        let id = track.id.clone();
        let gain = if track.gain > 0.0 { 0.0 } else { self.default_gain };
        self.mixer.set_gain(&id, gain);
    }

    pub fn stop_all(&mut self) {
        let stopped = self.mixer.stop_all();
        if !stopped.is_empty() {
            self.last_stopped = stopped;
        }
    }

    /// Restart whatever the last stop-all silenced.
    pub fn resume_last(&mut self) {
        let ids = std::mem::take(&mut self.last_stopped);
        self.mixer.resume(&ids);
    }

    pub fn play_pause(&mut self) {
        if self.mixer.playing_count() > 0 {
            self.stop_all();
        } else {
            self.resume_last();
        }
    }

    /// Play the track `id` as a shortcut would: load it first if needed and
    /// start it once ready, unless it is already playing.
    pub fn apply_preset(&mut self, id: &str) {
        let Some(track) = self.mixer.track(id) else {
            warn!(id, "preset names an unknown track");
            return;
        };
        let (lifecycle, playing) = (track.lifecycle, track.is_playing);
        match lifecycle {
            Lifecycle::Loaded => {
                if !playing {
                    self.mixer.toggle_track(id);
                }
            }
            Lifecycle::Unloaded | Lifecycle::LoadError => {
                self.mixer.load_track(id);
                self.queue_preset(id);
            }
            Lifecycle::Loading => self.queue_preset(id),
        }
    }

    fn queue_preset(&mut self, id: &str) {
        if !self.pending_presets.iter().any(|p| p == id) {
            self.pending_presets.push(id.to_string());
        }
    }

    /// Collect finished loads and start any preset whose track became ready.
    pub fn settle(&mut self) {
        if !self.mixer.has_pending_loads() && self.pending_presets.is_empty() {
            return;
        }
        self.mixer.settle();

        let pending = std::mem::take(&mut self.pending_presets);
        for id in pending {
            let Some(track) = self.mixer.track(&id) else {
                continue;
            };
            let (lifecycle, playing) = (track.lifecycle, track.is_playing);
            match lifecycle {
                Lifecycle::Loaded => {
                    if !playing {
                        self.mixer.toggle_track(&id);
                    }
                }
                Lifecycle::LoadError => warn!(%id, "preset track failed to load"),
                Lifecycle::Loading | Lifecycle::Unloaded => self.pending_presets.push(id),
            }
        }
    }

    /// Advance the timer. On expiry every track is stopped, exactly once.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.timer.tick(now);
        if outcome == TickOutcome::Expired {
            info!("timer expired");
            self.stop_all();
        }
        outcome
    }

    /// Start a countdown and close the timer sheet.
    pub fn start_timer(&mut self, minutes: u32, now: Instant) -> Result<(), ValidationError> {
        self.timer.start(minutes, now)?;
        self.sheet.open = false;
        self.sheet.error = None;
        self.prefs.set_last_timer_duration(minutes);
        info!(minutes, "timer started");
        Ok(())
    }

    /// Cancel the countdown. Sounds keep playing.
    pub fn stop_timer(&mut self) {
        if self.timer.is_visible() {
            info!("timer stopped");
        }
        self.timer.stop();
    }

    pub fn stop_timer_and_silence(&mut self) {
        self.stop_timer();
        self.stop_all();
        self.sheet.open = false;
    }

    pub fn open_timer_sheet(&mut self) {
        let last = self.prefs.last_timer_duration();
        self.sheet = TimerSheet {
            open: true,
            selected: last
                .and_then(|m| self.presets.iter().position(|&p| p == m))
                .unwrap_or(0),
            input: String::new(),
            error: None,
        };
    }

    pub fn close_timer_sheet(&mut self) {
        self.sheet.open = false;
    }

    /// Whether the custom-duration entry is selected.
    pub fn sheet_on_custom(&self) -> bool {
        self.sheet.selected >= self.presets.len()
    }

    pub fn sheet_next(&mut self) {
        self.sheet.selected = (self.sheet.selected + 1) % (self.presets.len() + 1);
    }

    pub fn sheet_prev(&mut self) {
        let len = self.presets.len() + 1;
        self.sheet.selected = (self.sheet.selected + len - 1) % len;
    }

    pub fn sheet_push_char(&mut self, c: char) {
        if self.sheet_on_custom() && self.sheet.input.len() < 6 {
            self.sheet.input.push(c);
            self.sheet.error = None;
        }
    }

    pub fn sheet_backspace(&mut self) {
        if self.sheet_on_custom() {
            self.sheet.input.pop();
            self.sheet.error = None;
        }
    }

    /// Start the selected preset or the typed duration. A rejected custom
    /// entry keeps the sheet open with the reason shown.
    pub fn confirm_timer_sheet(&mut self, now: Instant) {
        let minutes = match self.presets.get(self.sheet.selected) {
            Some(&m) => Ok(m),
            None => parse_minutes(&self.sheet.input),
        };
        if let Err(e) = minutes.and_then(|m| self.start_timer(m, now)) {
            self.sheet.error = Some(e);
        }
    }

    /// `"N sound(s) playing"`, or a prompt when idle.
    pub fn status_line(&self) -> String {
        match self.mixer.playing_count() {
            0 => "Select a sound to begin".to_string(),
            1 => "1 sound playing".to_string(),
            n => format!("{n} sounds playing"),
        }
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.mixer.now_playing()
    }

    pub fn shutdown(&mut self, fade_out: Duration) {
        self.mixer.shutdown(fade_out);
    }
}
