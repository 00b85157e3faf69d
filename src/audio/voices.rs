//! Per-track fade scheduling, independent of the output backend.
//!
//! Every voice remembers whether it is *wanted* playing, separately from
//! whether its output is currently audible. A fade-out only pauses the
//! output if the voice is still unwanted when the fade completes.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::debug;

use super::fade::{Fade, FadeDirection};

/// The operations a voice needs from a live audio handle.
pub trait VoiceOutput {
    fn set_volume(&self, gain: f32);
    fn volume(&self) -> f32;
    fn play(&self);
    fn pause(&self);
    fn is_paused(&self) -> bool;
    fn stop(&self);
}

struct Voice<O> {
    output: O,
    wants_playing: bool,
    fade: Option<Fade>,
}

pub struct Voices<O: VoiceOutput> {
    voices: HashMap<String, Voice<O>>,
    fade_len: Duration,
}

impl<O: VoiceOutput> Voices<O> {
    pub fn new(fade_len: Duration) -> Self {
        Self {
            voices: HashMap::new(),
            fade_len,
        }
    }

    /// Register a paused output for `id`, replacing any previous one.
    pub fn insert(&mut self, id: &str, output: O) {
        output.pause();
        let voice = Voice {
            output,
            wants_playing: false,
            fade: None,
        };
        if let Some(old) = self.voices.insert(id.to_string(), voice) {
            old.output.stop();
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        match self.voices.remove(id) {
            Some(voice) => {
                voice.output.stop();
                true
            }
            None => false,
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.voices.keys().cloned().collect()
    }

    pub fn play(&mut self, id: &str, target: f32, now: Instant) {
        let fade_len = self.fade_len;
        let Some(voice) = self.voices.get_mut(id) else {
            debug!(id, "play for unknown voice");
            return;
        };
        voice.wants_playing = true;

        if voice.output.is_paused() {
            voice.output.set_volume(0.0);
            voice.output.play();
            voice.fade = Some(Fade::new(0.0, target, now, fade_len, FadeDirection::In));
        } else {
            match voice.fade {
                Some(ref mut fade) if fade.direction() == FadeDirection::In => fade.retarget(target),
                Some(fade) => {
                    // Still audible from a fade-out; ramp back up from where it is.
                    let from = fade.gain_at(now);
                    voice.fade = Some(Fade::new(from, target, now, fade_len, FadeDirection::In));
                }
                None => voice.output.set_volume(target),
            }
        }
        step(id, voice, now);
    }

    pub fn pause(&mut self, id: &str, current_gain: f32, now: Instant) {
        let fade_len = self.fade_len;
        let Some(voice) = self.voices.get_mut(id) else {
            debug!(id, "pause for unknown voice");
            return;
        };
        begin_fade_out(voice, current_gain, fade_len, now);
        step(id, voice, now);
    }

    /// Apply `gain` to the voice. An in-flight fade-in is retargeted instead
    /// of being cut short; a fade-out is left alone.
    pub fn set_gain(&mut self, id: &str, gain: f32) {
        let Some(voice) = self.voices.get_mut(id) else {
            return;
        };
        match voice.fade {
            Some(ref mut fade) if fade.direction() == FadeDirection::In => fade.retarget(gain),
            Some(_) => {}
            None => voice.output.set_volume(gain),
        }
    }

    /// Fade every audible voice to silence over `length`.
    pub fn fade_out_all(&mut self, length: Duration, now: Instant) {
        for (id, voice) in self.voices.iter_mut() {
            if voice.output.is_paused() {
                voice.wants_playing = false;
                continue;
            }
            let current = voice.output.volume();
            begin_fade_out(voice, current, length, now);
            step(id, voice, now);
        }
    }

    /// Move every running fade to `now`.
    pub fn advance(&mut self, now: Instant) {
        for (id, voice) in self.voices.iter_mut() {
            step(id, voice, now);
        }
    }

    pub fn is_fading(&self) -> bool {
        self.voices.values().any(|v| v.fade.is_some())
    }

    pub fn audible(&self) -> HashSet<String> {
        self.voices
            .iter()
            .filter(|(_, v)| !v.output.is_paused())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

fn begin_fade_out<O: VoiceOutput>(voice: &mut Voice<O>, current_gain: f32, length: Duration, now: Instant) {
    voice.wants_playing = false;
    if voice.output.is_paused() {
        voice.fade = None;
        return;
    }
    let from = match voice.fade {
        Some(fade) => fade.gain_at(now),
        None => current_gain,
    };
    voice.fade = Some(Fade::new(from, 0.0, now, length, FadeDirection::Out));
}

fn step<O: VoiceOutput>(id: &str, voice: &mut Voice<O>, now: Instant) {
    let Some(fade) = voice.fade else {
        return;
    };
    voice.output.set_volume(fade.gain_at(now));
    if !fade.is_finished(now) {
        return;
    }
    voice.fade = None;
    if fade.direction() == FadeDirection::Out {
        if voice.wants_playing {
            debug!(id, "fade-out finished after play was requested; staying audible");
            voice.output.set_volume(0.0);
        } else {
            voice.output.pause();
        }
    }
}
