//! Audio-related small types and handles.
//!
//! This module defines the commands understood by the audio thread and the
//! shared handle it uses to publish which tracks are currently audible.

use std::collections::HashSet;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crate::error::LoadError;

use super::engine::LoadRequest;
use super::sink::DecodedSource;

pub(super) enum AudioCmd {
    /// Start decoding a track on a loader thread.
    Load {
        request: LoadRequest,
        reply: Sender<Result<(), LoadError>>,
    },
    /// A loader thread finished; create the track's sink from `decoded`.
    Attach {
        id: String,
        gain: f32,
        decoded: Result<DecodedSource, LoadError>,
        reply: Sender<Result<(), LoadError>>,
    },
    /// Fade a track in to `gain`, starting playback if it is paused.
    Play { id: String, gain: f32 },
    /// Fade a track out from `gain` and pause it.
    Pause { id: String, gain: f32 },
    /// Change a track's gain without fading.
    SetGain { id: String, gain: f32 },
    /// Release a track's sink.
    Unload(String),
    /// Fade every audible track out over `fade_out_ms`, then signal `done`.
    FadeOutAll { fade_out_ms: u64, done: Sender<()> },
    /// Stop the audio thread.
    Quit,
}

/// Ids of the tracks currently producing sound, as seen by the audio thread.
pub type AudibleHandle = Arc<Mutex<HashSet<String>>>;
