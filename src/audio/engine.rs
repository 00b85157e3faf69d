//! The contract between the mixer and whatever produces sound.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use crate::error::LoadError;

/// Everything an engine needs to prepare one track.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub id: String,
    pub path: PathBuf,
    /// Gain the looping handle is configured with.
    pub gain: f32,
}

/// The in-flight result of [`PlaybackEngine::load`].
///
/// The mixer keeps one per loading track and polls it while settling, so a
/// slow decode only holds up its own track.
pub struct PendingLoad {
    rx: Receiver<Result<(), LoadError>>,
}

impl PendingLoad {
    /// Create a pending load and the sender that resolves it.
    pub fn channel() -> (Sender<Result<(), LoadError>>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// `None` while the load is still running. A producer that went away
    /// without answering resolves to [`LoadError::Abandoned`].
    pub fn try_result(&self) -> Option<Result<(), LoadError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Abandoned)),
        }
    }
}

/// Owns one audio handle per loaded track and turns logical play/pause/gain
/// changes into audible ones. Handles never leave the engine; tracks are
/// addressed by id.
pub trait PlaybackEngine {
    /// Begin buffering a track as a continuous loop at `request.gain`.
    fn load(&mut self, request: LoadRequest) -> PendingLoad;
    /// Apply a gain to the live handle immediately, without a fade.
    fn set_gain(&mut self, id: &str, gain: f32);
    /// Fade in from silence to `target_gain`, starting playback.
    fn play(&mut self, id: &str, target_gain: f32);
    /// Fade out from `current_gain` and pause, unless the track was asked to
    /// play again before the fade finished.
    fn pause(&mut self, id: &str, current_gain: f32);
    /// Whether the handle is currently producing sound.
    fn is_playing(&self, id: &str) -> bool;
    /// Release the handle. Only used at teardown.
    fn unload(&mut self, id: &str);
    /// Fade every audible track out, blocking until done.
    fn fade_out_all(&mut self, fade_out: Duration);
}
