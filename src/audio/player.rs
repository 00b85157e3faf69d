use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;

use super::engine::{LoadRequest, PendingLoad, PlaybackEngine};
use super::thread::spawn_audio_thread;
use super::types::{AudibleHandle, AudioCmd};

/// Slack on top of the requested fade before giving up on the audio thread.
const FADE_OUT_GRACE: Duration = Duration::from_secs(1);

/// [`PlaybackEngine`] backed by a dedicated rodio thread.
pub struct RodioEngine {
    tx: Sender<AudioCmd>,
    audible: AudibleHandle,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    pub fn new(audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let audible: AudibleHandle = Arc::new(Mutex::new(Default::default()));

        let audio_handle = spawn_audio_thread(rx, tx.clone(), audible.clone(), audio_settings);

        Self {
            tx,
            audible,
            join: Some(audio_handle),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is not running; command dropped");
        }
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, request: LoadRequest) -> PendingLoad {
        let (reply, pending) = PendingLoad::channel();
        // On failure the reply sender is dropped inside the returned command,
        // which resolves the pending load as abandoned.
        self.send(AudioCmd::Load { request, reply });
        pending
    }

    fn set_gain(&mut self, id: &str, gain: f32) {
        self.send(AudioCmd::SetGain {
            id: id.to_string(),
            gain,
        });
    }

    fn play(&mut self, id: &str, target_gain: f32) {
        self.send(AudioCmd::Play {
            id: id.to_string(),
            gain: target_gain,
        });
    }

    fn pause(&mut self, id: &str, current_gain: f32) {
        self.send(AudioCmd::Pause {
            id: id.to_string(),
            gain: current_gain,
        });
    }

    fn is_playing(&self, id: &str) -> bool {
        self.audible.lock().map(|set| set.contains(id)).unwrap_or(false)
    }

    fn unload(&mut self, id: &str) {
        self.send(AudioCmd::Unload(id.to_string()));
    }

    fn fade_out_all(&mut self, fade_out: Duration) {
        let (done, finished) = mpsc::channel();
        self.send(AudioCmd::FadeOutAll {
            fade_out_ms: fade_out.as_millis() as u64,
            done,
        });
        let _ = finished.recv_timeout(fade_out + FADE_OUT_GRACE);
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        let _ = self.tx.send(AudioCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
