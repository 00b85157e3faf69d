use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use crate::config::AudioSettings;
use crate::error::LoadError;

use super::engine::LoadRequest;
use super::sink::{create_looping_sink, decode_file};
use super::types::{AudibleHandle, AudioCmd};
use super::voices::Voices;

/// How long the thread sleeps between commands while nothing is fading.
const IDLE_WAIT: Duration = Duration::from_millis(200);

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    tx: Sender<AudioCmd>,
    audible: AudibleHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // rodio logs to stderr when OutputStream is dropped, which garbles the TUI.
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut s) => {
                s.log_on_drop(false);
                Some(s)
            }
            Err(e) => {
                error!("no audio output device: {e}");
                None
            }
        };

        let fade_len = Duration::from_millis(audio_settings.fade_ms);
        let step = fade_step(fade_len, audio_settings.fade_steps);
        let mut voices: Voices<Sink> = Voices::new(fade_len);

        loop {
            let wait = if voices.is_fading() { step } else { IDLE_WAIT };
            match rx.recv_timeout(wait) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load { request, reply } => {
                        if stream.is_none() {
                            let _ = reply.send(Err(LoadError::Output("no output device".to_string())));
                            continue;
                        }
                        spawn_loader(request, reply, tx.clone());
                    }
                    AudioCmd::Attach {
                        id,
                        gain,
                        decoded,
                        reply,
                    } => {
                        let result = match (decoded, stream.as_ref()) {
                            (Ok(source), Some(stream)) => {
                                voices.insert(&id, create_looping_sink(stream, source, gain));
                                info!(%id, "track loaded");
                                Ok(())
                            }
                            (Err(e), _) => {
                                warn!(%id, "track failed to load: {e}");
                                Err(e)
                            }
                            (Ok(_), None) => Err(LoadError::Output("no output device".to_string())),
                        };
                        let _ = reply.send(result);
                    }
                    AudioCmd::Play { id, gain } => voices.play(&id, gain, Instant::now()),
                    AudioCmd::Pause { id, gain } => voices.pause(&id, gain, Instant::now()),
                    AudioCmd::SetGain { id, gain } => voices.set_gain(&id, gain),
                    AudioCmd::Unload(id) => {
                        if voices.remove(&id) {
                            debug!(%id, "track unloaded");
                        }
                    }
                    AudioCmd::FadeOutAll { fade_out_ms, done } => {
                        fade_out_blocking(&mut voices, Duration::from_millis(fade_out_ms), step);
                        publish(&audible, &voices);
                        let _ = done.send(());
                    }
                    AudioCmd::Quit => break,
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            voices.advance(Instant::now());
            publish(&audible, &voices);
        }

        for id in voices.ids() {
            voices.remove(&id);
        }
        publish(&audible, &voices);
    })
}

/// Decode on a separate thread so one slow file never stalls fades.
/// Interval between fade updates, never shorter than 1 ms.
pub(super) fn fade_step(fade_len: Duration, fade_steps: u32) -> Duration {
    (fade_len / fade_steps.max(1)).max(Duration::from_millis(1))
}

fn spawn_loader(request: LoadRequest, reply: Sender<Result<(), LoadError>>, tx: Sender<AudioCmd>) {
    thread::spawn(move || {
        debug!(id = %request.id, path = %request.path.display(), "decoding");
        let decoded = decode_file(&request.path);
        // If the audio thread is gone, `reply` is dropped with the command and
        // the pending load resolves as abandoned.
        let _ = tx.send(AudioCmd::Attach {
            id: request.id,
            gain: request.gain,
            decoded,
            reply,
        });
    });
}

fn fade_out_blocking(voices: &mut Voices<Sink>, fade_out: Duration, step: Duration) {
    voices.fade_out_all(fade_out, Instant::now());
    while voices.is_fading() {
        thread::sleep(step);
        voices.advance(Instant::now());
    }
}

fn publish(audible: &AudibleHandle, voices: &Voices<Sink>) {
    if let Ok(mut set) = audible.lock() {
        *set = voices.audible();
    }
}
