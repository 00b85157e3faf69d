//! Utilities for creating looping `rodio` sinks from sound files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::LoadError;

use super::voices::VoiceOutput;

pub(super) type DecodedSource = Decoder<BufReader<File>>;

/// Open and decode `path`. Runs on a loader thread.
pub(super) fn decode_file(path: &Path) -> Result<DecodedSource, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| LoadError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Create a paused `Sink` that repeats `source` forever at `gain`.
pub(super) fn create_looping_sink(handle: &OutputStream, source: DecodedSource, gain: f32) -> Sink {
    let sink = Sink::connect_new(handle.mixer());
    sink.pause();
    sink.set_volume(gain);
    sink.append(source.repeat_infinite());
    sink
}

impl VoiceOutput for Sink {
    fn set_volume(&self, gain: f32) {
        Sink::set_volume(self, gain);
    }

    fn volume(&self) -> f32 {
        Sink::volume(self)
    }

    fn play(&self) {
        Sink::play(self);
    }

    fn pause(&self) {
        Sink::pause(self);
    }

    fn is_paused(&self) -> bool {
        Sink::is_paused(self)
    }

    fn stop(&self) {
        Sink::stop(self);
    }
}
