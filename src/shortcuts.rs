//! Launch shortcuts.
//!
//! Accepts `timer=<minutes>` and `preset=<name>` either as separate
//! arguments or as one query string (`?timer=25&preset=rain`). They are
//! replayed into the [`App`] as ordinary intents after startup.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::app::App;
use crate::timer::parse_minutes;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Shortcuts {
    pub timer: Option<u32>,
    pub presets: Vec<String>,
    /// First positional argument that is not a shortcut.
    pub sounds_dir: Option<PathBuf>,
}

impl Shortcuts {
    /// Parse process arguments, without the program name. `--flags` are
    /// left to the caller.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut shortcuts = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg.starts_with("--") {
                continue;
            }
            if let Some(query) = arg.strip_prefix('?') {
                query.split('&').for_each(|pair| shortcuts.push_pair(pair));
            } else if arg.contains('=') {
                arg.split('&').for_each(|pair| shortcuts.push_pair(pair));
            } else if shortcuts.sounds_dir.is_none() {
                shortcuts.sounds_dir = Some(PathBuf::from(arg));
            } else {
                debug!(arg, "ignoring extra argument");
            }
        }
        shortcuts
    }

    fn push_pair(&mut self, pair: &str) {
        let Some((key, value)) = pair.split_once('=') else {
            return;
        };
        let value = decode_component(value);
        match key {
            "timer" => match parse_minutes(&value) {
                Ok(m) => self.timer = Some(m),
                Err(e) => warn!(%value, "ignoring timer shortcut: {e}"),
            },
            "preset" => self.presets.push(value),
            other => debug!(key = other, "ignoring unknown shortcut"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timer.is_none() && self.presets.is_empty()
    }

    /// Replay the shortcuts into `app`.
    pub fn apply(&self, app: &mut App, now: Instant) {
        if let Some(minutes) = self.timer {
            if let Err(e) = app.start_timer(minutes, now) {
                warn!("timer shortcut rejected: {e}");
            }
        }
        for name in &self.presets {
            let id = app
                .mixer()
                .catalog()
                .find_by_name(name)
                .map(|t| t.id.clone());
            match id {
                Some(id) => {
                    info!(%name, %id, "applying preset shortcut");
                    app.apply_preset(&id);
                }
                None => warn!(%name, "no track matches preset"),
            }
        }
    }
}

/// Undo `+` and `%XX` escapes. Malformed escapes are kept as typed.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}
