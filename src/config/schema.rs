use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/escape/config.toml` or `~/.config/escape/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ESCAPE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub timer: TimerSettings,
    pub catalog: CatalogSettings,
    pub store: StoreSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-in/fade-out length when a track starts or stops (milliseconds).
    pub fade_ms: u64,
    /// Number of volume steps per fade (higher = smoother, more wakeups).
    pub fade_steps: u32,
    /// Gain every track starts with, in `[0, 1]`.
    pub default_gain: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            fade_ms: 300,
            fade_steps: 15,
            default_gain: 0.7,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimerSettings {
    /// Durations (minutes) offered in the timer sheet.
    pub presets: Vec<u32>,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            presets: vec![15, 30, 45, 60, 90],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Directory that relative track locators resolve against.
    /// Defaults to the current directory.
    pub sounds_dir: Option<PathBuf>,
    /// Optional JSON catalog replacing the built-in track list.
    pub catalog_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Key-value store file. Defaults to `$XDG_DATA_HOME/escape/store.json`.
    pub path: Option<PathBuf>,
    /// Re-apply the saved per-track volumes at startup.
    pub restore_volumes: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Nature's calm, anywhere ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Gain change applied by `h` / `l`.
    pub gain_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { gain_step: 0.05 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, overridden by `ESCAPE_LOG`.
    pub filter: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/escape/escape.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}
