use std::{env, path::PathBuf};

use super::schema::Settings;
use crate::timer::MAX_TIMER_MINUTES;

/// Upper bound for `audio.fade_steps`.
pub const MAX_FADE_STEPS: u32 = 1000;
/// Upper bound for the number of `timer.presets` entries.
pub const MAX_TIMER_PRESETS: usize = 20;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `ESCAPE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ESCAPE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_FADE_STEPS).contains(&self.audio.fade_steps) {
            return Err(format!("audio.fade_steps must be within 1..={MAX_FADE_STEPS}"));
        }
        if self.timer.presets.len() > MAX_TIMER_PRESETS {
            return Err(format!("timer.presets holds at most {MAX_TIMER_PRESETS} entries"));
        }
        if !(0.0..=1.0).contains(&self.audio.default_gain) {
            return Err("audio.default_gain must be within 0.0..=1.0".to_string());
        }
        if !(self.controls.gain_step > 0.0 && self.controls.gain_step <= 1.0) {
            return Err("controls.gain_step must be within (0.0, 1.0]".to_string());
        }
        if let Some(bad) = self
            .timer
            .presets
            .iter()
            .find(|&&m| m == 0 || m > MAX_TIMER_MINUTES)
        {
            return Err(format!(
                "timer.presets entry {bad} must be within 1..={MAX_TIMER_MINUTES}"
            ));
        }
        Ok(())
    }

    /// Render these settings as a TOML document.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Resolve the config path from `ESCAPE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ESCAPE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/escape/config.toml`
/// or `~/.config/escape/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("escape").join("config.toml"))
}

/// Default key-value store file: `$XDG_DATA_HOME/escape/store.json`
/// or `~/.local/share/escape/store.json`.
pub fn default_store_path() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share").map(|d| d.join("escape").join("store.json"))
}

/// Default log file: `$XDG_STATE_HOME/escape/escape.log`
/// or `~/.local/state/escape/escape.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("escape").join("escape.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(dir) = env::var_os(var) {
        Some(PathBuf::from(dir))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
