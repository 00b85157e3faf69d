//! Structured logging into a file.
//!
//! The terminal belongs to the TUI, so nothing is ever written to stdout or
//! stderr. `ESCAPE_LOG` overrides the configured filter.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, default_log_path};

/// Install the global subscriber. Returns the log file in use, or `None`
/// when no file could be opened and logs are discarded.
pub fn init(settings: &LogSettings) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_env("ESCAPE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    let path = log_path(settings)?;
    let file = open_log(&path).ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .ok()?;
    Some(path)
}

fn log_path(settings: &LogSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(default_log_path)
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
