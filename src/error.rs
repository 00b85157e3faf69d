//! Error types shared across the mixer, timer, catalog and persistence layers.
//!
//! None of these are fatal: load failures become per-track state, store
//! failures are logged and replaced by defaults, and validation failures are
//! reported back to the caller without mutating the timer.

use thiserror::Error;

/// A track's audio could not be buffered or decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// No audio output device is available.
    #[error("audio output unavailable: {0}")]
    Output(String),

    /// The engine dropped the load before reporting a result.
    #[error("load was abandoned by the playback engine")]
    Abandoned,
}

/// Key-value store read or write failure.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// A timer duration was rejected before touching timer state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("enter a number of minutes")]
    NotANumber,

    #[error("timer must run for at least 1 minute")]
    TooShort,

    #[error("timer can run for at most {max} minutes")]
    TooLong { max: u32 },
}

/// The track catalog could not be loaded.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog contains no tracks")]
    Empty,

    #[error("catalog entry #{0} has an empty id")]
    EmptyId(usize),

    #[error("duplicate track id in catalog: {0}")]
    DuplicateId(String),
}
