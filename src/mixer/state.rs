use crate::error::LoadError;

/// Title published when nothing is playing.
pub const DEFAULT_TITLE: &str = "Escape - Nature Sounds";

/// Where a track is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unloaded,
    Loading,
    Loaded,
    LoadError,
}

/// Observable per-track state. Only the mixer mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    pub id: String,
    pub name: String,
    pub lifecycle: Lifecycle,
    /// Logical play state. Only ever true while `lifecycle` is `Loaded`.
    pub is_playing: bool,
    /// User gain in `[0, 1]`.
    pub gain: f32,
    /// Why the most recent load failed, while in `LoadError`.
    pub last_error: Option<LoadError>,
}

impl TrackState {
    pub fn is_loaded(&self) -> bool {
        self.lifecycle == Lifecycle::Loaded
    }

    /// Whether a load intent is accepted in the current state.
    pub fn can_load(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Unloaded | Lifecycle::LoadError)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Nothing has been played this session.
    #[default]
    None,
    Playing,
    Paused,
}

/// Aggregate state forwarded to the notification surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub status: PlaybackStatus,
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            status: PlaybackStatus::None,
        }
    }
}

/// Clamp a requested gain into `[0, 1]`. NaN is rejected.
pub fn clamp_gain(value: f32) -> Option<f32> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(0.0, 1.0))
    }
}
