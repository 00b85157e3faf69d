use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::StoreError;

use super::kv::KeyValueStore;

/// Per-track snapshot written on every track-state change.
pub const SOUND_PREFERENCES: &str = "soundPreferences";
/// Ids of tracks that loaded successfully; drives the startup restore.
pub const LOADED_SOUNDS: &str = "loadedSounds";
/// Minutes of the most recently started timer.
pub const LAST_TIMER_DURATION: &str = "lastTimerDuration";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundPreference {
    pub id: String,
    pub volume: f32,
    pub is_playing: bool,
}

pub type StoreHandle = Arc<Mutex<Box<dyn KeyValueStore + Send>>>;

/// Typed, failure-tolerant access to the persisted keys.
///
/// Every store error is logged and replaced by the empty/default value;
/// nothing here ever fails the caller.
#[derive(Clone)]
pub struct Preferences {
    store: StoreHandle,
}

impl Preferences {
    pub fn new(store: Box<dyn KeyValueStore + Send>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn loaded_sounds(&self) -> Vec<String> {
        self.read(LOADED_SOUNDS).unwrap_or_default()
    }

    /// Add `id` to the loaded set if it is not already present.
    pub fn record_loaded(&self, id: &str) {
        let mut loaded = self.loaded_sounds();
        if loaded.iter().any(|l| l == id) {
            return;
        }
        loaded.push(id.to_string());
        self.write(LOADED_SOUNDS, &loaded);
    }

    pub fn sound_preferences(&self) -> Vec<SoundPreference> {
        self.read(SOUND_PREFERENCES).unwrap_or_default()
    }

    pub fn save_sound_preferences(&self, prefs: &[SoundPreference]) {
        self.write(SOUND_PREFERENCES, prefs);
    }

    pub fn last_timer_duration(&self) -> Option<u32> {
        self.read(LAST_TIMER_DURATION)
    }

    pub fn set_last_timer_duration(&self, minutes: u32) {
        self.write(LAST_TIMER_DURATION, &minutes);
    }

    /// Drop every persisted key (session reset).
    pub fn clear(&self) {
        for key in [SOUND_PREFERENCES, LOADED_SOUNDS, LAST_TIMER_DURATION] {
            let result = self
                .store
                .lock()
                .map_err(|_| StoreError::Poisoned)
                .and_then(|mut s| s.remove(key));
            if let Err(e) = result {
                warn!(key, "failed to remove stored value: {e}");
            }
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.store.lock() {
            Ok(s) => s.get(key),
            Err(_) => Err(StoreError::Poisoned),
        };
        match value {
            Ok(Some(v)) => match serde_json::from_value(v) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!(key, "ignoring malformed stored value: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, "failed to read stored value: {e}");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_value(value)
            .map_err(StoreError::from)
            .and_then(|v: Value| match self.store.lock() {
                Ok(mut s) => s.set(key, v),
                Err(_) => Err(StoreError::Poisoned),
            });
        if let Err(e) = result {
            warn!(key, "failed to save value: {e}");
        }
    }
}
