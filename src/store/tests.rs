use std::fs;

use serde_json::json;
use tempfile::tempdir;

use super::*;
use crate::error::StoreError;

/// A store whose every operation fails, to exercise the fallback paths.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk on fire")))
    }

    fn set(&mut self, _key: &str, _value: serde_json::Value) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk on fire")))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk on fire")))
    }
}

#[test]
fn json_file_store_reads_missing_file_as_empty() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("store.json"));
    assert!(store.get("loadedSounds").unwrap().is_none());
}

#[test]
fn json_file_store_persists_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let mut store = JsonFileStore::new(path.clone());
    store.set("a", json!([1, 2, 3])).unwrap();
    store.set("b", json!("x")).unwrap();

    let reopened = JsonFileStore::new(path.clone());
    assert_eq!(reopened.get("a").unwrap(), Some(json!([1, 2, 3])));
    assert_eq!(reopened.get("b").unwrap(), Some(json!("x")));

    let mut reopened = reopened;
    reopened.remove("a").unwrap();
    assert!(JsonFileStore::new(path.clone()).get("a").unwrap().is_none());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn json_file_store_reports_corrupt_documents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, "{ nope").unwrap();

    let store = JsonFileStore::new(path);
    assert!(matches!(store.get("a"), Err(StoreError::Json(_))));
}

#[test]
fn record_loaded_appends_each_id_once() {
    let prefs = Preferences::new(Box::new(MemoryStore::default()));
    assert!(prefs.loaded_sounds().is_empty());

    prefs.record_loaded("rain");
    prefs.record_loaded("ocean");
    prefs.record_loaded("rain");
    assert_eq!(prefs.loaded_sounds(), vec!["rain".to_string(), "ocean".to_string()]);
}

#[test]
fn sound_preferences_use_camel_case_keys_and_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let prefs = Preferences::new(Box::new(JsonFileStore::new(path.clone())));

    let snapshot = vec![
        SoundPreference {
            id: "rain".into(),
            volume: 0.25,
            is_playing: true,
        },
        SoundPreference {
            id: "wind".into(),
            volume: 0.7,
            is_playing: false,
        },
    ];
    prefs.save_sound_preferences(&snapshot);

    let raw = JsonFileStore::new(path.clone()).get(SOUND_PREFERENCES).unwrap().unwrap();
    assert_eq!(raw[0]["isPlaying"], json!(true));
    assert_eq!(raw[1]["id"], json!("wind"));

    let reread = Preferences::new(Box::new(JsonFileStore::new(path)));
    assert_eq!(reread.sound_preferences(), snapshot);
}

#[test]
fn malformed_values_fall_back_to_defaults() {
    let mut store = MemoryStore::default();
    store.set(LOADED_SOUNDS, json!({"not": "a list"})).unwrap();
    store.set(LAST_TIMER_DURATION, json!("soon")).unwrap();

    let prefs = Preferences::new(Box::new(store));
    assert!(prefs.loaded_sounds().is_empty());
    assert_eq!(prefs.last_timer_duration(), None);
}

#[test]
fn store_failures_are_swallowed() {
    let prefs = Preferences::new(Box::new(BrokenStore));
    prefs.record_loaded("rain");
    prefs.set_last_timer_duration(25);
    prefs.clear();
    assert!(prefs.loaded_sounds().is_empty());
    assert!(prefs.sound_preferences().is_empty());
    assert_eq!(prefs.last_timer_duration(), None);
}

#[test]
fn clear_removes_every_key() {
    let prefs = Preferences::new(Box::new(MemoryStore::default()));
    prefs.record_loaded("rain");
    prefs.set_last_timer_duration(30);
    prefs.save_sound_preferences(&[SoundPreference {
        id: "rain".into(),
        volume: 0.5,
        is_playing: false,
    }]);

    prefs.clear();
    assert!(prefs.loaded_sounds().is_empty());
    assert!(prefs.sound_preferences().is_empty());
    assert_eq!(prefs.last_timer_duration(), None);
}

#[test]
fn clones_share_the_same_store() {
    let prefs = Preferences::new(Box::new(MemoryStore::default()));
    let other = prefs.clone();
    other.set_last_timer_duration(45);
    assert_eq!(prefs.last_timer_duration(), Some(45));
}
