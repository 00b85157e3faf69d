use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::load::{parse_catalog, read_catalog};
use super::*;
use crate::config::CatalogSettings;
use crate::error::CatalogError;

#[test]
fn builtin_catalog_has_stable_unique_ids() {
    let catalog = Catalog::builtin(PathBuf::from("/sounds"));
    let ids: Vec<&str> = catalog.tracks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["rain", "forest", "ocean", "fire", "thunder", "wind"]);

    // Re-validating the built-in list must succeed.
    assert!(Catalog::new(catalog.tracks().to_vec(), PathBuf::from("/sounds")).is_ok());
}

#[test]
fn new_rejects_empty_duplicate_and_blank_ids() {
    assert!(matches!(
        Catalog::new(vec![], PathBuf::new()),
        Err(CatalogError::Empty)
    ));

    let dup = vec![Track::new("rain", "Rain", "a.mp3"), Track::new("rain", "Rain 2", "b.mp3")];
    match Catalog::new(dup, PathBuf::new()) {
        Err(CatalogError::DuplicateId(id)) => assert_eq!(id, "rain"),
        other => panic!("expected duplicate id error, got {other:?}"),
    }

    let blank = vec![Track::new("rain", "Rain", "a.mp3"), Track::new("  ", "?", "b.mp3")];
    assert!(matches!(
        Catalog::new(blank, PathBuf::new()),
        Err(CatalogError::EmptyId(1))
    ));
}

#[test]
fn resolve_source_joins_relative_locators_only() {
    let catalog = Catalog::new(
        vec![
            Track::new("rain", "Rain", "rain.mp3"),
            Track::new("abs", "Absolute", "/opt/sounds/abs.ogg"),
        ],
        PathBuf::from("/home/me/sounds"),
    )
    .unwrap();

    let rain = catalog.get("rain").unwrap();
    assert_eq!(
        catalog.resolve_source(rain),
        PathBuf::from("/home/me/sounds/rain.mp3")
    );
    let abs = catalog.get("abs").unwrap();
    assert_eq!(catalog.resolve_source(abs), PathBuf::from("/opt/sounds/abs.ogg"));
}

#[test]
fn find_by_name_is_case_insensitive_and_returns_first_match() {
    let catalog = Catalog::new(
        vec![
            Track::new("storm", "Thunder Rain", "a.mp3"),
            Track::new("rain", "Rain", "b.mp3"),
        ],
        PathBuf::new(),
    )
    .unwrap();

    assert_eq!(catalog.find_by_name("RAIN").map(|t| t.id.as_str()), Some("storm"));
    assert_eq!(catalog.find_by_name("thunder").map(|t| t.id.as_str()), Some("storm"));
    assert!(catalog.find_by_name("ocean").is_none());
    assert!(catalog.find_by_name("   ").is_none());
}

#[test]
fn parse_catalog_accepts_file_or_source_field() {
    let json = r#"{
        "sounds": [
            { "id": "rain", "name": "Rain", "file": "/sounds/rain.mp3" },
            { "id": "creek", "name": "Creek", "source": "creek.ogg" }
        ]
    }"#;
    let catalog = parse_catalog(json, PathBuf::from("/base")).unwrap();
    assert_eq!(catalog.tracks().len(), 2);
    assert_eq!(catalog.tracks()[0].source, "/sounds/rain.mp3");
    assert_eq!(catalog.tracks()[1].source, "creek.ogg");
    assert_eq!(catalog.sounds_dir(), Path::new("/base"));
}

#[test]
fn read_catalog_reports_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        read_catalog(&path, PathBuf::new()),
        Err(CatalogError::Json(_))
    ));

    assert!(matches!(
        read_catalog(&dir.path().join("missing.json"), PathBuf::new()),
        Err(CatalogError::Io(_))
    ));
}

#[test]
fn load_prefers_directory_override_and_falls_back_to_builtin() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(&path, r#"{ "sounds": [] }"#).unwrap();

    let settings = CatalogSettings {
        sounds_dir: Some(PathBuf::from("/configured")),
        catalog_file: Some(path),
    };

    // Empty catalog file is rejected; built-in list is used.
    let catalog = Catalog::load(&settings, Some(Path::new("/override")));
    assert_eq!(catalog.tracks().len(), 6);
    assert_eq!(catalog.sounds_dir(), Path::new("/override"));

    let catalog = Catalog::load(&CatalogSettings::default(), None);
    assert_eq!(catalog.sounds_dir(), Path::new("."));
}

#[test]
fn load_reads_configured_catalog_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(
        &path,
        r#"{ "sounds": [ { "id": "creek", "name": "Creek", "file": "creek.ogg" } ] }"#,
    )
    .unwrap();

    let settings = CatalogSettings {
        sounds_dir: Some(dir.path().to_path_buf()),
        catalog_file: Some(path),
    };
    let catalog = Catalog::load(&settings, None);
    assert_eq!(catalog.tracks().len(), 1);
    assert_eq!(
        catalog.resolve_source(&catalog.tracks()[0]),
        dir.path().join("creek.ogg")
    );
}
