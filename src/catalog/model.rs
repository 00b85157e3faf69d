use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CatalogError;

/// A catalog entry: one looping ambient track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    /// Stable identifier. Persisted sets reference it, so it must never change.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque locator of the audio content (a file path, relative or absolute).
    #[serde(alias = "file")]
    pub source: String,
}

impl Track {
    pub fn new(id: &str, name: &str, source: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            source: source.to_string(),
        }
    }
}

/// The ordered, immutable list of tracks offered by the mixer.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
    sounds_dir: PathBuf,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, empty ids and duplicate ids.
    pub fn new(tracks: Vec<Track>, sounds_dir: PathBuf) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (i, track) in tracks.iter().enumerate() {
            if track.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(i));
            }
            if tracks[..i].iter().any(|t| t.id == track.id) {
                return Err(CatalogError::DuplicateId(track.id.clone()));
            }
        }

        Ok(Self { tracks, sounds_dir })
    }

    /// The built-in nature-sound catalog.
    pub fn builtin(sounds_dir: PathBuf) -> Self {
        let tracks = vec![
            Track::new("rain", "Rain", "rain.mp3"),
            Track::new("forest", "Forest", "forest.mp3"),
            Track::new("ocean", "Ocean Waves", "ocean.mp3"),
            Track::new("fire", "Campfire", "fire.mp3"),
            Track::new("thunder", "Thunderstorm", "thunder.mp3"),
            Track::new("wind", "Wind", "wind.mp3"),
        ];
        Self { tracks, sounds_dir }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn sounds_dir(&self) -> &Path {
        &self.sounds_dir
    }

    /// Resolve a track's locator to a file path. Absolute locators are kept,
    /// relative ones are joined onto the sounds directory.
    pub fn resolve_source(&self, track: &Track) -> PathBuf {
        let source = Path::new(&track.source);
        if source.is_absolute() {
            source.to_path_buf()
        } else {
            self.sounds_dir.join(source)
        }
    }

    /// First track whose display name contains `query`, ignoring case.
    pub fn find_by_name(&self, query: &str) -> Option<&Track> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.tracks
            .iter()
            .find(|t| t.name.to_lowercase().contains(&query))
    }
}
