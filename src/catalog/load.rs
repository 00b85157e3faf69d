use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::CatalogSettings;
use crate::error::CatalogError;

use super::model::{Catalog, Track};

/// On-disk catalog layout: `{ "sounds": [ { "id", "name", "file" } ] }`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    sounds: Vec<Track>,
}

/// Parse a JSON catalog document.
pub(super) fn parse_catalog(json: &str, sounds_dir: PathBuf) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = serde_json::from_str(json)?;
    Catalog::new(file.sounds, sounds_dir)
}

/// Read and validate a JSON catalog file.
pub fn read_catalog(path: &Path, sounds_dir: PathBuf) -> Result<Catalog, CatalogError> {
    let json = fs::read_to_string(path)?;
    parse_catalog(&json, sounds_dir)
}

impl Catalog {
    /// Load the catalog described by `settings`.
    ///
    /// `dir_override` (the positional command-line directory) wins over
    /// `catalog.sounds_dir`. A configured catalog file that cannot be read is
    /// logged and the built-in catalog is used instead.
    pub fn load(settings: &CatalogSettings, dir_override: Option<&Path>) -> Catalog {
        let sounds_dir = dir_override
            .map(Path::to_path_buf)
            .or_else(|| settings.sounds_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let Some(path) = settings.catalog_file.as_deref() else {
            return Catalog::builtin(sounds_dir);
        };

        match read_catalog(path, sounds_dir.clone()) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    tracks = catalog.tracks().len(),
                    "loaded track catalog"
                );
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), "catalog unusable, using built-in tracks: {e}");
                Catalog::builtin(sounds_dir)
            }
        }
    }
}
