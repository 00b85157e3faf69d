use std::time::Instant;

use tracing::{info, warn};

use crate::app::App;
use crate::config::{self, default_store_path};
use crate::shortcuts::Shortcuts;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore, Preferences};

/// Open the configured store, or a volatile one when no path resolves.
pub fn open_preferences(settings: &config::Settings) -> Preferences {
    let path = settings.store.path.clone().or_else(default_store_path);
    let store: Box<dyn KeyValueStore + Send> = match path {
        Some(path) => {
            let store = JsonFileStore::new(path);
            info!(path = %store.path().display(), "using preference store");
            Box::new(store)
        }
        None => {
            warn!("no store path available; preferences will not persist");
            Box::new(MemoryStore::default())
        }
    };
    Preferences::new(store)
}

/// Bring back the previous session, then replay launch shortcuts.
pub fn restore_session(app: &mut App, settings: &config::Settings, shortcuts: &Shortcuts) {
    if settings.store.restore_volumes {
        app.mixer_mut().apply_saved_gains();
    }
    app.mixer_mut().restore_loaded();
    if !shortcuts.is_empty() {
        shortcuts.apply(app, Instant::now());
    }
}
