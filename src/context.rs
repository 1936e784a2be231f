use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::config::{Config, ListViewConfig};
use crate::error::ListSiftError;
use crate::preferences::PreferencesStore;

/// Process-wide state, built once at start-up and handed to whatever needs
/// it by reference.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    preferences: PreferencesStore,
}

impl AppContext {
    pub fn new(config: Config, preferences: PreferencesStore) -> Self {
        AppContext {
            config,
            preferences,
        }
    }

    /// The platform data directory, if one can be determined.
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "listsift").map(|dirs| dirs.data_local_dir().to_path_buf())
    }

    /// Loads config and preferences from the platform data directory.
    pub fn init() -> Result<Self, ListSiftError> {
        Self::load(Self::data_dir().as_deref(), None, None)
    }

    /// Loads each half from its explicit path when given, otherwise from
    /// `data_dir`. Fails only if a half needs `data_dir` and there is none.
    pub fn load(
        data_dir: Option<&Path>,
        config_path: Option<&Path>,
        prefs_path: Option<&Path>,
    ) -> Result<Self, ListSiftError> {
        let config = match config_path {
            Some(path) => Config::load_file(path)?,
            None => Config::load_config(require_data_dir(data_dir)?),
        };

        let preferences = match prefs_path {
            Some(path) => PreferencesStore::load(path)?,
            None => PreferencesStore::load(
                require_data_dir(data_dir)?.join(PreferencesStore::FILE_NAME),
            )?,
        };

        Ok(Self::new(config, preferences))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn preferences(&self) -> &PreferencesStore {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut PreferencesStore {
        &mut self.preferences
    }

    /// The configured list-view options, with the user's remembered
    /// rows-per-page taking precedence over the configured page size.
    pub fn list_view_config(&self) -> ListViewConfig {
        let mut list_view = self.config.list_view.clone();
        if let Some(rows) = self.preferences.rows_per_page() {
            list_view.page_size = rows;
        }
        list_view
    }
}

fn require_data_dir(data_dir: Option<&Path>) -> Result<&Path, ListSiftError> {
    data_dir.ok_or_else(|| {
        ListSiftError::Error("Could not determine the application data directory".into())
    })
}
